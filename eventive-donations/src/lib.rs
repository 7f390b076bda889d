//! eventive-donations: fetch donations, compute fundraiser progress, hydrate
//! page containers with the result

pub mod engine;
pub mod error;
pub mod hydrate;
pub mod source;

pub use engine::{BlockOutcome, DonationProgressEngine};
pub use error::ProgressError;
pub use hydrate::{HydratedPage, hydrate_page};
pub use source::{ClientSettings, DonationSource, RestDonationClient};
