//! eventive-core: donation records, progress computation, and block markup
//! for the Eventive fundraiser progress widget

pub mod blocks;
pub mod markup;
pub mod progress;
pub mod transactions;

pub use blocks::{BlockAttributes, BlockInstance, CONTAINER_ID, discover_blocks};
pub use markup::{escape_html, render_error, render_progress};
pub use progress::{DEFAULT_GOAL, DateRange, Goal, ProgressResult, to_fixed2};
pub use transactions::{DONATION_LABEL, TransactionBatch, TransactionRecord};
