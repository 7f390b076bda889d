//! Donation progress engine: attributes in, progress (or a failure) out.
//!
//! Each call is independent: one fetch, one aggregation, no state kept
//! between calls.

use std::sync::Arc;

use eventive_core::{BlockAttributes, ProgressResult, render_error, render_progress};
use tracing::warn;

use crate::error::ProgressError;
use crate::source::DonationSource;

/// What one block instance ends up showing
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Progress(ProgressResult),
    Failed(ProgressError),
}

impl BlockOutcome {
    /// Markup for the instance's container
    pub fn markup(&self) -> String {
        match self {
            BlockOutcome::Progress(result) => render_progress(result),
            BlockOutcome::Failed(err) if err.is_configuration() => render_error(&err.to_string()),
            BlockOutcome::Failed(err) => render_error(&format!("Error loading donations: {err}")),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BlockOutcome::Failed(_))
    }
}

#[derive(Clone)]
pub struct DonationProgressEngine {
    source: Arc<dyn DonationSource>,
}

impl DonationProgressEngine {
    pub fn new(source: Arc<dyn DonationSource>) -> Self {
        Self { source }
    }

    /// Validate, fetch once, aggregate. No request is made when the date
    /// range is incomplete.
    pub async fn compute(&self, attrs: &BlockAttributes) -> Result<ProgressResult, ProgressError> {
        let range = attrs.date_range().ok_or(ProgressError::Configuration)?;
        let goal = attrs.goal();
        let batch = self.source.fetch_transactions(&range).await?;
        Ok(ProgressResult::compute(&batch, goal))
    }

    /// Like `compute`, but every failure is folded into the outcome
    pub async fn run(&self, attrs: &BlockAttributes) -> BlockOutcome {
        match self.compute(attrs).await {
            Ok(result) => BlockOutcome::Progress(result),
            Err(err) => {
                warn!(
                    start = attrs.start_time.as_deref().unwrap_or(""),
                    end = attrs.end_time.as_deref().unwrap_or(""),
                    error = %err,
                    "donation progress unavailable"
                );
                BlockOutcome::Failed(err)
            }
        }
    }
}
