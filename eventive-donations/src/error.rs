use thiserror::Error;

/// Everything that can stop a block instance from showing progress
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// Date range missing; detected before any request is made
    #[error("Start and end dates are required")]
    Configuration,
    /// The endpoint answered with a non-success status
    #[error("HTTP error! status: {status}")]
    RemoteRequest { status: u16 },
    /// Connection, DNS or body read failure
    #[error("{0}")]
    Transport(String),
    /// Body was not valid JSON
    #[error("{0}")]
    MalformedResponse(String),
}

impl ProgressError {
    /// True when the failure happened before any network I/O
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProgressError::Configuration)
    }
}
