//! Error taxonomy shared across the store seam.

use thiserror::Error;

/// Failure talking to the hosted backend. Every remote-call failure is
/// recovered at the page level; none abort the process.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a usable response (DNS, TLS, timeout).
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// No authenticated user for a call that needs one.
    #[error("not authenticated")]
    Unauthenticated,

    /// A row we expected does not exist.
    #[error("{0} row not found")]
    MissingRow(&'static str),

    /// The response body did not match the expected row shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    /// True when the missing row can be repaired by inserting a default
    /// (first-login profile bootstrap).
    pub fn is_missing_row(&self) -> bool {
        matches!(self, StoreError::MissingRow(_))
    }
}
