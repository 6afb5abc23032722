//! Error types for delaywatch-core.

use thiserror::Error;

/// Result type for delaywatch-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when parsing wire names into domain enums.
///
/// The ledger and reward functions themselves are total and never fail;
/// these errors only appear at the string parsing boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Lifecycle status name not recognised
    #[error("unknown report status: {0}")]
    UnknownStatus(String),

    /// Vote direction name not recognised
    #[error("unknown vote kind: {0}")]
    UnknownVoteKind(String),
}
