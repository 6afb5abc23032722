//! Error types for the live channel.

use thiserror::Error;

use crate::events::Category;

/// Result type for live channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the live channel.
///
/// None of these reach listeners. Parse failures are logged and the event
/// is dropped; transport failures trigger a reconnect.
#[derive(Debug, Error)]
pub enum Error {
    /// Event body did not match the category's payload shape
    #[error("malformed {category} event: {source}")]
    Malformed {
        category: Category,
        #[source]
        source: serde_json::Error,
    },

    /// Event name is not a known category
    #[error("unknown event category: {0}")]
    UnknownCategory(String),

    /// Transport could not be opened
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration value could not be parsed
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The channel event loop has stopped
    #[error("channel event loop closed")]
    LoopClosed,
}
