use thiserror::Error;

/// Errors raised by the realtime transport layer
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// The configured endpoint could not be turned into a connection URL
    #[error("Invalid realtime endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Opening the connection failed
    #[error("Failed to connect to realtime endpoint: {0}")]
    Connection(String),

    /// Sending an outbound event failed
    #[error("Failed to emit '{event}': {reason}")]
    Emit { event: String, reason: String },

    /// Closing the connection failed
    #[error("Failed to close realtime connection: {0}")]
    Close(String),
}

/// Result type for realtime transport operations
pub type Result<T> = std::result::Result<T, RealtimeError>;
