use ambient_realtime::RealtimeError;
use rest_client::RestError;
use thiserror::Error;

use crate::events::EventKind;

/// Error returned by a user callback
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The server rejected the application key or an API key (HTTP 401).
    /// Ends a running retrieval; every later request would fail the same way.
    #[error("Invalid application key or API key (rejected while requesting {api_key})")]
    Unauthorized { api_key: String },

    /// HTTP transport failure that is not a status code
    #[error("REST error: {0}")]
    Rest(#[from] RestError),

    /// No push transport was compiled into this build
    #[error("Realtime transport unavailable: build with the `realtime` feature or supply a transport")]
    TransportUnavailable,

    #[error("Realtime error: {0}")]
    Realtime(#[from] RealtimeError),

    #[error("Client is already connected or connecting")]
    AlreadyConnected,

    #[error("Client is not connected")]
    NotConnected,

    /// A registered callback returned an error
    #[error("Callback for '{event}' failed: {source}")]
    Callback {
        event: EventKind,
        #[source]
        source: CallbackError,
    },

    /// Event payload did not have the expected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Event name outside `connect`, `data`, `subscribed`
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Default output sink could not be written
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, WeatherError>;
