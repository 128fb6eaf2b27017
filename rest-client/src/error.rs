//! Error types for the REST client

use thiserror::Error;

/// Errors that can occur while talking to the device listing endpoint
#[derive(Debug, Error)]
pub enum RestError {
    /// The server answered with a non-success HTTP status
    #[error("HTTP status {0}: {}", status_reason(.0))]
    Status(u16),

    /// Connection, DNS or TLS failure before a status was received
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The success body was not valid JSON
    #[error("JSON parsing error: {0}")]
    Parse(String),
}

fn status_reason(code: &u16) -> &'static str {
    crate::describe_status(*code)
}

impl RestError {
    /// HTTP status code, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status(code) => Some(*code),
            _ => None,
        }
    }

    /// True when the server rejected the application or API key
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
