//! Private REST client for the Ambient Weather device listing endpoint
//!
//! This crate issues the single request shape the polling mode needs:
//! `GET /v1/devices?applicationKey=..&apiKey=..`. Retry and pacing policy
//! live one layer up in `ambient-weather`; this crate only reports what the
//! server said.

mod error;

pub use error::RestError;

use std::time::Duration;

use serde_json::Value;

/// Device listing endpoint used when no override is configured
pub const DEFAULT_DEVICES_ENDPOINT: &str = "https://api.ambientweather.net/v1/devices";

/// Human readable reason for a failed request status.
///
/// Purely diagnostic. Callers must not branch on the returned text.
pub fn describe_status(code: u16) -> &'static str {
    match code {
        404 => "Not found",
        429 => "Too many requests",
        502 => "Bad gateway error",
        _ => "Unknown error",
    }
}

/// A minimal blocking client for the device listing endpoint
#[derive(Debug, Clone)]
pub struct RestClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl RestClient {
    /// Create a new client against the public endpoint with default timeouts
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_DEVICES_ENDPOINT)
    }

    /// Create a client against a custom endpoint (staging servers, tests)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::with_timeouts(endpoint, Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a client with explicit connect and read timeouts
    pub fn with_timeouts(endpoint: impl Into<String>, connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint this client sends requests to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the device list visible to one API key
    ///
    /// # Arguments
    /// * `application_key` - Account-level key shared by every request
    /// * `api_key` - Per-owner key selecting whose devices are returned
    ///
    /// # Returns
    /// The response body as untyped JSON. The payload shape is owned by the
    /// server and passed through unchanged.
    pub fn get_devices(&self, application_key: &str, api_key: &str) -> Result<Value, RestError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("applicationKey", application_key)
            .query("apiKey", api_key)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => RestError::Status(code),
                ureq::Error::Transport(transport) => RestError::Network(transport.to_string()),
            })?;

        tracing::debug!("Device listing returned HTTP {}", response.status());

        response
            .into_json::<Value>()
            .map_err(|e| RestError::Parse(e.to_string()))
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}
