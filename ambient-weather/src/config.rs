//! Configuration for [`WeatherClient`](crate::WeatherClient)

use std::time::Duration;

use crate::error::{Result, WeatherError};

/// Client configuration
///
/// The defaults target the public Ambient Weather service and its published
/// rate limits: one request per second per API key and three per second per
/// application key.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device listing endpoint
    /// Default: `https://api.ambientweather.net/v1/devices`
    pub rest_endpoint: String,

    /// Realtime endpoint
    /// Default: `https://api.ambientweather.net:443`
    pub realtime_endpoint: String,

    /// Delay before retrying a failed request for the same API key
    /// Default: 1 second
    pub retry_delay: Duration,

    /// Delay inserted between API keys every `pacing_interval` keys
    /// Default: 1 second
    pub pacing_delay: Duration,

    /// Number of API keys between pacing delays
    /// Default: 3
    pub pacing_interval: usize,

    /// HTTP connect timeout
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// HTTP read timeout
    /// Default: 10 seconds
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rest_endpoint: rest_client::DEFAULT_DEVICES_ENDPOINT.to_string(),
            realtime_endpoint: ambient_realtime::DEFAULT_REALTIME_ENDPOINT.to_string(),
            retry_delay: Duration::from_secs(1),
            pacing_delay: Duration::from_secs(1),
            pacing_interval: 3,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create a ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.rest_endpoint.trim().is_empty() {
            return Err(WeatherError::Configuration(
                "REST endpoint must not be empty".to_string(),
            ));
        }

        if self.realtime_endpoint.trim().is_empty() {
            return Err(WeatherError::Configuration(
                "Realtime endpoint must not be empty".to_string(),
            ));
        }

        if self.pacing_interval == 0 {
            return Err(WeatherError::Configuration(
                "Pacing interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_rest_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.rest_endpoint = endpoint.into();
        self
    }

    pub fn with_realtime_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.realtime_endpoint = endpoint.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_pacing(mut self, delay: Duration, interval: usize) -> Self {
        self.pacing_delay = delay;
        self.pacing_interval = interval;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}
