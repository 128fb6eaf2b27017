//! Inbound event model and session parameters

use serde_json::Value;
use url::Url;

use crate::error::{RealtimeError, Result};

/// Realtime endpoint used when no override is configured
pub const DEFAULT_REALTIME_ENDPOINT: &str = "https://api.ambientweather.net:443";

/// Realtime API version sent as the `api` session parameter
pub const API_VERSION: &str = "1";

/// Outbound event name used to request device updates
pub const SUBSCRIBE_EVENT: &str = "subscribe";

/// Events forwarded from the transport to the client
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The transport (re)established its connection. Carries whatever
    /// arguments the server sent along with the acknowledgement.
    Connect(Vec<Value>),
    /// A weather observation for one subscribed device
    Data(Value),
    /// Acknowledgement of a `subscribe` request, listing the devices
    Subscribed(Value),
    /// The transport lost its connection. It may reconnect on its own.
    Disconnected(String),
}

impl InboundEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Connect(_) => "connect",
            InboundEvent::Data(_) => "data",
            InboundEvent::Subscribed(_) => "subscribed",
            InboundEvent::Disconnected(_) => "disconnect",
        }
    }
}

/// Build the connection URL carrying the session parameters
///
/// The realtime server identifies the account from the `applicationKey`
/// query parameter and selects the protocol revision from `api`.
pub fn realtime_url(endpoint: &str, application_key: &str) -> Result<Url> {
    Url::parse_with_params(
        endpoint,
        &[("api", API_VERSION), ("applicationKey", application_key)],
    )
    .map_err(|e| RealtimeError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
