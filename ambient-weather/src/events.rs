//! Event kinds and the callback table

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{CallbackError, Result, WeatherError};

/// Result returned by a user callback
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// A registered event handler
///
/// For `connect`, the payload is a JSON array of whatever arguments the
/// transport supplied with the acknowledgement.
pub type EventCallback = Box<dyn FnMut(&Value) -> CallbackResult + Send>;

/// The inbound events a client dispatches to callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connect,
    Data,
    Subscribed,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Connect, EventKind::Data, EventKind::Subscribed];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connect => "connect",
            EventKind::Data => "data",
            EventKind::Subscribed => "subscribed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = WeatherError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "connect" => Ok(EventKind::Connect),
            "data" => Ok(EventKind::Data),
            "subscribed" => Ok(EventKind::Subscribed),
            other => Err(WeatherError::UnknownEvent(other.to_string())),
        }
    }
}

/// At most one handler per event kind; an empty slot means default behavior
#[derive(Default)]
pub(crate) struct EventHandlers {
    connect: Option<EventCallback>,
    data: Option<EventCallback>,
    subscribed: Option<EventCallback>,
}

impl EventHandlers {
    /// Store `callback`, returning the handler it replaced
    pub(crate) fn set(&mut self, kind: EventKind, callback: EventCallback) -> Option<EventCallback> {
        self.slot_mut(kind).replace(callback)
    }

    pub(crate) fn remove(&mut self, kind: EventKind) -> Option<EventCallback> {
        self.slot_mut(kind).take()
    }

    pub(crate) fn is_registered(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Connect => self.connect.is_some(),
            EventKind::Data => self.data.is_some(),
            EventKind::Subscribed => self.subscribed.is_some(),
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: EventKind) -> &mut Option<EventCallback> {
        match kind {
            EventKind::Connect => &mut self.connect,
            EventKind::Data => &mut self.data,
            EventKind::Subscribed => &mut self.subscribed,
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<_> = EventKind::ALL
            .iter()
            .filter(|kind| self.is_registered(**kind))
            .map(EventKind::as_str)
            .collect();
        f.debug_struct("EventHandlers").field("registered", &registered).finish()
    }
}

/// Extract `devices[*].info.name` from a `subscribed` acknowledgement
///
/// # Example
///
/// ```
/// use ambient_weather::subscribed_device_names;
/// use serde_json::json;
///
/// let ack = json!({"devices": [{"info": {"name": "Backyard"}}]});
/// assert_eq!(subscribed_device_names(&ack).unwrap(), vec!["Backyard"]);
/// ```
pub fn subscribed_device_names(payload: &Value) -> Result<Vec<String>> {
    let devices = payload
        .get("devices")
        .and_then(Value::as_array)
        .ok_or_else(|| WeatherError::MalformedPayload("missing 'devices' array".to_string()))?;

    devices
        .iter()
        .enumerate()
        .map(|(i, device)| {
            let info = device
                .get("info")
                .ok_or_else(|| WeatherError::MalformedPayload(format!("devices[{}] has no 'info'", i)))?;
            info.get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    WeatherError::MalformedPayload(format!("devices[{}].info has no string 'name'", i))
                })
        })
        .collect()
}
