//! Socket.IO backed transport
//!
//! Wraps the blocking `rust_socketio` client. The library runs its own
//! polling thread and reconnection logic; every callback registered here only
//! forwards into the event channel so that user code runs on the thread that
//! pumps the client.

use std::sync::mpsc::Sender;
use std::time::Duration;

use rust_socketio::client::Client;
use rust_socketio::{ClientBuilder, Event, Payload, RawClient, TransportType};
use serde_json::Value;
use url::Url;

use crate::error::{RealtimeError, Result};
use crate::event::InboundEvent;
use crate::transport::{Session, Transport};

/// Transport that speaks Socket.IO over a secure websocket
#[derive(Debug, Clone)]
pub struct SocketIoTransport {
    reconnect: bool,
    reconnect_delay: Duration,
}

impl SocketIoTransport {
    /// Websocket-only transport with library-managed reconnection
    pub fn new() -> Self {
        Self {
            reconnect: true,
            reconnect_delay: Duration::from_secs(1),
        }
    }

    /// Enable or disable transport-level reconnection
    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Minimum delay between reconnection attempts
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl Default for SocketIoTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SocketIoTransport {
    fn open(&self, url: &Url, events: Sender<InboundEvent>) -> Result<Box<dyn Session>> {
        let connect_tx = events.clone();
        let data_tx = events.clone();
        let subscribed_tx = events.clone();
        let close_tx = events;

        let delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX);

        tracing::debug!("Opening Socket.IO connection to {}", url.host_str().unwrap_or("?"));

        let client = ClientBuilder::new(url.as_str())
            .transport_type(TransportType::Websocket)
            .reconnect(self.reconnect)
            .reconnect_delay(delay_ms, delay_ms.saturating_mul(5))
            .on(Event::Connect, move |payload: Payload, _: RawClient| {
                forward(&connect_tx, InboundEvent::Connect(payload_values(payload)));
            })
            .on("data", move |payload: Payload, _: RawClient| {
                forward(&data_tx, InboundEvent::Data(first_value(payload)));
            })
            .on("subscribed", move |payload: Payload, _: RawClient| {
                forward(&subscribed_tx, InboundEvent::Subscribed(first_value(payload)));
            })
            .on(Event::Close, move |payload: Payload, _: RawClient| {
                let reason = payload_values(payload)
                    .into_iter()
                    .next()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                forward(&close_tx, InboundEvent::Disconnected(reason));
            })
            .connect()
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;

        Ok(Box::new(SocketIoSession { client }))
    }
}

struct SocketIoSession {
    client: Client,
}

impl Session for SocketIoSession {
    fn emit(&self, event: &str, payload: Value) -> Result<()> {
        self.client
            .emit(event, Payload::Text(vec![payload]))
            .map_err(|e| RealtimeError::Emit {
                event: event.to_string(),
                reason: e.to_string(),
            })
    }

    fn close(&self) -> Result<()> {
        self.client
            .disconnect()
            .map_err(|e| RealtimeError::Close(e.to_string()))
    }
}

fn forward(tx: &Sender<InboundEvent>, event: InboundEvent) {
    let name = event.name();
    if tx.send(event).is_err() {
        tracing::debug!("Dropping '{}' event, receiver is gone", name);
    }
}

#[allow(deprecated)]
fn payload_values(payload: Payload) -> Vec<Value> {
    match payload {
        Payload::Text(values) => values,
        Payload::String(text) => {
            vec![serde_json::from_str(&text).unwrap_or(Value::String(text))]
        }
        Payload::Binary(bytes) => {
            vec![Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())]
        }
    }
}

fn first_value(payload: Payload) -> Value {
    payload_values(payload).into_iter().next().unwrap_or(Value::Null)
}
