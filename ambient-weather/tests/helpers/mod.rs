//! Shared test doubles for the ambient-weather integration tests

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ambient_weather::{InboundEvent, RealtimeError, Session, Sleeper, Transport};
use serde_json::Value;

type RealtimeResult<T> = std::result::Result<T, RealtimeError>;

#[derive(Default)]
struct MockState {
    emitted: Mutex<Vec<(String, Value)>>,
    sender: Mutex<Option<Sender<InboundEvent>>>,
    opened: Mutex<Vec<String>>,
}

/// In-process transport that records outbound events and lets the test
/// inject inbound ones
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    /// Queue an inbound event for the next `wait`
    pub fn push(&self, event: InboundEvent) {
        let sender = self.state.sender.lock().unwrap();
        sender
            .as_ref()
            .expect("transport was never opened")
            .send(event)
            .expect("client dropped its receiver");
    }

    /// Drop the sender so `wait` returns once the queue is drained
    pub fn hang_up(&self) {
        self.state.sender.lock().unwrap().take();
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.state.opened.lock().unwrap().clone()
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.state.emitted.lock().unwrap().clone()
    }

    /// Bodies of every `subscribe` emitted so far
    pub fn subscribe_payloads(&self) -> Vec<Value> {
        self.emitted()
            .into_iter()
            .filter(|(event, _)| event == "subscribe")
            .map(|(_, payload)| payload)
            .collect()
    }
}

impl Transport for MockTransport {
    fn open(&self, url: &ambient_realtime::Url, events: Sender<InboundEvent>) -> RealtimeResult<Box<dyn Session>> {
        self.state.opened.lock().unwrap().push(url.to_string());
        *self.state.sender.lock().unwrap() = Some(events);
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
}

impl Session for MockSession {
    fn emit(&self, event: &str, payload: Value) -> RealtimeResult<()> {
        self.state
            .emitted
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }

    fn close(&self) -> RealtimeResult<()> {
        Ok(())
    }
}

/// Cloneable in-memory writer for capturing default output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sleeper that records requested delays instead of sleeping
#[derive(Clone, Default)]
pub struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}
