//! Transport seam between the client and a concrete push implementation

use std::sync::mpsc;

use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::event::InboundEvent;

/// Something that can open a push connection to the realtime endpoint
///
/// Implementations forward every inbound `connect`, `data` and `subscribed`
/// event, plus disconnect notifications, into `events`. They must never
/// invoke user code themselves: the client drains the channel on the caller's
/// thread. Dropping every clone of the sender ends the session from the
/// client's point of view.
pub trait Transport: Send + Sync {
    /// Open a connection to `url` (which already carries the session parameters)
    fn open(&self, url: &Url, events: mpsc::Sender<InboundEvent>) -> Result<Box<dyn Session>>;
}

/// A live connection returned by [`Transport::open`]
pub trait Session: Send {
    /// Send a named event with a JSON body
    fn emit(&self, event: &str, payload: Value) -> Result<()>;

    /// Close the connection
    fn close(&self) -> Result<()>;
}
