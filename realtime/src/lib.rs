//! # Ambient Weather realtime transport
//!
//! The push half of the Ambient Weather client. A [`Transport`] opens the
//! connection and forwards inbound events into a channel. What happens to
//! those events is up to the caller.
//!
//! ## Architecture
//!
//! ```text
//! WeatherClient::wait()  (caller's thread, runs user callbacks)
//!     ↑ EventReceiver
//! mpsc channel
//!     ↑ Sender<InboundEvent>
//! Transport (Socket.IO thread, reconnection)
//! ```
//!
//! The Socket.IO implementation is compiled in with the `socketio` feature
//! (enabled by default). Without it, [`default_transport`] returns `None`
//! and push mode is unavailable; polling keeps working.

pub mod error;
pub mod event;
pub mod receiver;
pub mod transport;

#[cfg(feature = "socketio")]
pub mod socketio;

use std::sync::Arc;

pub use error::{RealtimeError, Result};
pub use event::{realtime_url, InboundEvent, API_VERSION, DEFAULT_REALTIME_ENDPOINT, SUBSCRIBE_EVENT};
pub use receiver::{EventReceiver, Received};
pub use transport::{Session, Transport};
pub use url::Url;

#[cfg(feature = "socketio")]
pub use socketio::SocketIoTransport;

/// The transport compiled into this build, if any
#[cfg(feature = "socketio")]
pub fn default_transport() -> Option<Arc<dyn Transport>> {
    Some(Arc::new(SocketIoTransport::new()))
}

/// The transport compiled into this build, if any
#[cfg(not(feature = "socketio"))]
pub fn default_transport() -> Option<Arc<dyn Transport>> {
    None
}
