//! # Ambient Weather - sync-first client
//!
//! Reads weather station telemetry from the Ambient Weather cloud in two ways:
//!
//! - **Polling**: [`WeatherClient::retrieve_all`] lazily fetches the device
//!   listing for each API key over REST, with bounded retry and pacing that
//!   respects the per-key and per-application rate limits.
//! - **Push**: [`WeatherClient::connect`] opens a realtime connection,
//!   [`WeatherClient::subscribe`] selects devices, and
//!   [`WeatherClient::wait`] dispatches `connect`, `data` and `subscribed`
//!   events to registered callbacks on the calling thread.
//!
//! ```rust,no_run
//! use ambient_weather::WeatherClient;
//!
//! let client = WeatherClient::new("application-key", ["api-key"]);
//! for listing in client.retrieve_all(1) {
//!     match listing {
//!         Ok(listing) => println!("{}", listing.payload),
//!         Err(e) => eprintln!("retrieval stopped: {}", e),
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ambient-weather (WeatherClient, callbacks, retry/pacing)
//!     ↓                          ↓
//! rest-client (ureq)       ambient-realtime (Transport seam, Socket.IO)
//! ```
//!
//! Push mode needs the `realtime` feature (on by default) or a custom
//! [`Transport`] passed to [`WeatherClient::with_transport`].

pub use client::{ConnectionState, WeatherClient};
pub use config::ClientConfig;
pub use credentials::{ApiKeys, Credentials};
pub use error::{CallbackError, Result, WeatherError};
pub use events::{subscribed_device_names, CallbackResult, EventCallback, EventKind};
pub use retrieval::{DeviceData, DeviceDataIter, DeviceFetcher, Sleeper, ThreadSleeper};

// Transport seam, for custom push implementations
pub use ambient_realtime::{InboundEvent, RealtimeError, Session, Transport};
pub use rest_client::{describe_status, RestClient, RestError};

pub mod logging;

mod client;
mod config;
mod credentials;
mod error;
mod events;
mod retrieval;
