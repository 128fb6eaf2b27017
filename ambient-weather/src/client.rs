//! WeatherClient - main entry point for the SDK
//!
//! Provides a sync-first API over both the REST (polling) and realtime
//! (push) halves of the Ambient Weather service.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ambient_realtime::{
    realtime_url, EventReceiver, InboundEvent, Received, RealtimeError, Session, Transport,
    SUBSCRIBE_EVENT,
};
use rest_client::RestClient;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::credentials::{ApiKeys, Credentials};
use crate::error::{Result, WeatherError};
use crate::events::{subscribed_device_names, CallbackResult, EventHandlers, EventKind};
use crate::retrieval::{DeviceDataIter, DeviceFetcher, Pacing, Sleeper, ThreadSleeper};

/// Realtime connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; `connect` may be called
    Disconnected,
    /// Session opened, waiting for the transport's `connect` event
    /// (also entered while the transport is reconnecting)
    Connecting,
    /// The transport reported a live connection
    Connected,
}

struct ActiveSession {
    handle: Box<dyn Session>,
    events: EventReceiver,
    auto_subscribe: bool,
}

/// Client for one application key and a list of API keys
///
/// WeatherClient is fully synchronous. Polling blocks the calling thread;
/// realtime callbacks run on whichever thread calls [`wait`](Self::wait) or
/// [`wait_for`](Self::wait_for). A client is meant for a single owner.
///
/// # Example
///
/// ```rust,no_run
/// use ambient_weather::WeatherClient;
///
/// fn main() -> Result<(), ambient_weather::WeatherError> {
///     let mut client = WeatherClient::new("application-key", ["api-key-1", "api-key-2"]);
///
///     // Polling: one listing per API key, retrying each failure twice
///     for listing in client.retrieve_all(2) {
///         let listing = listing?;
///         println!("{}: {}", listing.api_key, listing.payload);
///     }
///
///     // Push: register handlers, connect, then pump events
///     client.on_data(|observation| {
///         println!("tempf = {}", observation["tempf"]);
///         Ok(())
///     });
///     client.connect(true)?;
///     client.wait()?;
///     Ok(())
/// }
/// ```
pub struct WeatherClient {
    credentials: Credentials,
    config: ClientConfig,
    fetcher: Box<dyn DeviceFetcher>,
    sleeper: Box<dyn Sleeper>,
    transport: Option<Arc<dyn Transport>>,
    handlers: EventHandlers,
    output: Box<dyn Write + Send>,
    session: Option<ActiveSession>,
    state: ConnectionState,
}

impl WeatherClient {
    /// Create a client with the default configuration
    ///
    /// Push mode uses the transport compiled into this build, if any.
    pub fn new<I, K>(application_key: impl Into<String>, api_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::build(Credentials::new(application_key, api_keys), ClientConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config<I, K>(
        application_key: impl Into<String>,
        api_keys: I,
        config: ClientConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        config.validate()?;
        Ok(Self::build(Credentials::new(application_key, api_keys), config))
    }

    fn build(credentials: Credentials, config: ClientConfig) -> Self {
        let fetcher = RestClient::with_timeouts(
            config.rest_endpoint.clone(),
            config.connect_timeout,
            config.read_timeout,
        );

        info!(
            "Created weather client for {} API key(s)",
            credentials.api_keys().len()
        );

        Self {
            credentials,
            config,
            fetcher: Box::new(fetcher),
            sleeper: Box::new(ThreadSleeper),
            transport: ambient_realtime::default_transport(),
            handlers: EventHandlers::default(),
            output: Box::new(std::io::stdout()),
            session: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Replace the device listing source used by [`retrieve_all`](Self::retrieve_all)
    pub fn with_fetcher(mut self, fetcher: impl DeviceFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Replace how retry and pacing delays are waited out
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Use a specific push transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Disable push mode; `connect` will fail with `TransportUnavailable`
    pub fn without_transport(mut self) -> Self {
        self.transport = None;
        self
    }

    /// Redirect default `data`/`subscribed` output (stdout by default)
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Whether push mode can be used at all
    pub fn realtime_available(&self) -> bool {
        self.transport.is_some()
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Lazily fetch the device listing for every API key, in order
    ///
    /// Each failed status is retried up to `max_retries` times; a key that
    /// keeps failing is skipped. An invalid key (HTTP 401) or a transport
    /// failure is yielded as an `Err` and ends the iteration.
    pub fn retrieve_all(&self, max_retries: u32) -> DeviceDataIter<'_> {
        let pacing = Pacing {
            retry_delay: self.config.retry_delay,
            pacing_delay: self.config.pacing_delay,
            pacing_interval: self.config.pacing_interval,
        };

        DeviceDataIter::new(
            self.fetcher.as_ref(),
            self.sleeper.as_ref(),
            &self.credentials,
            pacing,
            max_retries,
        )
    }

    // ========================================================================
    // Realtime
    // ========================================================================

    /// Open the realtime connection
    ///
    /// With `auto_subscribe`, every `connect` event from the transport
    /// (including reconnects) is followed by [`subscribe_all`](Self::subscribe_all).
    /// No events are dispatched until [`wait`](Self::wait) or
    /// [`wait_for`](Self::wait_for) is called.
    pub fn connect(&mut self, auto_subscribe: bool) -> Result<()> {
        if self.state != ConnectionState::Disconnected {
            warn!("connect() called while {:?}", self.state);
            return Err(WeatherError::AlreadyConnected);
        }

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => {
                error!("No realtime transport available, the realtime API cannot be accessed");
                return Err(WeatherError::TransportUnavailable);
            }
        };

        debug!("Connecting to the Ambient Weather realtime API...");
        let url = realtime_url(&self.config.realtime_endpoint, self.credentials.application_key())?;
        let (events_tx, events) = EventReceiver::channel();

        self.state = ConnectionState::Connecting;
        let handle = match transport.open(&url, events_tx) {
            Ok(handle) => handle,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                error!("Failed to open realtime connection: {}", e);
                return Err(e.into());
            }
        };

        self.session = Some(ActiveSession {
            handle,
            events,
            auto_subscribe,
        });
        Ok(())
    }

    /// Request updates for the given API keys
    ///
    /// Accepts a single key or any list of keys. An empty selection means
    /// every configured key. The acknowledgement arrives later as a
    /// `subscribed` event.
    pub fn subscribe(&self, api_keys: impl Into<ApiKeys>) -> Result<()> {
        let api_keys = api_keys.into();
        let api_keys = if api_keys.is_empty() {
            self.credentials.api_keys().to_vec()
        } else {
            api_keys.into_vec()
        };

        emit_subscribe(self.active()?.handle.as_ref(), api_keys)?;
        Ok(())
    }

    /// Request updates for every configured API key
    pub fn subscribe_all(&self) -> Result<()> {
        self.subscribe(ApiKeys::default())
    }

    /// Register the handler for `kind`, replacing any previous one
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> &mut Self
    where
        F: FnMut(&Value) -> CallbackResult + Send + 'static,
    {
        if self.handlers.set(kind, Box::new(callback)).is_some() {
            debug!("Replaced existing '{}' handler", kind);
        }
        self
    }

    /// Register a handler by event name
    ///
    /// Fails with `UnknownEvent` for anything but `connect`, `data` or
    /// `subscribed`.
    pub fn on_named<F>(&mut self, event: &str, callback: F) -> Result<&mut Self>
    where
        F: FnMut(&Value) -> CallbackResult + Send + 'static,
    {
        let kind: EventKind = event.parse()?;
        Ok(self.on(kind, callback))
    }

    /// Called with the transport's connect arguments as a JSON array
    pub fn on_connect<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&Value) -> CallbackResult + Send + 'static,
    {
        self.on(EventKind::Connect, callback)
    }

    /// Called with each observation; replaces printing to the output
    pub fn on_data<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&Value) -> CallbackResult + Send + 'static,
    {
        self.on(EventKind::Data, callback)
    }

    /// Called with each subscription acknowledgement; replaces printing device names
    pub fn on_subscribed<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&Value) -> CallbackResult + Send + 'static,
    {
        self.on(EventKind::Subscribed, callback)
    }

    /// Drop the handler for `kind`, restoring default behavior
    pub fn remove_handler(&mut self, kind: EventKind) -> bool {
        self.handlers.remove(kind).is_some()
    }

    /// Dispatch events until the transport closes the session
    ///
    /// Returns early with the first callback or payload error. The session
    /// stays open in that case and calling `wait` again resumes dispatch.
    pub fn wait(&mut self) -> Result<()> {
        loop {
            match self.active()?.events.recv() {
                Some(event) => self.dispatch(event)?,
                None => {
                    self.end_session();
                    return Ok(());
                }
            }
        }
    }

    /// Dispatch events for at most `timeout`
    ///
    /// A timeout too large to represent as a deadline behaves like [`wait`](Self::wait).
    pub fn wait_for(&mut self, timeout: Duration) -> Result<()> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.wait(),
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }

            match self.active()?.events.recv_timeout(remaining) {
                Received::Event(event) => self.dispatch(event)?,
                Received::Timeout | Received::Empty => return Ok(()),
                Received::Closed => {
                    self.end_session();
                    return Ok(());
                }
            }
        }
    }

    /// Close the realtime connection
    pub fn disconnect(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(WeatherError::NotConnected)?;
        self.state = ConnectionState::Disconnected;
        session.handle.close()?;
        info!("Disconnected from the Ambient Weather realtime API");
        Ok(())
    }

    fn active(&self) -> Result<&ActiveSession> {
        self.session.as_ref().ok_or(WeatherError::NotConnected)
    }

    fn end_session(&mut self) {
        info!("Realtime session closed by transport");
        self.session = None;
        self.state = ConnectionState::Disconnected;
    }

    fn dispatch(&mut self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::Connect(args) => self.handle_connected(args),
            InboundEvent::Data(payload) => self.handle_data(payload),
            InboundEvent::Subscribed(payload) => self.handle_subscribed(payload),
            InboundEvent::Disconnected(reason) => {
                warn!("Realtime connection lost ({}), waiting for reconnect", reason);
                self.state = ConnectionState::Connecting;
                Ok(())
            }
        }
    }

    fn handle_connected(&mut self, args: Vec<Value>) -> Result<()> {
        info!("Connected to the Ambient Weather realtime API");
        self.state = ConnectionState::Connected;

        let Self {
            handlers,
            session,
            credentials,
            ..
        } = self;

        // Fires when this scope ends, including on callback error or panic.
        let _auto_subscribe = session
            .as_ref()
            .filter(|s| s.auto_subscribe)
            .map(|s| AutoSubscribe {
                session: s.handle.as_ref(),
                api_keys: credentials.api_keys(),
            });

        if let Some(callback) = handlers.slot_mut(EventKind::Connect) {
            callback(&Value::Array(args)).map_err(|source| WeatherError::Callback {
                event: EventKind::Connect,
                source,
            })?;
        }

        Ok(())
    }

    fn handle_data(&mut self, payload: Value) -> Result<()> {
        match self.handlers.slot_mut(EventKind::Data) {
            Some(callback) => callback(&payload).map_err(|source| WeatherError::Callback {
                event: EventKind::Data,
                source,
            }),
            None => {
                writeln!(self.output, "{}", payload)?;
                Ok(())
            }
        }
    }

    fn handle_subscribed(&mut self, payload: Value) -> Result<()> {
        match self.handlers.slot_mut(EventKind::Subscribed) {
            Some(callback) => callback(&payload).map_err(|source| WeatherError::Callback {
                event: EventKind::Subscribed,
                source,
            }),
            None => {
                let names = subscribed_device_names(&payload)?;
                info!("Subscribed to {} device(s)", names.len());
                writeln!(self.output, "{:?}", names)?;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("realtime_available", &self.realtime_available())
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for WeatherClient {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.handle.close() {
                debug!("Error closing realtime session on drop: {}", e);
            }
        }
    }
}

/// Subscribes to every configured key when dropped
struct AutoSubscribe<'a> {
    session: &'a dyn Session,
    api_keys: &'a [String],
}

impl Drop for AutoSubscribe<'_> {
    fn drop(&mut self) {
        if let Err(e) = emit_subscribe(self.session, self.api_keys.to_vec()) {
            warn!("Automatic subscribe after connect failed: {}", e);
        }
    }
}

fn emit_subscribe(session: &dyn Session, api_keys: Vec<String>) -> std::result::Result<(), RealtimeError> {
    debug!("Subscribing to {} API key(s)", api_keys.len());
    session.emit(SUBSCRIBE_EVENT, json!({ "apiKeys": api_keys }))
}
