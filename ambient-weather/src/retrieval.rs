//! Polling retrieval with bounded retry and key pacing
//!
//! This module implements the bulk retrieval algorithm that:
//! 1. Requests the device list for each API key in configured order
//! 2. Retries failed statuses up to `max_retries` times, one retry delay apart
//! 3. Skips keys whose retries are exhausted
//! 4. Stops on an authentication failure, which no retry can fix
//! 5. Inserts a pacing delay every few keys to respect the application key limit

use std::iter::FusedIterator;
use std::time::Duration;

use rest_client::{describe_status, RestClient, RestError};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::credentials::{mask, Credentials};
use crate::error::{Result, WeatherError};

/// Blocking delay used between retries and between keys
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if duration > Duration::ZERO {
            std::thread::sleep(duration);
        }
    }
}

/// Source of per-key device listings
pub trait DeviceFetcher: Send + Sync {
    fn fetch(&self, application_key: &str, api_key: &str) -> std::result::Result<Value, RestError>;
}

impl DeviceFetcher for RestClient {
    fn fetch(&self, application_key: &str, api_key: &str) -> std::result::Result<Value, RestError> {
        self.get_devices(application_key, api_key)
    }
}

/// Device listing returned for one API key
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceData {
    /// Key the listing was requested with
    pub api_key: String,
    /// Response body, passed through untouched
    pub payload: Value,
}

/// Delays applied by [`DeviceDataIter`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pacing {
    pub retry_delay: Duration,
    pub pacing_delay: Duration,
    pub pacing_interval: usize,
}

impl Pacing {
    /// Whether a pacing delay follows the key at `index`.
    ///
    /// Only nonzero multiples of the interval pace, and never after the last key.
    fn after(&self, index: usize, total: usize) -> bool {
        index != 0 && index % self.pacing_interval == 0 && index + 1 < total
    }
}

/// Lazy iterator over device listings, one per API key
///
/// Created by [`WeatherClient::retrieve_all`](crate::WeatherClient::retrieve_all).
/// Keys whose retries are exhausted are skipped, so the iterator may yield
/// fewer items than there are keys. An `Err` item ends the iteration.
///
/// Work happens only inside `next()`: dropping the iterator between items
/// cancels the retrieval without leaving a request or delay behind. Calling
/// `retrieve_all` again starts over from the first key.
pub struct DeviceDataIter<'a> {
    fetcher: &'a dyn DeviceFetcher,
    sleeper: &'a dyn Sleeper,
    credentials: &'a Credentials,
    pacing: Pacing,
    max_retries: u32,
    index: usize,
    finished: bool,
}

impl<'a> DeviceDataIter<'a> {
    pub(crate) fn new(
        fetcher: &'a dyn DeviceFetcher,
        sleeper: &'a dyn Sleeper,
        credentials: &'a Credentials,
        pacing: Pacing,
        max_retries: u32,
    ) -> Self {
        Self {
            fetcher,
            sleeper,
            credentials,
            pacing,
            max_retries,
            index: 0,
            finished: false,
        }
    }

    /// Number of keys not yet requested
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.credentials.api_keys().len().saturating_sub(self.index)
        }
    }

    /// Request one key, retrying failed statuses. `Ok(None)` means skipped.
    fn fetch_with_retry(&self, api_key: &str) -> Result<Option<Value>> {
        let mut attempt = 0;

        loop {
            match self.fetcher.fetch(self.credentials.application_key(), api_key) {
                Ok(payload) => {
                    info!("Request for API key {} succeeded", mask(api_key));
                    return Ok(Some(payload));
                }
                Err(e) if e.is_unauthorized() => {
                    error!("One or more of the API keys are invalid (HTTP 401)");
                    return Err(WeatherError::Unauthorized {
                        api_key: mask(api_key),
                    });
                }
                Err(RestError::Status(code)) => {
                    let reason = describe_status(code);
                    if attempt >= self.max_retries {
                        warn!(
                            "Request returned code {}: {}, maximum number of retries reached, skipping {}",
                            code,
                            reason,
                            mask(api_key)
                        );
                        return Ok(None);
                    }

                    warn!("Request returned code {}: {}, retrying...", code, reason);
                    self.sleeper.sleep(self.pacing.retry_delay);
                    attempt += 1;
                }
                Err(e) => {
                    error!("Request for API key {} failed: {}", mask(api_key), e);
                    return Err(e.into());
                }
            }
        }
    }
}

impl Iterator for DeviceDataIter<'_> {
    type Item = Result<DeviceData>;

    fn next(&mut self) -> Option<Self::Item> {
        let keys = self.credentials.api_keys();

        while !self.finished && self.index < keys.len() {
            let index = self.index;
            self.index += 1;

            // The pacing delay owed by the previous key is taken here, so a
            // consumer that stops pulling never waits for it.
            if index > 0 && self.pacing.after(index - 1, keys.len()) {
                debug!("Pacing before API key #{}", index);
                self.sleeper.sleep(self.pacing.pacing_delay);
            }

            let api_key = &keys[index];
            debug!("Requesting data for API key {}", mask(api_key));

            match self.fetch_with_retry(api_key) {
                Ok(Some(payload)) => {
                    return Some(Ok(DeviceData {
                        api_key: api_key.clone(),
                        payload,
                    }))
                }
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        self.finished = true;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl FusedIterator for DeviceDataIter<'_> {}
