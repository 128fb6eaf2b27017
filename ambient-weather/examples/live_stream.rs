//! Stream realtime station updates
//!
//! Keys are read from the environment:
//! - `AMBIENT_APPLICATION_KEY`: the application key
//! - `AMBIENT_API_KEYS`: comma-separated user API keys
//!
//! An optional first argument limits the session length in seconds.
//!
//! Run with: cargo run -p ambient-weather --example live_stream -- 60

use std::env;
use std::error::Error;
use std::time::Duration;

use ambient_weather::logging::init_logging_from_env;
use ambient_weather::{subscribed_device_names, WeatherClient, WeatherError};

fn main() -> Result<(), Box<dyn Error>> {
    init_logging_from_env()?;

    let application_key = env::var("AMBIENT_APPLICATION_KEY")?;
    let api_keys: Vec<String> = env::var("AMBIENT_API_KEYS")?
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();
    let duration = env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .map(Duration::from_secs);

    let mut client = WeatherClient::new(application_key, api_keys);
    if !client.realtime_available() {
        eprintln!("This build has no realtime transport");
        return Ok(());
    }

    client
        .on_connect(|_| {
            println!("Connected, subscribing...");
            Ok(())
        })
        .on_subscribed(|payload| {
            let names = subscribed_device_names(payload)?;
            println!("Subscribed to {} station(s): {}", names.len(), names.join(", "));
            Ok(())
        })
        .on_data(|payload| {
            let station = payload["macAddress"].as_str().unwrap_or("unknown");
            let temperature = payload["tempf"].as_f64();
            match temperature {
                Some(t) => println!("{}: {:.1}°F", station, t),
                None => println!("{}: {}", station, payload),
            }
            Ok(())
        });

    client.connect(true)?;

    match duration {
        Some(limit) => {
            client.wait_for(limit)?;
            match client.disconnect() {
                // The server may have closed the session first
                Ok(()) | Err(WeatherError::NotConnected) => {}
                Err(e) => return Err(e.into()),
            }
        }
        None => client.wait()?,
    }

    Ok(())
}
