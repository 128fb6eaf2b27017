//! Poll the device listing for every API key
//!
//! Keys are read from the environment:
//! - `AMBIENT_APPLICATION_KEY`: the application key
//! - `AMBIENT_API_KEYS`: comma-separated user API keys
//!
//! Run with: cargo run -p ambient-weather --example poll_devices

use std::env;
use std::error::Error;

use ambient_weather::logging::{init_logging, LoggingMode};
use ambient_weather::{subscribed_device_names, WeatherClient, WeatherError};

fn main() -> Result<(), Box<dyn Error>> {
    init_logging(LoggingMode::Development)?;

    let application_key = env::var("AMBIENT_APPLICATION_KEY")?;
    let api_keys: Vec<String> = env::var("AMBIENT_API_KEYS")?
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    println!("Ambient Weather - device polling");
    println!("================================");

    let client = WeatherClient::new(application_key, api_keys);

    for listing in client.retrieve_all(2) {
        match listing {
            Ok(listing) => {
                // A device listing has the same shape as a `subscribed` event's devices
                let names = subscribed_device_names(&serde_json::json!({ "devices": listing.payload }))
                    .unwrap_or_default();
                println!("{} device(s): {}", names.len(), names.join(", "));
                println!("{}", listing.payload);
            }
            Err(WeatherError::Unauthorized { api_key }) => {
                println!("API key {} was rejected, stopping", api_key);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
