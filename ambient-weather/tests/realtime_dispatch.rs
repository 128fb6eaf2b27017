//! Realtime dispatch tests against an in-process transport

mod helpers;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use ambient_weather::{ConnectionState, EventKind, InboundEvent, WeatherClient, WeatherError};
use helpers::{MockTransport, SharedBuffer};
use serde_json::{json, Value};

const KEYS: [&str; 3] = ["key-a", "key-b", "key-c"];

fn connected_client(auto_subscribe: bool) -> (WeatherClient, MockTransport, SharedBuffer) {
    let transport = MockTransport::new();
    let output = SharedBuffer::default();
    let mut client = WeatherClient::new("app-key", KEYS)
        .with_transport(transport.as_transport())
        .with_output(output.clone());
    client.connect(auto_subscribe).expect("connect should succeed");
    (client, transport, output)
}

fn full_subscription() -> Value {
    json!({ "apiKeys": KEYS })
}

#[test]
fn test_connect_url_carries_session_parameters() {
    let (_client, transport, _) = connected_client(false);
    let urls = transport.opened_urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://api.ambientweather.net/"));
    assert!(urls[0].ends_with("?api=1&applicationKey=app-key"));
}

#[test]
fn test_subscribe_without_arguments_sends_every_key() {
    let (client, transport, _) = connected_client(false);

    client.subscribe_all().unwrap();

    assert_eq!(transport.subscribe_payloads(), vec![full_subscription()]);
}

#[test]
fn test_subscribe_normalizes_bare_key() {
    let (client, transport, _) = connected_client(false);

    client.subscribe("X").unwrap();
    client.subscribe(["X", "Y"]).unwrap();
    client.subscribe(Vec::<String>::new()).unwrap();

    assert_eq!(
        transport.subscribe_payloads(),
        vec![
            json!({ "apiKeys": ["X"] }),
            json!({ "apiKeys": ["X", "Y"] }),
            full_subscription(),
        ]
    );
}

#[test]
fn test_data_callback_replaces_default_output() {
    let (mut client, transport, output) = connected_client(false);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.on_data(move |payload| {
        sink.lock().unwrap().push(payload.clone());
        Ok(())
    });

    let observation = json!({ "macAddress": "00:0E:C6:20:0F:3B", "tempf": 64.4 });
    transport.push(InboundEvent::Data(observation.clone()));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![observation]);
    assert!(output.contents().is_empty());
}

#[test]
fn test_data_without_callback_prints_payload() {
    let (mut client, transport, output) = connected_client(false);

    transport.push(InboundEvent::Data(json!({ "tempf": 50.0 })));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(output.contents(), "{\"tempf\":50.0}\n");
}

#[test]
fn test_subscribed_without_callback_prints_device_names() {
    let (mut client, transport, output) = connected_client(false);

    transport.push(InboundEvent::Subscribed(json!({
        "devices": [
            { "info": { "name": "Station1" } },
            { "info": { "name": "Station2" } }
        ]
    })));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(output.contents(), "[\"Station1\", \"Station2\"]\n");
}

#[test]
fn test_malformed_subscribed_payload_surfaces_error() {
    let (mut client, transport, output) = connected_client(false);

    transport.push(InboundEvent::Subscribed(json!({ "devices": [{ "info": {} }] })));
    transport.push(InboundEvent::Data(json!({ "tempf": 1.0 })));
    transport.hang_up();

    assert!(matches!(client.wait(), Err(WeatherError::MalformedPayload(_))));
    assert!(output.contents().is_empty());

    // The session survives; pumping again picks up where it stopped
    client.wait().unwrap();
    assert_eq!(output.contents(), "{\"tempf\":1.0}\n");
}

#[test]
fn test_subscribed_callback_receives_raw_payload() {
    let (mut client, transport, output) = connected_client(false);
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    client.on_subscribed(move |payload| {
        *sink.lock().unwrap() = Some(payload.clone());
        Ok(())
    });

    // Shape is not checked when a callback is registered
    transport.push(InboundEvent::Subscribed(json!({ "method": "subscribe" })));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(*seen.lock().unwrap(), Some(json!({ "method": "subscribe" })));
    assert!(output.contents().is_empty());
}

#[test]
fn test_auto_subscribe_without_callback() {
    let (mut client, transport, _) = connected_client(true);

    transport.push(InboundEvent::Connect(Vec::new()));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(transport.subscribe_payloads(), vec![full_subscription()]);
}

#[test]
fn test_auto_subscribe_after_callback() {
    let (mut client, transport, _) = connected_client(true);
    let args = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&args);
    client.on_connect(move |connect_args| {
        *sink.lock().unwrap() = Some(connect_args.clone());
        Ok(())
    });

    transport.push(InboundEvent::Connect(vec![json!("hello")]));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(*args.lock().unwrap(), Some(json!(["hello"])));
    assert_eq!(transport.subscribe_payloads(), vec![full_subscription()]);
}

#[test]
fn test_auto_subscribe_survives_callback_error() {
    let (mut client, transport, _) = connected_client(true);
    client.on_connect(|_| Err("dashboard offline".into()));

    transport.push(InboundEvent::Connect(Vec::new()));
    transport.hang_up();

    match client.wait() {
        Err(WeatherError::Callback { event, source }) => {
            assert_eq!(event, EventKind::Connect);
            assert_eq!(source.to_string(), "dashboard offline");
        }
        other => panic!("Expected callback error, got {:?}", other),
    }
    assert_eq!(transport.subscribe_payloads(), vec![full_subscription()]);
}

#[test]
fn test_auto_subscribe_survives_callback_panic() {
    let (mut client, transport, _) = connected_client(true);
    client.on_connect(|_| panic!("handler bug"));

    transport.push(InboundEvent::Connect(Vec::new()));
    transport.hang_up();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| client.wait()));

    assert!(outcome.is_err());
    assert_eq!(transport.subscribe_payloads(), vec![full_subscription()]);
}

#[test]
fn test_auto_subscribe_fires_once_per_connection() {
    let (mut client, transport, _) = connected_client(true);

    transport.push(InboundEvent::Connect(Vec::new()));
    transport.push(InboundEvent::Disconnected("ping timeout".to_string()));
    transport.push(InboundEvent::Connect(Vec::new()));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(transport.subscribe_payloads().len(), 2);
}

#[test]
fn test_no_auto_subscribe_when_not_requested() {
    let (mut client, transport, _) = connected_client(false);

    transport.push(InboundEvent::Connect(Vec::new()));
    transport.hang_up();
    client.wait().unwrap();

    assert!(transport.subscribe_payloads().is_empty());
}

#[test]
fn test_events_are_not_dispatched_before_wait() {
    let (mut client, transport, _) = connected_client(false);
    let count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&count);
    client.on_data(move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    transport.push(InboundEvent::Data(json!({})));
    transport.push(InboundEvent::Data(json!({})));
    assert_eq!(*count.lock().unwrap(), 0);

    transport.hang_up();
    client.wait().unwrap();
    assert_eq!(*count.lock().unwrap(), 2);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[test]
fn test_registering_again_replaces_handler() {
    let (mut client, transport, _) = connected_client(false);
    let calls = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&calls);
    client.on(EventKind::Data, move |_| {
        first.lock().unwrap().push("first");
        Ok(())
    });
    let second = Arc::clone(&calls);
    client
        .on_named("data", move |_| {
            second.lock().unwrap().push("second");
            Ok(())
        })
        .unwrap();

    transport.push(InboundEvent::Data(json!({})));
    transport.hang_up();
    client.wait().unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["second"]);
}
