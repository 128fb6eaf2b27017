//! Polling tests against a mocked device listing endpoint

mod helpers;

use std::time::Duration;

use ambient_weather::{ClientConfig, DeviceData, WeatherClient, WeatherError};
use helpers::RecordingSleeper;
use mockito::{Matcher, Mock, Server, ServerGuard};
use rstest::rstest;
use serde_json::json;

fn client_for(server: &ServerGuard, keys: &[&str], sleeper: &RecordingSleeper) -> WeatherClient {
    let config = ClientConfig::default()
        .with_rest_endpoint(format!("{}/v1/devices", server.url()))
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));

    WeatherClient::with_config("app-key", keys.iter().copied(), config)
        .expect("valid config")
        .with_sleeper(sleeper.clone())
}

fn mock_key(server: &mut ServerGuard, api_key: &str, status: usize) -> Mock {
    server
        .mock("GET", "/v1/devices")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("applicationKey".into(), "app-key".into()),
            Matcher::UrlEncoded("apiKey".into(), api_key.into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "info": { "name": format!("station-{}", api_key) } }]).to_string())
}

#[test]
fn test_every_key_succeeds() {
    let mut server = Server::new();
    let mocks: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|key| mock_key(&mut server, key, 200).expect(1).create())
        .collect();
    let sleeper = RecordingSleeper::default();
    let client = client_for(&server, &["A", "B", "C"], &sleeper);

    let listings: Vec<DeviceData> = client
        .retrieve_all(0)
        .collect::<Result<_, _>>()
        .expect("all keys succeed");

    for mock in &mocks {
        mock.assert();
    }
    assert_eq!(
        listings.iter().map(|l| l.api_key.as_str()).collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );
    assert_eq!(listings[1].payload[0]["info"]["name"], json!("station-B"));
    assert!(sleeper.delays().is_empty());
}

#[rstest]
#[case(404)]
#[case(429)]
#[case(502)]
#[case(500)]
fn test_failing_key_is_retried_then_skipped(#[case] status: usize) {
    let mut server = Server::new();
    let failing = mock_key(&mut server, "A", status).expect(3).create();
    let healthy = mock_key(&mut server, "B", 200).expect(1).create();
    let sleeper = RecordingSleeper::default();
    let client = client_for(&server, &["A", "B"], &sleeper);

    let listings: Vec<_> = client.retrieve_all(2).collect();

    failing.assert();
    healthy.assert();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].as_ref().unwrap().api_key, "B");
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(1); 2]);
}

#[test]
fn test_unauthorized_aborts_retrieval() {
    let mut server = Server::new();
    let first = mock_key(&mut server, "A", 200).expect(1).create();
    let rejected = mock_key(&mut server, "B", 401).expect(1).create();
    let never = mock_key(&mut server, "C", 200).expect(0).create();
    let sleeper = RecordingSleeper::default();
    let client = client_for(&server, &["A", "B", "C"], &sleeper);

    let mut listings = client.retrieve_all(5);
    assert_eq!(listings.next().unwrap().unwrap().api_key, "A");
    assert!(matches!(
        listings.next(),
        Some(Err(WeatherError::Unauthorized { .. }))
    ));
    assert!(listings.next().is_none());

    first.assert();
    rejected.assert();
    never.assert();
    assert!(sleeper.delays().is_empty());
}

#[test]
fn test_retrieval_restarts_from_first_key() {
    let mut server = Server::new();
    let a = mock_key(&mut server, "A", 200).expect(2).create();
    let b = mock_key(&mut server, "B", 200).expect(1).create();
    let sleeper = RecordingSleeper::default();
    let client = client_for(&server, &["A", "B"], &sleeper);

    // Stop after the first listing, then start again
    assert_eq!(client.retrieve_all(0).next().unwrap().unwrap().api_key, "A");
    let second_run: Vec<_> = client.retrieve_all(0).map(|r| r.unwrap().api_key).collect();

    a.assert();
    b.assert();
    assert_eq!(second_run, vec!["A", "B"]);
}

#[test]
fn test_unreachable_endpoint_ends_retrieval() {
    let sleeper = RecordingSleeper::default();
    let config = ClientConfig::default()
        .with_rest_endpoint("http://127.0.0.1:9/v1/devices")
        .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
    let client = WeatherClient::with_config("app-key", ["A", "B"], config)
        .unwrap()
        .with_sleeper(sleeper.clone());

    let results: Vec<_> = client.retrieve_all(3).collect();

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(WeatherError::Rest(_))));
    assert!(sleeper.delays().is_empty());
}
