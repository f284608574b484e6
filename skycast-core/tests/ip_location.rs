//! IpLocation against a mock lookup service.

use serde_json::json;
use skycast_core::{
    Coordinates, IpLocation, LocationAdapter, LocationError,
    location::{LocationSource, PositionErrorCode},
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn lookup_with(response: ResponseTemplate) -> (MockServer, IpLocation) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(response)
        .mount(&server)
        .await;
    let source = IpLocation::new(format!("{}/json", server.uri())).unwrap();
    (server, source)
}

#[tokio::test]
async fn successful_lookup_yields_coordinates() {
    let (_server, source) = lookup_with(ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "city": "Philadelphia",
        "lat": 39.95,
        "lon": -75.16
    })))
    .await;

    let coords = source.current_position().await.unwrap();
    assert_eq!(coords, Coordinates::new(39.95, -75.16));
}

#[tokio::test]
async fn failed_lookup_is_position_unavailable() {
    let (_server, source) = lookup_with(ResponseTemplate::new(200).set_body_json(json!({
        "status": "fail",
        "message": "reserved range"
    })))
    .await;

    let err = source.current_position().await.unwrap_err();
    assert_eq!(err.code, PositionErrorCode::PositionUnavailable);
    assert_eq!(err.message, "reserved range");
}

#[tokio::test]
async fn forbidden_lookup_is_permission_denied() {
    let (_server, source) = lookup_with(ResponseTemplate::new(403)).await;

    let adapter = LocationAdapter::new(Arc::new(source));
    let err = adapter.acquire_coordinates().await.unwrap_err();
    assert!(matches!(err, LocationError::PermissionDenied));
}

#[tokio::test]
async fn unreadable_reply_is_unknown_with_detail() {
    let (_server, source) = lookup_with(ResponseTemplate::new(200).set_body_string("nope")).await;

    let adapter = LocationAdapter::new(Arc::new(source));
    match adapter.acquire_coordinates().await.unwrap_err() {
        LocationError::Unknown(detail) => assert!(detail.starts_with("Unreadable lookup reply")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn slow_lookup_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(30))
                .set_body_json(json!({"status": "success", "lat": 1.0, "lon": 2.0})),
        )
        .mount(&server)
        .await;

    let source = IpLocation::with_timeout(
        format!("{}/json", server.uri()),
        std::time::Duration::from_millis(200),
    )
    .unwrap();
    let err = source.current_position().await.unwrap_err();
    assert_eq!(err.code, PositionErrorCode::Timeout);
}
