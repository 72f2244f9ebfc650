//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, test_state};

#[tokio::test]
async fn health_check_returns_ok_with_version() {
    let (_store, state) = test_state();
    let response = get(build_test_app(state), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["dbHealthy"], true);
    assert_eq!(json["connections"], 0);
}

#[tokio::test]
async fn health_check_counts_open_connections() {
    let (_store, state) = test_state();
    let _rx = state.registry.register("c1".to_string()).await;
    let response = get(build_test_app(state), "/health").await;

    assert_eq!(body_json(response).await["connections"], 1);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_store, state) = test_state();
    let response = get(build_test_app(state), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (_store, state) = test_state();
    let response = get(build_test_app(state), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn plain_get_on_ws_route_is_not_upgraded() {
    let (_store, state) = test_state();
    let response = get(build_test_app(state), "/api/v1/ws").await;

    assert!(response.status().is_client_error());
}
