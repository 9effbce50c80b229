//! Router tests over the offline endpoints; battle routes are exercised up
//! to their parameter validation so no network is touched.

use fraywatch::api::ApiClient;
use fraywatch::cards::CardCatalog;
use fraywatch::server::routes::route_request;
use fraywatch::server::CardRegistry;

fn offline_registry() -> CardRegistry {
    let client = ApiClient::new().expect("client builds without network");
    CardRegistry::with_parts(client, CardCatalog::from_cards(vec![]))
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request(&offline_registry(), "GET", "/api/health");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
    assert!(response.body.contains("fraywatch-api"));
}

#[test]
fn unknown_route_returns_404() {
    let response = route_request(&offline_registry(), "GET", "/api/nope");
    assert_eq!(response.status_code, 404);
    assert!(response.body.contains("Route not found"));
}

#[test]
fn battle_route_requires_an_id() {
    let response = route_request(&offline_registry(), "GET", "/api/battle");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("missing query parameter 'id'"));

    let response = route_request(&offline_registry(), "GET", "/api/battle?mode=markdown");
    assert_eq!(response.status_code, 400);
}

#[test]
fn tracker_route_validates_the_team_before_fetching() {
    let response =
        route_request(&offline_registry(), "GET", "/api/battle/tracker?id=x&team=green");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("invalid team 'green'"));
}

#[test]
fn chest_route_returns_expected_values() {
    let response = route_request(&offline_registry(), "GET", "/api/chests/major?batch=2");
    assert_eq!(response.status_code, 200);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("chest payload is json");
    assert_eq!(payload["tier"], "major");
    assert_eq!(payload["batch"], 2);
    assert_eq!(payload["cost"], 1500.0);
}

#[test]
fn chest_route_rejects_bad_tier_and_batch() {
    let response = route_request(&offline_registry(), "GET", "/api/chests/mythic");
    assert_eq!(response.status_code, 400);

    let response = route_request(&offline_registry(), "GET", "/api/chests/minor?batch=0");
    assert_eq!(response.status_code, 400);
}

#[test]
fn responses_serialize_as_http_with_content_length() {
    let response = route_request(&offline_registry(), "GET", "/api/health");
    let raw = response.to_http_string();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains(&format!("Content-Length: {}", response.body.len())));
}
