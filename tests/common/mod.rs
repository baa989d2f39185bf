#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zbx_cachet::config::{init_test_logging, Settings};

pub const TOKEN: &str = "test-token";

/// Fake Cachet server answering the ping check
pub async fn start_cachet() -> MockServer {
    let _ = init_test_logging();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "Pong!" })))
        .mount(&server)
        .await;
    server
}

pub fn settings_for(server: &MockServer) -> Settings {
    Settings::new(server.uri(), TOKEN)
}

pub fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

pub fn incident_json(id: u64, component_id: u64, status: u8, created_at: &str) -> Value {
    json!({
        "id": id,
        "component_id": component_id,
        "name": format!("Incident {}", id),
        "status": status,
        "visible": 1,
        "message": "",
        "created_at": created_at,
        "updated_at": created_at
    })
}

pub fn component_json(id: u64, group_id: u64, status: u8) -> Value {
    json!({
        "id": id,
        "name": "db-primary",
        "description": "US-East Cluster",
        "link": "",
        "status": status,
        "order": 0,
        "group_id": group_id,
        "enabled": true
    })
}

pub fn update_json(id: u64, incident_id: u64, status: u8, message: &str) -> Value {
    json!({
        "id": id,
        "incident_id": incident_id,
        "status": status,
        "message": message,
        "user_id": 1,
        "created_at": "2024-03-01 12:00:00"
    })
}

/// Single-page incident listing
pub fn incident_page(incidents: Vec<Value>) -> ResponseTemplate {
    let count = incidents.len();
    ResponseTemplate::new(200).set_body_json(json!({
        "meta": {
            "pagination": {
                "total": count,
                "count": count,
                "per_page": 100,
                "current_page": 1,
                "total_pages": 1
            }
        },
        "data": incidents
    }))
}

/// Method and path of every request the server saw, in arrival order
pub async fn request_log(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| (r.method.as_str().to_string(), r.url.path().to_string()))
        .collect()
}
