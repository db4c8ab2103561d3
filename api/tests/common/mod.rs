// Shared fixtures for the router-level tests
#![allow(dead_code)]

use std::sync::Arc;

use api::config::AppConfig;
use api::metrics;
use api::routes;
use api::state::AppState;
use api::storage::{MemoryStore, RegistrationStore};
use api::validation::FixedClock;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use prometheus::Registry;
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn memory_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "STORAGE_BACKEND" => Some("memory".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn app_with_store(store: Arc<dyn RegistrationStore>) -> Router {
    let config = memory_config();
    let registry = Registry::new_custom(Some("test".into()), None).unwrap();
    metrics::register_all(&registry).unwrap();
    let state = AppState::with_clock(store, Arc::new(FixedClock(today())), &config, registry).unwrap();
    routes::app(state, &config.http)
}

pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (app_with_store(store.clone()), store)
}

pub fn valid_registration() -> Value {
    json!({
        "firstName": "Alice",
        "lastName": "Liddell",
        "username": "alice01",
        "email": "alice01@mail.com",
        "mobile": "9876543211",
        "dob": "2000-01-01",
        "gender": "female",
        "address": "42 Baker Street, London",
        "postalCode": "560001",
        "country": "India",
        "state": "Karnataka",
        "city": "Bangalore",
        "education": "Bachelors",
        "password": "Abcdef1!",
        "securityQuestion": "What was the name of your first pet?",
        "securityAnswer": "Fluffy",
        "profilePhoto": "data:image/png;base64,iVBORw0KGgo="
    })
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
