//! Common test utilities for integration tests
//!
//! Each `TestApp` owns a fresh temporary data directory, so tests never
//! share state.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use pet_care_backend::{config::AppConfig, routes, state::AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub data_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with the adviser switched off
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default test config
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(&data_dir);
        adjust(&mut config);

        let metrics = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState::new(config, metrics)
            .await
            .expect("Failed to build app state");
        let app = routes::create_router(state.clone());

        Self { app, state, data_dir }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make a PUT request with JSON body
    pub async fn put(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// GET and parse the body as JSON
    pub async fn get_json(&self, path: &str) -> Value {
        let (status, body) = self.get(path).await;
        assert_eq!(status, StatusCode::OK, "GET {} failed: {}", path, body);
        serde_json::from_str(&body).unwrap()
    }

    /// Register a pet and return its id
    pub async fn create_pet(&self, name: &str, species: &str) -> String {
        let body = json!({
            "name": name,
            "species": species,
            "vet_contact": {
                "name": "Dr. Reyes",
                "clinic_name": "Happy Paws Clinic",
                "phone": "555-0100"
            }
        });
        let (status, response) = self.post("/api/v1/pets", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "create pet failed: {}", response);

        let pet: Value = serde_json::from_str(&response).unwrap();
        pet["id"].as_str().unwrap().to_string()
    }

    /// Pending notifications in the outbox
    pub async fn scheduled(&self) -> Vec<Value> {
        self.get_json("/api/v1/notifications/scheduled")
            .await
            .as_array()
            .unwrap()
            .clone()
    }

    /// Immediately delivered notifications, newest first
    pub async fn delivered(&self) -> Vec<Value> {
        self.get_json("/api/v1/notifications/delivered")
            .await
            .as_array()
            .unwrap()
            .clone()
    }
}

fn test_config(data_dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.storage.data_dir = data_dir.path().to_path_buf();
    config.storage.debounce_ms = 20;
    config
}
