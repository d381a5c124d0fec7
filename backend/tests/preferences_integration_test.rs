//! Integration tests for notification preferences

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pet_care_shared::NotificationPreferences;
use serde_json::{json, Value};

async fn create_task(app: &common::TestApp, pet_id: &str, due_in: Duration) {
    let body = json!({
        "pet_id": pet_id,
        "category": "grooming",
        "title": "Brush coat",
        "due_at": Utc::now() + due_in
    });
    let (status, response) = app.post("/api/v1/care/tasks", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);
}

#[tokio::test]
async fn test_defaults_returned_on_fresh_install() {
    let app = common::TestApp::new().await;

    let prefs = app.get_json("/api/v1/preferences").await;

    assert_eq!(prefs["enabled"], true);
    assert_eq!(prefs["care_reminder_minutes"], 60);
    assert_eq!(prefs["quiet_hours_start"], "22:00");
}

#[tokio::test]
async fn test_disabling_cancels_everything_and_reenabling_restores() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;
    create_task(&app, &pet_id, Duration::days(2)).await;
    create_task(&app, &pet_id, Duration::days(4)).await;
    assert_eq!(app.scheduled().await.len(), 2);

    let (status, _) = app.put("/api/v1/preferences", r#"{"enabled": false}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.scheduled().await.is_empty());

    let (status, body) = app.post("/api/v1/preferences/reset", "").await;
    assert_eq!(status, StatusCode::OK);
    let prefs: NotificationPreferences = serde_json::from_str(&body).unwrap();
    assert_eq!(prefs, NotificationPreferences::default());
    assert_eq!(app.scheduled().await.len(), 2);
}

#[tokio::test]
async fn test_lead_time_change_moves_reminder() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;
    create_task(&app, &pet_id, Duration::days(2)).await;

    app.put("/api/v1/preferences", r#"{"care_reminder_minutes": 120}"#)
        .await;

    let scheduled = app.scheduled().await;
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0]["body"], "Due in 2 hours for Max");
}

#[tokio::test]
async fn test_invalid_update_is_rejected_and_nothing_changes() {
    let app = common::TestApp::new().await;

    let (status, body) = app
        .put(
            "/api/v1/preferences",
            r#"{"enabled": false, "quiet_hours_start": "25:00"}"#,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");

    let prefs = app.get_json("/api/v1/preferences").await;
    assert_eq!(prefs["enabled"], true);
}

#[tokio::test]
async fn test_preferences_survive_restart() {
    let app = common::TestApp::new().await;
    app.put("/api/v1/preferences", r#"{"missed_meals": false}"#)
        .await;

    let data_dir = app.data_dir.path().to_path_buf();
    let restarted = common::TestApp::with_config(|config| {
        config.storage.data_dir = data_dir;
    })
    .await;

    let prefs = restarted.get_json("/api/v1/preferences").await;
    assert_eq!(prefs["missed_meals"], false);
}

#[tokio::test]
async fn test_replan_runs_when_preferences_cannot_be_written() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;
    create_task(&app, &pet_id, Duration::days(2)).await;
    assert_eq!(app.scheduled().await.len(), 1);

    let blocked = app.data_dir.path().join("preferences.json");
    let _ = std::fs::remove_file(&blocked);
    std::fs::create_dir_all(blocked.join("occupied")).unwrap();

    let (status, body) = app.put("/api/v1/preferences", r#"{"enabled": false}"#).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(app.scheduled().await.is_empty());

    let prefs = app.get_json("/api/v1/preferences").await;
    assert_eq!(prefs["enabled"], false);
}
