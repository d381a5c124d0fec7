//! Integration tests for meal logging and diet alerts

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

async fn plan_meal(app: &common::TestApp, pet_id: &str, hours_ago: i64) -> String {
    let body = json!({
        "pet_id": pet_id,
        "meal_type": "dinner",
        "scheduled_at": Utc::now() - Duration::hours(hours_ago),
        "food": "Salmon kibble",
        "amount": "1 cup",
        "calories": 350
    });
    let (status, response) = app.post("/api/v1/meals", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED, "plan meal failed: {}", response);

    let meal: Value = serde_json::from_str(&response).unwrap();
    meal["id"].as_str().unwrap().to_string()
}

async fn log_meal(app: &common::TestApp, meal_id: &str, body: Value) -> (StatusCode, Value) {
    let (status, response) = app
        .post(&format!("/api/v1/meals/{}/complete", meal_id), &body.to_string())
        .await;
    let parsed = serde_json::from_str(&response).unwrap_or(Value::Null);
    (status, parsed)
}

#[tokio::test]
async fn test_third_refusal_raises_alert_and_notifies() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;

    let mut responses = Vec::new();
    for hours_ago in [30, 20, 10] {
        let meal_id = plan_meal(&app, &pet_id, hours_ago).await;
        let (status, response) = log_meal(&app, &meal_id, json!({ "status": "refused" })).await;
        assert_eq!(status, StatusCode::OK);
        responses.push(response);
    }

    assert!(responses[0]["new_alerts"].as_array().unwrap().is_empty());
    assert!(responses[1]["new_alerts"].as_array().unwrap().is_empty());

    let alerts = responses[2]["new_alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "repeated-refusal");
    assert_eq!(alerts[0]["severity"], "warning");
    assert_eq!(alerts[0]["occurrences"], 3);
    assert_eq!(responses[2]["alert_notices"]["scheduled"], 1);

    let delivered = app.delivered().await;
    let notice = delivered
        .iter()
        .find(|n| n["data"]["type"] == "diet-alert")
        .expect("diet alert notice delivered");
    assert_eq!(notice["title"], "⚠️ Diet Alert");
    assert!(notice["body"].as_str().unwrap().starts_with("Max: 3 refused meals"));
}

#[tokio::test]
async fn test_live_alert_suppresses_duplicates_until_dismissed() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Luna", "cat").await;

    for hours_ago in [40, 30, 20] {
        let meal_id = plan_meal(&app, &pet_id, hours_ago).await;
        log_meal(&app, &meal_id, json!({ "status": "refused" })).await;
    }

    let meal_id = plan_meal(&app, &pet_id, 10).await;
    let (_, response) = log_meal(&app, &meal_id, json!({ "status": "refused" })).await;
    assert!(response["new_alerts"].as_array().unwrap().is_empty());

    let alerts = app.get_json(&format!("/api/v1/alerts?pet_id={}", pet_id)).await;
    let alert_id = alerts[0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .post(&format!("/api/v1/alerts/{}/dismiss", alert_id), "")
        .await;
    assert_eq!(status, StatusCode::OK);

    // Five refusals now: a fresh alert fires at urgent severity
    let meal_id = plan_meal(&app, &pet_id, 5).await;
    let (_, response) = log_meal(&app, &meal_id, json!({ "status": "refused" })).await;
    let alerts = response["new_alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["severity"], "urgent");

    let live = app.get_json("/api/v1/alerts").await;
    assert_eq!(live.as_array().unwrap().len(), 1);
    let all = app.get_json("/api/v1/alerts?include_dismissed=true").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_partial_eating_counts_towards_its_own_pattern() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;

    let mut last = Value::Null;
    for hours_ago in [48, 36, 24, 12] {
        let meal_id = plan_meal(&app, &pet_id, hours_ago).await;
        let (_, response) = log_meal(
            &app,
            &meal_id,
            json!({ "status": "fed", "portion_adjustment": "ate-some" }),
        )
        .await;
        last = response;
    }

    let alerts = last["new_alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "repeated-partial");
}

#[tokio::test]
async fn test_logging_twice_conflicts() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;
    let meal_id = plan_meal(&app, &pet_id, 1).await;

    let (status, _) = log_meal(&app, &meal_id, json!({ "status": "fed" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = log_meal(&app, &meal_id, json!({ "status": "skipped" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unknown_meal_is_not_found() {
    let app = common::TestApp::new().await;

    let (status, _) = log_meal(
        &app,
        &uuid::Uuid::new_v4().to_string(),
        json!({ "status": "fed" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meal_logs_reach_disk_after_flush() {
    let app = common::TestApp::new().await;
    let pet_id = app.create_pet("Max", "dog").await;
    let meal_id = plan_meal(&app, &pet_id, 2).await;
    log_meal(&app, &meal_id, json!({ "status": "fed" })).await;

    app.state.writer.flush().await;

    let raw = std::fs::read_to_string(app.data_dir.path().join("meals.json")).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["schema_version"], 1);
    assert_eq!(stored["items"][0]["id"], meal_id.as_str());
    assert_eq!(stored["items"][0]["completed"], true);
}
