use axum_test::TestServer;
use serde_json::json;

use coursewise::api::{create_router, AppState};
use coursewise::engine::ModelArtifactStore;

fn create_test_server(dir: &std::path::Path) -> TestServer {
    let state = AppState::new(ModelArtifactStore::new(dir));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn training_payload() -> serde_json::Value {
    json!({
        "courses": [
            { "id": "A", "subject": "Python Beginner", "format": "Video Course" },
            { "id": "B", "subject": "Python Advanced", "format": "Video Course" },
            { "id": "C", "subject": "Cooking Basics" }
        ],
        "interactions": [
            { "userId": "u1", "courseId": "A", "rating": 5.0 },
            { "userId": "u1", "courseId": "B", "rating": 4.0 },
            { "userId": "u2", "courseId": "A", "rating": 4.0 },
            { "userId": "u2", "courseId": "C", "rating": 2.0 }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_recommendations_before_training_are_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "userId": "u1" }))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn test_train_then_recommend() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());

    let response = server.post("/api/v1/train").json(&training_payload()).await;
    response.assert_status_ok();
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["courses"], 3);
    assert_eq!(summary["users"], 2);
    assert_eq!(summary["interactions"], 4);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "userId": "u1",
            "topN": 2,
            "alpha": 0.6,
            "userProfile": { "enrolledCourses": ["A"] }
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());
    assert!(recommendations.len() <= 2);
    for rec in recommendations {
        assert_ne!(rec["courseId"], "A");
        assert!(rec["score"].is_number());
        assert!(rec["recommendedMode"].is_string());
    }
}

#[tokio::test]
async fn test_recommend_rejects_out_of_range_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "userId": "u1", "alpha": 1.5 }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_rejects_empty_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "userId": "  " }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_content_endpoint_returns_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let response = server
        .get("/api/v1/recommendations/content")
        .add_query_param("course_id", "A")
        .add_query_param("top_n", "2")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations[0]["courseId"], "B");
}

#[tokio::test]
async fn test_content_endpoint_unknown_course_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let response = server
        .get("/api/v1/recommendations/content")
        .add_query_param("course_id", "missing")
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collaborative_endpoint_unknown_user_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let response = server
        .get("/api/v1/recommendations/collaborative")
        .add_query_param("user_id", "stranger")
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reload_picks_up_persisted_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    // First server trains and persists the snapshot
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    // A fresh server over the same artifact directory starts empty,
    // then serves after an explicit reload
    let fresh = create_test_server(dir.path());
    let response = fresh
        .post("/api/v1/recommendations")
        .json(&json!({ "userId": "u1" }))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let response = fresh.post("/api/v1/reload").await;
    response.assert_status_ok();

    let response = fresh
        .post("/api/v1/recommendations")
        .json(&json!({ "userId": "u1" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_reload_without_snapshot_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());

    let response = server.post("/api/v1/reload").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_recommendations_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());
    server.post("/api/v1/train").json(&training_payload()).await;

    let request = json!({
        "userId": "u1",
        "topN": 3,
        "userProfile": { "enrolledCourses": ["A"], "learningStyle": "visual" }
    });
    let first: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&request)
        .await
        .json();
    let second: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&request)
        .await
        .json();
    assert_eq!(first, second);
}
