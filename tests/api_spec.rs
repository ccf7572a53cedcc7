use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use story_points::api::{create_router, EstimateResponse};
use story_points::context::AppContext;
use story_points::db::Database;
use story_points_core::Trainer;

fn untrained_server() -> (TestServer, AppContext) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let ctx = AppContext::new(db, Trainer::default());
    let server = TestServer::new(create_router(ctx.clone())).expect("Failed to create test server");
    (server, ctx)
}

fn trained_server() -> TestServer {
    let (server, ctx) = untrained_server();
    ctx.bootstrap_if_untrained().expect("Failed to bootstrap");
    server
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_model_not_loaded_before_training() {
        let (server, _) = untrained_server();

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_loaded"], false);
    }

    #[tokio::test]
    async fn reports_model_loaded_after_training() {
        let server = trained_server();

        let body: Value = server.get("/").await.json();
        assert_eq!(body["model_loaded"], true);
    }
}

mod estimate {
    use super::*;

    #[tokio::test]
    async fn fails_with_503_before_training() {
        let (server, _) = untrained_server();

        let response = server
            .post("/estimate")
            .json(&json!({ "title": "Fix typo in button text" }))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.text().contains("not trained"));
    }

    #[tokio::test]
    async fn rejects_empty_title() {
        let server = trained_server();

        let response = server.post("/estimate").json(&json!({ "title": "  " })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn returns_points_on_the_scale() {
        let server = trained_server();

        let response = server
            .post("/estimate")
            .json(&json!({
                "title": "Fix typo in button text",
                "description": "Update spelling error on submit button",
                "priority": "low",
                "label": "bug"
            }))
            .await;

        response.assert_status_ok();
        let body: EstimateResponse = response.json();
        assert!([1, 2, 3, 5, 8, 13, 21].contains(&body.estimated_story_points));
        assert!(body.estimated_story_points <= 2);
        assert_eq!(body.confidence, 0.85);
        assert!(body.features_used.has_task_type);
        assert_eq!(body.features_used.priority_encoded, 1);
    }

    #[tokio::test]
    async fn exposes_diagnostics_in_snake_case() {
        let server = trained_server();

        let body: Value = server
            .post("/estimate")
            .json(&json!({ "title": "Build modal component", "attachments_count": 2 }))
            .await
            .json();

        let features = &body["features_used"];
        assert!(features["raw_prediction"].is_number());
        assert!(features["top_features"].is_array());
        assert!(features["top_tfidf_terms"].is_array());
        assert_eq!(features["attachments_count"], 2);
        assert_eq!(features["has_attachments"], true);
    }
}

mod model {
    use super::*;

    #[tokio::test]
    async fn status_before_training() {
        let (server, _) = untrained_server();

        let body: Value = server.get("/model/status").await.json();
        assert_eq!(body["status"], "not_loaded");
        assert_eq!(body["trained"], false);
        assert_eq!(body["model_info"]["is_trained"], false);
        assert!(body["model_info"]["training_stats"].is_null());
    }

    #[tokio::test]
    async fn train_then_status() {
        let (server, _) = untrained_server();

        let response = server
            .post("/model/train")
            .json(&json!({
                "tasks": [
                    {
                        "title": "Add search bar",
                        "description": "Search across projects",
                        "storyPoint": 3
                    },
                    { "title": "", "storyPoint": 5 },
                    { "title": "Missing target" }
                ]
            }))
            .await;
        response.assert_status_ok();
        let stats: Value = response.json();
        assert_eq!(stats["total_samples"], 15);
        assert_eq!(stats["split_kind"], "train_test");

        let body: Value = server.get("/model/status").await.json();
        assert_eq!(body["status"], "loaded");
        assert_eq!(body["trained"], true);
        assert_eq!(body["model_info"]["training_stats"]["total_samples"], 15);
    }

    #[tokio::test]
    async fn train_skips_tasks_without_description() {
        let (server, _) = untrained_server();

        let response = server
            .post("/model/train")
            .json(&json!({
                "tasks": [
                    { "title": "No description", "storyPoint": 3 },
                    { "title": "Blank description", "description": "  ", "storyPoint": 5 }
                ]
            }))
            .await;
        response.assert_status_ok();
        let stats: Value = response.json();
        assert_eq!(stats["total_samples"], 14);
    }

    #[tokio::test]
    async fn train_with_no_tasks_uses_seed_set() {
        let (server, _) = untrained_server();

        let response = server.post("/model/train").json(&json!({})).await;
        response.assert_status_ok();
        let stats: Value = response.json();
        assert_eq!(stats["total_samples"], 14);
    }
}
