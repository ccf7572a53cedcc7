use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use story_points_core::{
    EstimateDiagnostics, EstimatorError, ModelInfo, TaskRecord, TrainingRecord, TrainingStats,
};

use crate::context::AppContext;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn estimator_error(e: EstimatorError) -> (StatusCode, String) {
    match e {
        EstimatorError::UntrainedModel => {
            tracing::warn!("Estimate requested before training");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        other => internal_error(other),
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": ctx.is_trained(),
    }))
}

// ============================================================
// Estimation
// ============================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub attachments_count: Option<u32>,
}

impl From<EstimateRequest> for TaskRecord {
    fn from(request: EstimateRequest) -> Self {
        TaskRecord {
            title: request.title,
            description: request.description.unwrap_or_default(),
            priority: request.priority,
            task_type: request.task_type.or(request.label),
            attachments_count: request.attachments_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimated_story_points: u32,
    pub confidence: f64,
    pub reasoning: String,
    pub features_used: EstimateDiagnostics,
}

pub async fn estimate(
    State(ctx): State<AppContext>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, (StatusCode, String)> {
    if request.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title must not be empty".to_string()));
    }

    let task = TaskRecord::from(request);
    let estimate = ctx.estimate(&task).map_err(estimator_error)?;

    Ok(Json(EstimateResponse {
        estimated_story_points: estimate.story_points,
        confidence: estimate.confidence,
        reasoning: estimate.reasoning,
        features_used: estimate.features,
    }))
}

// ============================================================
// Model
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub status: String,
    pub trained: bool,
    pub model_info: ModelInfo,
}

pub async fn model_status(State(ctx): State<AppContext>) -> Json<ModelStatusResponse> {
    let info = ctx.status();
    Json(ModelStatusResponse {
        status: if info.is_trained { "loaded" } else { "not_loaded" }.to_string(),
        trained: info.is_trained,
        model_info: info,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainRequest {
    #[serde(default)]
    pub tasks: Vec<Value>,
}

pub async fn train_model(
    State(ctx): State<AppContext>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainingStats>, (StatusCode, String)> {
    let records = TrainingRecord::collect_valid(&request.tasks);
    tracing::info!(
        received = request.tasks.len(),
        valid = records.len(),
        "Training requested"
    );

    tokio::task::spawn_blocking(move || ctx.train(records))
        .await
        .map_err(internal_error)?
        .map(Json)
        .map_err(internal_error)
}
