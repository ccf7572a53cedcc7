mod handlers;

pub use handlers::{EstimateRequest, EstimateResponse, TrainRequest};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::context::AppContext;

/// Router with permissive CORS, for local use and tests.
pub fn create_router(ctx: AppContext) -> Router {
    build_router(ctx, CorsLayer::permissive())
}

/// Router with CORS restricted to the configured origins, if any.
pub fn create_router_with_config(ctx: AppContext, config: &AppConfig) -> Router {
    build_router(ctx, cors_layer(config.cors_origins.as_deref()))
}

fn build_router(ctx: AppContext, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/estimate", post(handlers::estimate))
        .route("/model/status", get(handlers::model_status))
        .route("/model/train", post(handlers::train_model))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
