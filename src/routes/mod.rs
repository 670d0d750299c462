pub mod estimate;
pub mod health;
pub mod plan;

use axum::{routing::get, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health::health_check))
        .route("/estimate", post(estimate::estimate))
        .route("/generate-smart-plan", post(plan::generate_smart_plan))
}

#[derive(Serialize)]
pub struct Banner {
    pub message: &'static str,
}

async fn home() -> Json<Banner> {
    Json(Banner {
        message: "BuildWise Smart Cost Estimator API Running",
    })
}
