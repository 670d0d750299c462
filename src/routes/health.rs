use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub blueprint_store: String,
    pub ai_service: String,
    pub redis: String,
}

/// Health check endpoint
///
/// Plans are computed locally, so an unreachable AI service or cache only
/// degrades the service. An unwritable blueprint store does too: plans still go
/// out, without an image.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_check = async {
        match state.insights.ai_client() {
            Some(client) => Some(client.health_check().await.is_ok()),
            None => None,
        }
    };
    let redis_check = async {
        match state.insights.cache() {
            Some(cache) => Some(cache.health_check().await.is_ok()),
            None => None,
        }
    };

    let (ai_result, redis_result, store_ok) = tokio::join!(
        ai_check,
        redis_check,
        state.planner.store().is_writable()
    );

    let degraded =
        !store_ok || ai_result == Some(false) || redis_result == Some(false);

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceHealth {
            blueprint_store: service_status(Some(store_ok)),
            ai_service: service_status(ai_result),
            redis: service_status(redis_result),
        },
    })
}

fn service_status(result: Option<bool>) -> String {
    match result {
        Some(true) => "ok",
        Some(false) => "error",
        None => "disabled",
    }
    .to_string()
}
