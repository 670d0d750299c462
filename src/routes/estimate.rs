use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::{CostInput, EstimateRequest, EstimateResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;
use crate::planner::cost::calculate_cost;

/// Deterministic cost estimate with a best-effort AI explanation.
pub async fn estimate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EstimateRequest>,
) -> ApiResult<Json<EstimateResponse>> {
    let input = CostInput::try_from(&payload).map_err(ApiError::BadRequest)?;
    let config = state.planner.config();
    let cost = calculate_cost(&input, &config.rates, &config.cost, &config.timeline);

    tracing::info!(
        request_id = headers.request_id(),
        area_sqft = input.area_sqft,
        material = %input.material,
        total = cost.total_estimated_cost,
        "Cost estimated"
    );

    let insights = state
        .insights
        .explain(
            input.area_sqft,
            input.material,
            cost.total_estimated_cost,
            headers.request_id(),
        )
        .await;

    Ok(Json(EstimateResponse {
        cost,
        ai_insights: insights.text,
        ai_insights_error: insights.error,
    }))
}
