use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::{SmartPlanRequest, SmartPlanResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;

/// Longest description accepted, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 4000;

/// Turn a free-text project description into a smart plan.
pub async fn generate_smart_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SmartPlanRequest>,
) -> ApiResult<Json<SmartPlanResponse>> {
    let request_id = headers.request_id();

    if payload.description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }

    tracing::info!(request_id = request_id, "Generating smart plan");

    let plan = state.planner.plan(&payload.description).await?;
    let area = plan.layout.builtup_area_sqft;
    let material = plan.material;
    let budget = plan.estimates.estimated_budget_inr;

    let mut response = SmartPlanResponse::from(plan);

    if payload.include_insights {
        match budget {
            Some(total) => {
                let insights = state
                    .insights
                    .explain(area, material, total, request_id)
                    .await;
                response.ai_insights = insights.text;
                response.ai_insights_error = insights.error;
            }
            None => {
                response.ai_insights_error = Some("no budget estimate to explain".to_string());
            }
        }
    }

    Ok(Json(response))
}
