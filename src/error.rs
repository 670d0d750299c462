//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::planner::PlanError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Plan(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Plan(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Plan(PlanError::MissingPlotSize) => "MISSING_PLOT_SIZE",
            Self::Plan(PlanError::InvalidAttributes(_)) => "INVALID_ATTRIBUTES",
            Self::Plan(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Plan(e) if e.is_client_error() => e.to_string(),
            // Don't leak internal error details
            Self::Plan(_) | Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log internal errors
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Plan(e) if !e.is_client_error() => {
                tracing::error!(error = %e, "Planner invariant violated");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_errors_map_to_client_or_server_status() {
        let missing = ApiError::from(PlanError::MissingPlotSize);
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.error_code(), "MISSING_PLOT_SIZE");

        let invalid = ApiError::from(PlanError::InvalidAttributes("zero".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "INVALID_ATTRIBUTES");

        let area = ApiError::from(PlanError::InvalidArea(-1.0));
        assert_eq!(area.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(area.public_message(), "An internal error occurred");
    }

    #[test]
    fn internal_details_are_masked() {
        let err = ApiError::Internal(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.public_message(), "An internal error occurred");
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
