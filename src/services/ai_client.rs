//! Gemini client for prose explanations of cost estimates.
//!
//! Explanations are an optional annotation: callers keep the structured
//! estimate when this client fails.

use anyhow::{Context, Result};
use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::domain::ai::{GenerateContentRequest, GenerateContentResponse, GoogleErrorResponse};
use crate::error::ApiError;

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retry_elapsed: Duration,
}

impl AiClient {
    /// Create a new Gemini client.
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, model = model, "AI client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            max_retry_elapsed: Duration::from_secs(timeout_seconds.saturating_mul(2)),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    /// Check that the configured model is reachable with our key.
    pub async fn health_check(&self) -> Result<()> {
        self.client
            .get(self.model_url())
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("AI service health check failed")?
            .error_for_status()
            .context("AI service unhealthy")?;

        Ok(())
    }

    /// Explain a cost estimate with two optimization ideas and the main risks.
    #[instrument(skip(self))]
    pub async fn explain_estimate(
        &self,
        area_sqft: u32,
        material: &str,
        total_cost_inr: f64,
        request_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let body = GenerateContentRequest::from_prompt(explanation_prompt(
            area_sqft,
            material,
            total_cost_inr,
        ));
        let response = self.generate(&body, request_id).await?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("AI service returned no text")))
    }

    /// POST `generateContent`, retrying transport errors, 429 and 5xx.
    async fn generate(
        &self,
        body: &GenerateContentRequest,
        request_id: Option<&str>,
    ) -> Result<GenerateContentResponse, ApiError> {
        let url = format!("{}:generateContent", self.model_url());
        let url = url.as_str();
        let policy: ExponentialBackoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(self.max_retry_elapsed))
            .build();

        retry(policy, move || self.attempt(url, body, request_id)).await
    }

    /// One `generateContent` call, classifying failures for the retry loop.
    async fn attempt(
        &self,
        url: &str,
        body: &GenerateContentRequest,
        request_id: Option<&str>,
    ) -> Result<GenerateContentResponse, backoff::Error<ApiError>> {
        let mut req = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body);

        if let Some(rid) = request_id {
            req = req.header("x-request-id", rid);
        }

        debug!(url = %url, "AI service request");

        let response = req.send().await.map_err(|e| {
            warn!(error = %e, "AI service request failed");
            backoff::Error::transient(ApiError::Internal(anyhow::anyhow!(
                "AI service unavailable: {}",
                e
            )))
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<GenerateContentResponse>().await.map_err(|e| {
                error!(error = %e, "Failed to parse AI service response");
                backoff::Error::permanent(ApiError::Internal(anyhow::anyhow!(
                    "Invalid AI service response: {}",
                    e
                )))
            });
        }

        let message = response
            .json::<GoogleErrorResponse>()
            .await
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("AI service error: {}", status));

        let err = ApiError::Internal(anyhow::anyhow!(message.clone()));
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!(status = %status, message = %message, "Retrying AI service call");
            Err(backoff::Error::transient(err))
        } else {
            error!(status = %status, message = %message, "AI service error");
            Err(backoff::Error::permanent(err))
        }
    }
}

fn explanation_prompt(area_sqft: u32, material: &str, total_cost_inr: f64) -> String {
    format!(
        "Explain this construction cost estimate clearly.\n\n\
         Area: {} sqft\n\
         Material: {}\n\
         Total Cost: \u{20b9}{:.2}\n\n\
         Suggest 2 cost optimization ideas and possible risks.",
        area_sqft, material, total_cost_inr
    )
}
