//! Best-effort AI annotation channel.
//!
//! Produces either explanation text or a short error string; it never returns
//! an error to the caller, so the structured estimate always goes out.

use super::cache::keys;
use super::{AiClient, RedisCache};
use crate::domain::Material;

/// Result of the annotation channel. At most one field is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insights {
    pub text: Option<String>,
    pub error: Option<String>,
}

impl Insights {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            text: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Clone, Default)]
pub struct InsightsService {
    ai_client: Option<AiClient>,
    cache: Option<RedisCache>,
}

impl InsightsService {
    pub fn new(ai_client: Option<AiClient>, cache: Option<RedisCache>) -> Self {
        Self { ai_client, cache }
    }

    pub fn ai_client(&self) -> Option<&AiClient> {
        self.ai_client.as_ref()
    }

    pub fn cache(&self) -> Option<&RedisCache> {
        self.cache.as_ref()
    }

    /// Explain an estimate, consulting the cache first when one is configured.
    pub async fn explain(
        &self,
        area_sqft: u32,
        material: Material,
        total_cost_inr: f64,
        request_id: Option<&str>,
    ) -> Insights {
        let Some(ai_client) = &self.ai_client else {
            return Insights::failed("AI insights are not configured");
        };

        let cache_key = keys::ai_insights(area_sqft, material, total_cost_inr);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<String>(&cache_key).await {
                tracing::debug!(key = %cache_key, "Returning cached AI insights");
                return Insights {
                    text: Some(cached),
                    error: None,
                };
            }
        }

        match ai_client
            .explain_estimate(area_sqft, material.as_str(), total_cost_inr, request_id)
            .await
        {
            Ok(text) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.set(&cache_key, &text).await {
                        tracing::warn!(error = %e, "Failed to cache AI insights");
                    }
                }
                Insights {
                    text: Some(text),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI insights unavailable");
                Insights::failed("AI insights are temporarily unavailable")
            }
        }
    }
}
