//! Redis cache for AI insights.
//!
//! Gemini calls are slow and billed per request, while the same estimate
//! inputs produce an equally useful explanation. Cache failures are logged and
//! treated as misses so they never block a response.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Insight cache over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    /// Create a new Redis cache connection.
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        })
    }

    /// Get a value from cache. Read and decode failures count as misses.
    #[instrument(skip(self), fields(cache_hit = false))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();

        let raw = match conn.get::<_, Option<String>>(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                error!(key = key, error = %e, "Redis get error");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = key, "Cache hit");
                tracing::Span::current().record("cache_hit", true);
                Some(value)
            }
            Err(e) => {
                warn!(key = key, error = %e, "Discarding undecodable cached value");
                None
            }
        }
    }

    /// Set a value in cache with the default TTL.
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.conn.clone();

        let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;
        let ttl = self.default_ttl.as_secs();

        conn.set_ex::<_, _, ()>(key, data, ttl)
            .await
            .context("Failed to set cache value")?;

        debug!(key = key, ttl_secs = ttl, "Cached value");
        Ok(())
    }

    /// Check if Redis is healthy.
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

/// Cache key builders for consistent key formats.
pub mod keys {
    use crate::domain::Material;

    /// AI explanation of a cost estimate. The total is keyed in whole paise so
    /// equal estimates share an entry.
    pub fn ai_insights(area_sqft: u32, material: Material, total_cost_inr: f64) -> String {
        format!(
            "ai:insights:{}:{}:{}",
            area_sqft,
            material,
            (total_cost_inr * 100.0).round() as i64
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn insight_keys_are_stable() {
            assert_eq!(
                ai_insights(1200, Material::Premium, 3_150_000.0),
                "ai:insights:1200:premium:315000000"
            );
            assert_eq!(
                ai_insights(1200, Material::Premium, 3_150_000.001),
                ai_insights(1200, Material::Premium, 3_150_000.0)
            );
            assert_ne!(
                ai_insights(1200, Material::Basic, 3_150_000.0),
                ai_insights(1200, Material::Premium, 3_150_000.0)
            );
        }
    }
}
