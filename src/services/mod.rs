//! Service layer modules for external integrations.
//!
//! Contains the Gemini client used for estimate explanations and the optional
//! Redis cache in front of it.

pub mod ai_client;
pub mod cache;
pub mod insights;

pub use ai_client::AiClient;
pub use cache::RedisCache;
pub use insights::{Insights, InsightsService};
