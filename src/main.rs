mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod planner;
mod routes;
mod services;

use anyhow::Result;

use services::{AiClient, InsightsService, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        static_dir = %settings.static_dir.display(),
        "Starting BuildWise backend"
    );

    // Planner tables and blueprint store
    let planner = app::build_planner(&settings)?;

    // AI explanations are optional
    let ai_client = match &settings.gemini_api_key {
        Some(key) => Some(AiClient::new(
            &settings.gemini_api_url,
            &settings.gemini_model,
            key,
            settings.ai_service_timeout_seconds,
        )?),
        None => {
            tracing::info!("GEMINI_API_KEY not set, AI insights disabled");
            None
        }
    };

    // Check AI service health in the background
    if let Some(ai_client) = ai_client.clone() {
        tokio::spawn(async move {
            match ai_client.health_check().await {
                Ok(()) => tracing::info!("AI service is healthy"),
                Err(e) => tracing::warn!(error = %e, "AI service health check failed - will retry on first request"),
            }
        });
    }

    // Redis only caches insights, so run without it if it is unreachable
    let cache = match &settings.redis_url {
        Some(url) => match RedisCache::new(url, settings.redis_cache_ttl_seconds).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable - continuing without insight cache");
                None
            }
        },
        None => None,
    };

    let insights = InsightsService::new(ai_client, cache);

    // Create application state
    let server_addr = settings.server_addr.clone();
    let state = app::AppState::new(settings, planner, insights);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&server_addr).await?;
    tracing::info!("Listening on {}", server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
