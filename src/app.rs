use anyhow::Result;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::middleware::{request_id::X_REQUEST_ID, request_id_layer};
use crate::planner::{BlueprintStore, Planner};
use crate::routes;
use crate::services::InsightsService;

/// Largest accepted request body; descriptions are short free text.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub planner: Planner,
    pub insights: InsightsService,
}

impl AppState {
    pub fn new(settings: Settings, planner: Planner, insights: InsightsService) -> Arc<Self> {
        Arc::new(Self {
            settings,
            planner,
            insights,
        })
    }
}

/// Build the planner from settings: immutable tables plus the blueprint store
/// under the static root.
pub fn build_planner(settings: &Settings) -> Result<Planner> {
    let config = Arc::new(settings.planner.clone());
    let store = BlueprintStore::new(
        &settings.static_dir,
        &settings.public_base_url,
        config.blueprint.clone(),
        config.layout.room_aspect_ratio,
    )?;

    Ok(Planner::new(
        config,
        store,
        Duration::from_secs(settings.blueprint_render_timeout_seconds),
    ))
}

/// Router with static blueprint serving and the middleware stack.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // Request spans at DEBUG
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let (set_request_id, propagate_request_id) = request_id_layer();

    Router::new()
        .merge(routes::api_router())
        .nest_service("/static", ServeDir::new(&state.settings.static_dir))
        // Applied bottom-up: the request id exists before the trace span opens
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

/// CORS for browser clients. No credentials are accepted.
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    let preflight_cache_secs = if settings.env.is_dev() { 86400 } else { 3600 };
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([Method::GET, Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
        ]))
        .expose_headers([request_id])
        .max_age(Duration::from_secs(preflight_cache_secs))
}
