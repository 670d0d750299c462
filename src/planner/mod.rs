//! Smart plan pipeline.
//!
//! extract -> fallback -> layout -> {budget, timeline, equipment, blueprint}
//!
//! Attribute and layout errors abort the request. Once a layout exists the four
//! branches run concurrently and a failing branch only blanks its own field.

pub mod blueprint;
pub mod config;
pub mod cost;
pub mod estimators;
pub mod extract;
pub mod fallback;
pub mod layout;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{EstimateBundle, ParsedAttributes, PlanStage, Room, SmartPlan};
use blueprint::BlueprintArtifact;

pub use blueprint::BlueprintStore;
pub use config::PlannerConfig;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plot size not detected in description")]
    MissingPlotSize,

    #[error("Invalid project attributes: {0}")]
    InvalidAttributes(String),

    #[error("Non-positive area {0} reached an estimator")]
    InvalidArea(f64),

    #[error("Blueprint rendering failed: {0}")]
    RenderFailure(String),
}

impl PlanError {
    /// Whether the caller's input caused the error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingPlotSize | Self::InvalidAttributes(_))
    }

    /// Message safe to show in a partial response.
    fn stage_message(&self) -> String {
        match self {
            Self::InvalidArea(_) => "estimate unavailable".to_string(),
            Self::RenderFailure(_) => "blueprint could not be rendered".to_string(),
            other => other.to_string(),
        }
    }
}

/// Runs the pipeline against immutable tables and a shared artifact store.
#[derive(Debug, Clone)]
pub struct Planner {
    config: Arc<PlannerConfig>,
    store: BlueprintStore,
    render_timeout: Duration,
}

impl Planner {
    pub fn new(config: Arc<PlannerConfig>, store: BlueprintStore, render_timeout: Duration) -> Self {
        Self {
            config,
            store,
            render_timeout,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &BlueprintStore {
        &self.store
    }

    /// Extract attributes and make sure a plot size is known.
    pub fn resolve_attributes(&self, description: &str) -> Result<ParsedAttributes, PlanError> {
        let mut attrs = extract::parse(description);
        fallback::resolve_plot_size(&mut attrs, description, &self.config.unit_policy)?;
        Ok(attrs)
    }

    /// Produce a full smart plan for a free-text description.
    #[instrument(skip(self, description), fields(description_len = description.len()))]
    pub async fn plan(&self, description: &str) -> Result<SmartPlan, PlanError> {
        let attributes = self.resolve_attributes(description)?;
        let layout = layout::build(&attributes, &self.config.layout)?;
        let material = attributes.material.unwrap_or_default();
        let area = layout.builtup_area_sqft;

        let (budget, timeline, equipment, blueprint) = tokio::join!(
            async { estimators::estimate_budget(area, material, &self.config.rates) },
            async { estimators::estimate_timeline_months(area, &self.config.timeline) },
            async { estimators::predict_equipment(area, &self.config.equipment) },
            self.render_blueprint(&layout.rooms),
        );

        let mut estimates = EstimateBundle::default();
        match budget {
            Ok(inr) => estimates.estimated_budget_inr = Some(inr),
            Err(e) => record_failure(&mut estimates, PlanStage::Budget, &e),
        }
        match timeline {
            Ok(months) => estimates.estimated_time_months = Some(months),
            Err(e) => record_failure(&mut estimates, PlanStage::Timeline, &e),
        }
        match equipment {
            Ok(list) => estimates.required_equipment = Some(list),
            Err(e) => record_failure(&mut estimates, PlanStage::Equipment, &e),
        }
        match blueprint {
            Ok(artifact) => {
                tracing::debug!(id = %artifact.id, path = %artifact.path.display(), "Blueprint stored");
                estimates.blueprint_image_url = Some(artifact.url);
                estimates.blueprint_skipped_rooms = artifact.skipped_rooms;
            }
            Err(e) => record_failure(&mut estimates, PlanStage::Blueprint, &e),
        }

        tracing::info!(
            plot_size_sqft = layout.plot_size_sqft,
            builtup_area_sqft = area,
            material = %material,
            failed_stages = estimates.failed_stages.len(),
            "Smart plan generated"
        );

        Ok(SmartPlan {
            material,
            layout,
            estimates,
        })
    }

    async fn render_blueprint(&self, rooms: &[Room]) -> Result<BlueprintArtifact, PlanError> {
        let store = self.store.clone();
        let rooms = rooms.to_vec();
        let task = tokio::task::spawn_blocking(move || store.generate(&rooms));

        match tokio::time::timeout(self.render_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PlanError::RenderFailure(format!(
                "render task failed: {}",
                join_err
            ))),
            Err(_) => Err(PlanError::RenderFailure(format!(
                "timed out after {:?}",
                self.render_timeout
            ))),
        }
    }
}

fn record_failure(estimates: &mut EstimateBundle, stage: PlanStage, err: &PlanError) {
    tracing::warn!(stage = %stage, error = %err, "Plan stage failed");
    estimates.record_failure(stage, err.stage_message());
}
