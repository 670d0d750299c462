//! Immutable planner tables: rates, ratios and thresholds.
//!
//! Built once at start-up (defaults plus environment overrides, see
//! `config::Settings`) and shared read-only by every request.

use anyhow::{bail, Result};
use std::collections::HashSet;

use super::fallback::YardThresholdPolicy;
use crate::domain::{LocationTier, Material};

/// Per-square-foot construction rates in INR.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub basic: f64,
    pub standard: f64,
    pub premium: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            basic: 1500.0,
            standard: 2000.0,
            premium: 2500.0,
        }
    }
}

impl RateTable {
    pub fn rate_for(&self, material: Material) -> f64 {
        match material {
            Material::Basic => self.basic,
            Material::Standard => self.standard,
            Material::Premium => self.premium,
        }
    }
}

/// Multipliers applied by the plain cost calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub tier1_multiplier: f64,
    pub tier2_multiplier: f64,
    pub tier3_multiplier: f64,
    /// Added per floor above the ground floor.
    pub per_extra_floor: f64,
    /// Applied when the deadline is shorter than the crew throughput allows.
    pub urgency_multiplier: f64,
    pub contingency_ratio: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            tier1_multiplier: 1.2,
            tier2_multiplier: 1.0,
            tier3_multiplier: 0.9,
            per_extra_floor: 0.1,
            urgency_multiplier: 1.1,
            contingency_ratio: 0.05,
        }
    }
}

impl CostModel {
    pub fn location_multiplier(&self, tier: LocationTier) -> f64 {
        match tier {
            LocationTier::Tier1 => self.tier1_multiplier,
            LocationTier::Tier2 => self.tier2_multiplier,
            LocationTier::Tier3 => self.tier3_multiplier,
        }
    }
}

/// Room program weights and geometry used by the layout builder.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Share of the plot covered by construction after setbacks.
    pub ground_coverage_ratio: f64,
    /// Length / width of every room rectangle.
    pub room_aspect_ratio: f64,
    pub living_room_weight: f64,
    pub kitchen_weight: f64,
    pub dining_weight: f64,
    /// Built-up area from which a separate dining room is planned.
    pub dining_min_builtup_sqft: u32,
    /// Shared equally by all bedrooms.
    pub bedrooms_weight: f64,
    /// Shared equally by all bathrooms.
    pub bathrooms_weight: f64,
    /// Only planned for multi-floor buildings.
    pub staircase_weight: f64,
    pub max_bedrooms: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ground_coverage_ratio: 0.65,
            room_aspect_ratio: 1.2,
            living_room_weight: 0.26,
            kitchen_weight: 0.12,
            dining_weight: 0.10,
            dining_min_builtup_sqft: 800,
            bedrooms_weight: 0.40,
            bathrooms_weight: 0.12,
            staircase_weight: 0.06,
            max_bedrooms: 8,
        }
    }
}

impl LayoutConfig {
    /// Bedroom count used when the description does not state one.
    pub fn default_bedrooms(&self, builtup_area_sqft: u32) -> u32 {
        match builtup_area_sqft {
            0..=599 => 1,
            600..=1199 => 2,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// Square feet a standard crew completes per month.
    pub throughput_sqft_per_month: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            throughput_sqft_per_month: 500.0,
        }
    }
}

/// One catalogue entry of the equipment predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentTier {
    pub name: String,
    /// Smallest built-up area that requires this equipment.
    pub min_builtup_sqft: u32,
}

impl EquipmentTier {
    fn new(name: &str, min_builtup_sqft: u32) -> Self {
        Self {
            name: name.to_string(),
            min_builtup_sqft,
        }
    }
}

/// Catalogue in canonical output order.
pub fn default_equipment_catalogue() -> Vec<EquipmentTier> {
    vec![
        EquipmentTier::new("Hand Tools", 0),
        EquipmentTier::new("Concrete Mixer", 0),
        EquipmentTier::new("Scaffolding", 1_000),
        EquipmentTier::new("Mobile Crane", 1_000),
        EquipmentTier::new("Excavator", 2_500),
        EquipmentTier::new("Tower Crane", 5_000),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintConfig {
    pub pixels_per_foot: f64,
    /// Longest canvas side in pixels, margins excluded.
    pub max_canvas_px: u32,
    pub margin_px: u32,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            pixels_per_foot: 8.0,
            max_canvas_px: 1600,
            margin_px: 20,
        }
    }
}

/// Every table the planner reads, grouped so it can be passed around as one
/// `Arc<PlannerConfig>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub rates: RateTable,
    pub cost: CostModel,
    pub layout: LayoutConfig,
    pub timeline: TimelineConfig,
    pub equipment: Vec<EquipmentTier>,
    pub blueprint: BlueprintConfig,
    pub unit_policy: YardThresholdPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rates: RateTable::default(),
            cost: CostModel::default(),
            layout: LayoutConfig::default(),
            timeline: TimelineConfig::default(),
            equipment: default_equipment_catalogue(),
            blueprint: BlueprintConfig::default(),
            unit_policy: YardThresholdPolicy::default(),
        }
    }
}

impl PlannerConfig {
    /// Reject tables that would break the estimator invariants.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.layout.ground_coverage_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            bail!("ground coverage ratio must be in (0, 1], got {}", ratio);
        }
        if !(self.layout.room_aspect_ratio >= 1.0 && self.layout.room_aspect_ratio.is_finite()) {
            bail!(
                "room aspect ratio must be >= 1, got {}",
                self.layout.room_aspect_ratio
            );
        }
        let weights = [
            self.layout.living_room_weight,
            self.layout.kitchen_weight,
            self.layout.dining_weight,
            self.layout.bedrooms_weight,
            self.layout.bathrooms_weight,
            self.layout.staircase_weight,
        ];
        if weights.iter().any(|w| !(*w > 0.0 && w.is_finite())) {
            bail!("room weights must be positive");
        }
        if self.layout.max_bedrooms == 0 {
            bail!("max_bedrooms must be at least 1");
        }

        let rates = &self.rates;
        if !(rates.basic > 0.0 && rates.basic < rates.standard && rates.standard < rates.premium)
        {
            bail!(
                "rates must be positive and strictly increasing by tier, got {}/{}/{}",
                rates.basic,
                rates.standard,
                rates.premium
            );
        }

        if !(self.timeline.throughput_sqft_per_month > 0.0
            && self.timeline.throughput_sqft_per_month.is_finite())
        {
            bail!(
                "throughput must be positive, got {}",
                self.timeline.throughput_sqft_per_month
            );
        }

        let mut seen = HashSet::new();
        for tier in &self.equipment {
            if !seen.insert(tier.name.as_str()) {
                bail!("duplicate equipment name '{}'", tier.name);
            }
        }

        if !(self.unit_policy.threshold >= 0.0 && self.unit_policy.factor > 0.0) {
            bail!("unit policy threshold and factor must be positive");
        }

        if self.blueprint.pixels_per_foot <= 0.0 || self.blueprint.max_canvas_px == 0 {
            bail!("blueprint scale must be positive");
        }

        Ok(())
    }
}
