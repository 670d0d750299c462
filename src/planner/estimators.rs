//! Budget, timeline and equipment estimators.
//!
//! Each takes the built-up area and its own slice of `PlannerConfig`, and none
//! reads another's output.

use super::config::{EquipmentTier, RateTable, TimelineConfig};
use super::PlanError;
use crate::domain::Material;

/// Material rate times built-up area, in INR, rounded to paise.
pub fn estimate_budget(
    builtup_area_sqft: u32,
    material: Material,
    rates: &RateTable,
) -> Result<f64, PlanError> {
    let area = positive_area(builtup_area_sqft)?;
    Ok(round2(rates.rate_for(material) * area))
}

/// Construction duration in (fractional) months for a standard crew.
pub fn estimate_timeline_months(
    builtup_area_sqft: u32,
    timeline: &TimelineConfig,
) -> Result<f64, PlanError> {
    let area = positive_area(builtup_area_sqft)?;
    Ok(area / timeline.throughput_sqft_per_month)
}

/// Equipment needed for the built-up area, in catalogue order.
pub fn predict_equipment(
    builtup_area_sqft: u32,
    catalogue: &[EquipmentTier],
) -> Result<Vec<String>, PlanError> {
    positive_area(builtup_area_sqft)?;
    Ok(catalogue
        .iter()
        .filter(|tier| tier.min_builtup_sqft <= builtup_area_sqft)
        .map(|tier| tier.name.clone())
        .collect())
}

fn positive_area(builtup_area_sqft: u32) -> Result<f64, PlanError> {
    if builtup_area_sqft == 0 {
        return Err(PlanError::InvalidArea(0.0));
    }
    Ok(builtup_area_sqft as f64)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
