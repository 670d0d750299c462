//! Deterministic cost calculator behind `POST /estimate`.

use super::config::{CostModel, RateTable, TimelineConfig};
use super::estimators::round2;
use crate::domain::{CostBreakdown, CostInput};

/// Area x rate, scaled by location and floor count, with an urgency premium
/// when the deadline beats crew throughput, plus contingency.
pub fn calculate_cost(
    input: &CostInput,
    rates: &RateTable,
    model: &CostModel,
    timeline: &TimelineConfig,
) -> CostBreakdown {
    let area = input.area_sqft as f64;
    let floor_multiplier = 1.0 + (input.floors.saturating_sub(1)) as f64 * model.per_extra_floor;

    let base_cost = area * rates.rate_for(input.material);
    let mut adjusted_cost =
        base_cost * model.location_multiplier(input.location) * floor_multiplier;

    let ideal_months = area / timeline.throughput_sqft_per_month;
    if (input.deadline_months as f64) < ideal_months {
        adjusted_cost *= model.urgency_multiplier;
    }

    let contingency = adjusted_cost * model.contingency_ratio;
    let total = adjusted_cost + contingency;

    CostBreakdown {
        base_cost: round2(base_cost),
        adjusted_cost: round2(adjusted_cost),
        contingency: round2(contingency),
        total_estimated_cost: round2(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationTier, Material};

    fn input(area: u32, deadline: u32) -> CostInput {
        CostInput {
            area_sqft: area,
            material: Material::Standard,
            location: LocationTier::Tier2,
            floors: 1,
            deadline_months: deadline,
        }
    }

    fn calc(input: &CostInput) -> CostBreakdown {
        calculate_cost(
            input,
            &RateTable::default(),
            &CostModel::default(),
            &TimelineConfig::default(),
        )
    }

    #[test]
    fn relaxed_deadline_has_no_urgency_premium() {
        let cost = calc(&input(1000, 12));
        assert_eq!(cost.base_cost, 2_000_000.0);
        assert_eq!(cost.adjusted_cost, 2_000_000.0);
        assert_eq!(cost.contingency, 100_000.0);
        assert_eq!(cost.total_estimated_cost, 2_100_000.0);
    }

    #[test]
    fn tight_deadline_adds_urgency_premium() {
        let cost = calc(&input(1000, 1));
        assert_eq!(cost.adjusted_cost, 2_200_000.0);
        assert_eq!(cost.total_estimated_cost, 2_310_000.0);
    }

    #[test]
    fn location_and_floors_scale_the_cost() {
        let cost = calc(&CostInput {
            area_sqft: 1000,
            material: Material::Premium,
            location: LocationTier::Tier1,
            floors: 3,
            deadline_months: 24,
        });
        assert_eq!(cost.base_cost, 2_500_000.0);
        assert_eq!(cost.adjusted_cost, 3_600_000.0);
        assert_eq!(cost.total_estimated_cost, 3_780_000.0);
    }

    #[test]
    fn tier3_is_cheaper_than_tier2() {
        let tier2 = calc(&input(1500, 12));
        let tier3 = calc(&CostInput {
            location: LocationTier::Tier3,
            ..input(1500, 12)
        });
        assert!(tier3.total_estimated_cost < tier2.total_estimated_cost);
    }
}
