use serde::{Deserialize, Serialize};

use super::plan::{LocationTier, Material};

/// Request DTO for `POST /estimate`
///
/// Numeric fields are signed so out-of-range values reach validation and get a
/// descriptive 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    pub area_sqft: i64,
    pub material_quality: String,
    pub location_tier: String,
    pub floors: i64,
    pub deadline_months: i64,
}

/// Validated input to the cost calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostInput {
    pub area_sqft: u32,
    pub material: Material,
    pub location: LocationTier,
    pub floors: u32,
    pub deadline_months: u32,
}

impl TryFrom<&EstimateRequest> for CostInput {
    type Error = String;

    fn try_from(req: &EstimateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            area_sqft: positive("area_sqft", req.area_sqft)?,
            material: req.material_quality.parse()?,
            location: req.location_tier.parse()?,
            floors: positive("floors", req.floors)?,
            deadline_months: positive("deadline_months", req.deadline_months)?,
        })
    }
}

fn positive(field: &str, value: i64) -> Result<u32, String> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("{} must be a positive integer", field))
}

/// Itemized output of the cost calculator, in INR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base_cost: f64,
    pub adjusted_cost: f64,
    pub contingency: f64,
    pub total_estimated_cost: f64,
}

/// Response DTO for `POST /estimate`
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub cost: CostBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EstimateRequest {
        EstimateRequest {
            area_sqft: 1000,
            material_quality: "Premium".into(),
            location_tier: "tier1".into(),
            floors: 2,
            deadline_months: 6,
        }
    }

    #[test]
    fn valid_request_converts() {
        let input = CostInput::try_from(&request()).unwrap();
        assert_eq!(input.area_sqft, 1000);
        assert_eq!(input.material, Material::Premium);
        assert_eq!(input.location, LocationTier::Tier1);
    }

    #[test]
    fn non_positive_fields_are_rejected() {
        let mut req = request();
        req.floors = 0;
        assert_eq!(
            CostInput::try_from(&req).unwrap_err(),
            "floors must be a positive integer"
        );

        let mut req = request();
        req.area_sqft = -5;
        assert!(CostInput::try_from(&req).unwrap_err().contains("area_sqft"));
    }

    #[test]
    fn unknown_material_is_rejected() {
        let mut req = request();
        req.material_quality = "gold".into();
        assert!(CostInput::try_from(&req).unwrap_err().contains("gold"));
    }
}
