use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Construction material quality tier.
///
/// Variants are declared cheapest first so the derived ordering follows the
/// rate table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Basic,
    #[default]
    Standard,
    Premium,
}

impl Material {
    pub const ALL: [Material; 3] = [Self::Basic, Self::Standard, Self::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl FromStr for Material {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "economy" | "budget" => Ok(Self::Basic),
            "standard" | "regular" | "normal" | "medium" => Ok(Self::Standard),
            "premium" | "luxury" | "high-end" | "deluxe" => Ok(Self::Premium),
            other => Err(format!(
                "unknown material quality '{}', expected one of {}",
                other,
                Self::ALL.map(|m| m.as_str()).join(", ")
            )),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// City tier used by the cost calculator's location multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTier {
    Tier1,
    Tier2,
    Tier3,
}

impl FromStr for LocationTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        match normalized.as_str() {
            "tier1" | "1" => Ok(Self::Tier1),
            "tier2" | "2" => Ok(Self::Tier2),
            "tier3" | "3" => Ok(Self::Tier3),
            _ => Err(format!("unknown location tier '{}'", s.trim())),
        }
    }
}

/// Attributes recognized in a project description.
///
/// Every field is optional: the extractor leaves anything it could not match
/// confidently as `None`, and only the plot-size fallback may fill a gap later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedAttributes {
    pub plot_size_sqft: Option<u32>,
    pub material: Option<Material>,
    pub floors: Option<u32>,
    pub bedrooms: Option<u32>,
}

/// A named room with its allocated floor area and schematic dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub name: String,
    pub area_sqft: u32,
    pub width_ft: f64,
    pub length_ft: f64,
}

/// Plot breakdown produced by the layout builder. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub plot_size_sqft: u32,
    pub builtup_area_sqft: u32,
    pub floors: u32,
    pub rooms: Vec<Room>,
}

impl Layout {
    pub fn total_room_area(&self) -> u32 {
        self.rooms.iter().map(|r| r.area_sqft).sum()
    }
}

/// Independent branches that run once a layout exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStage {
    Budget,
    Timeline,
    Equipment,
    Blueprint,
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Budget => "budget",
            Self::Timeline => "timeline",
            Self::Equipment => "equipment",
            Self::Blueprint => "blueprint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub stage: PlanStage,
    pub message: String,
}

/// Merged output of the estimator branches.
///
/// A field is `None` when its branch failed; the reason is listed in
/// `failed_stages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstimateBundle {
    pub estimated_budget_inr: Option<f64>,
    pub estimated_time_months: Option<f64>,
    pub required_equipment: Option<Vec<String>>,
    pub blueprint_image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blueprint_skipped_rooms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_stages: Vec<StageFailure>,
}

impl EstimateBundle {
    pub fn record_failure(&mut self, stage: PlanStage, message: impl Into<String>) {
        self.failed_stages.push(StageFailure {
            stage,
            message: message.into(),
        });
    }
}

/// Full result of one planner run.
#[derive(Debug, Clone)]
pub struct SmartPlan {
    pub material: Material,
    pub layout: Layout,
    pub estimates: EstimateBundle,
}

// ============================================================================
// HTTP DTOs
// ============================================================================

/// Request DTO for `POST /generate-smart-plan`
#[derive(Debug, Clone, Deserialize)]
pub struct SmartPlanRequest {
    pub description: String,
    #[serde(default)]
    pub include_insights: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomDimensions {
    pub width_ft: f64,
    pub length_ft: f64,
}

/// Elevation style label; fixed until an elevation generator exists.
pub const ELEVATION_STYLE: &str = "modern-minimal";

/// Response DTO for `POST /generate-smart-plan`
#[derive(Debug, Clone, Serialize)]
pub struct SmartPlanResponse {
    pub plot_size_sqft: u32,
    pub builtup_area_sqft: u32,
    pub floors: u32,
    pub material: Material,
    #[serde(serialize_with = "serialize_room_areas")]
    pub room_areas_sqft: Vec<Room>,
    #[serde(serialize_with = "serialize_room_dimensions")]
    pub room_dimensions: Vec<Room>,
    pub elevation_style: &'static str,
    #[serde(flatten)]
    pub estimates: EstimateBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights_error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<SmartPlan> for SmartPlanResponse {
    fn from(plan: SmartPlan) -> Self {
        Self {
            plot_size_sqft: plan.layout.plot_size_sqft,
            builtup_area_sqft: plan.layout.builtup_area_sqft,
            floors: plan.layout.floors,
            material: plan.material,
            room_areas_sqft: plan.layout.rooms.clone(),
            room_dimensions: plan.layout.rooms,
            elevation_style: ELEVATION_STYLE,
            estimates: plan.estimates,
            ai_insights: None,
            ai_insights_error: None,
            generated_at: Utc::now(),
        }
    }
}

// Room lists render as JSON objects keyed by room name, in layout order.

#[allow(clippy::ptr_arg)]
fn serialize_room_areas<S: Serializer>(rooms: &Vec<Room>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(rooms.iter().map(|r| (r.name.as_str(), r.area_sqft)))
}

#[allow(clippy::ptr_arg)]
fn serialize_room_dimensions<S: Serializer>(rooms: &Vec<Room>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(rooms.iter().map(|r| {
        (
            r.name.as_str(),
            RoomDimensions {
                width_ft: r.width_ft,
                length_ft: r.length_ft,
            },
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_tiers_are_ordered() {
        assert!(Material::Basic < Material::Standard);
        assert!(Material::Standard < Material::Premium);
    }

    #[test]
    fn material_parsing_accepts_synonyms() {
        assert_eq!("Luxury".parse::<Material>().unwrap(), Material::Premium);
        assert_eq!(" economy ".parse::<Material>().unwrap(), Material::Basic);
        let err = "marble".parse::<Material>().unwrap_err();
        assert!(err.ends_with("expected one of basic, standard, premium"));
    }

    #[test]
    fn location_tier_accepts_loose_spellings() {
        assert_eq!("tier1".parse::<LocationTier>().unwrap(), LocationTier::Tier1);
        assert_eq!("Tier 2".parse::<LocationTier>().unwrap(), LocationTier::Tier2);
        assert_eq!("tier-3".parse::<LocationTier>().unwrap(), LocationTier::Tier3);
        assert!("metro".parse::<LocationTier>().is_err());
    }

    #[test]
    fn response_serializes_rooms_as_ordered_maps() {
        let rooms = vec![
            Room {
                name: "living_room".into(),
                area_sqft: 200,
                width_ft: 12.9,
                length_ft: 15.5,
            },
            Room {
                name: "kitchen".into(),
                area_sqft: 90,
                width_ft: 8.7,
                length_ft: 10.4,
            },
        ];
        let plan = SmartPlan {
            material: Material::Standard,
            layout: Layout {
                plot_size_sqft: 450,
                builtup_area_sqft: 290,
                floors: 1,
                rooms,
            },
            estimates: EstimateBundle::default(),
        };

        let json = serde_json::to_string(&SmartPlanResponse::from(plan)).unwrap();
        let living = json.find("\"living_room\":200").unwrap();
        let kitchen = json.find("\"kitchen\":90").unwrap();
        assert!(living < kitchen);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["room_dimensions"]["kitchen"]["width_ft"], 8.7);
        assert_eq!(value["elevation_style"], "modern-minimal");
        assert!(value["blueprint_image_url"].is_null());
        assert!(value.get("failed_stages").is_none());
        assert!(value.get("ai_insights").is_none());
    }
}
