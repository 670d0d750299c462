//! Layout builder: plot size to built-up area and a named room program.

use super::config::LayoutConfig;
use super::PlanError;
use crate::domain::{Layout, ParsedAttributes, Room};

/// Build the layout for resolved attributes.
///
/// Room areas are whole square feet and always sum to the built-up area.
pub fn build(attrs: &ParsedAttributes, cfg: &LayoutConfig) -> Result<Layout, PlanError> {
    let plot_size_sqft = match attrs.plot_size_sqft {
        Some(p) if p > 0 => p,
        Some(_) => {
            return Err(PlanError::InvalidAttributes(
                "plot size must be greater than zero".to_string(),
            ))
        }
        None => {
            return Err(PlanError::InvalidAttributes(
                "plot size was not resolved".to_string(),
            ))
        }
    };

    let builtup_area_sqft = builtup_area(plot_size_sqft, cfg.ground_coverage_ratio);
    let floors = attrs.floors.filter(|f| *f > 0).unwrap_or(1);
    let bedrooms = attrs
        .bedrooms
        .filter(|b| *b > 0)
        .unwrap_or_else(|| cfg.default_bedrooms(builtup_area_sqft))
        .min(cfg.max_bedrooms);

    let program = room_program(builtup_area_sqft, floors, bedrooms, cfg);
    let shares: Vec<f64> = program.iter().map(|(_, share)| *share).collect();
    let areas = allocate(builtup_area_sqft, &shares);

    let rooms = program
        .into_iter()
        .zip(areas)
        .map(|((name, _), area_sqft)| {
            let (width, length) = room_dimensions(area_sqft as f64, cfg.room_aspect_ratio);
            Room {
                name,
                area_sqft,
                width_ft: round1(width),
                length_ft: round1(length),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        plot_size_sqft,
        builtup_area_sqft,
        floors,
        bedrooms,
        rooms = rooms.len(),
        "Built layout"
    );

    let layout = Layout {
        plot_size_sqft,
        builtup_area_sqft,
        floors,
        rooms,
    };
    debug_assert_eq!(layout.total_room_area(), builtup_area_sqft);
    Ok(layout)
}

/// Width and length (feet) of a rectangle with the given area and aspect ratio.
pub fn room_dimensions(area_sqft: f64, aspect_ratio: f64) -> (f64, f64) {
    let width = (area_sqft / aspect_ratio).sqrt();
    (width, width * aspect_ratio)
}

fn builtup_area(plot_size_sqft: u32, ratio: f64) -> u32 {
    let covered = (plot_size_sqft as f64 * ratio).round();
    (covered as u32).clamp(1, plot_size_sqft)
}

/// Named rooms with their normalized share of the built-up area.
fn room_program(
    builtup_area_sqft: u32,
    floors: u32,
    bedrooms: u32,
    cfg: &LayoutConfig,
) -> Vec<(String, f64)> {
    let mut program = vec![
        ("living_room".to_string(), cfg.living_room_weight),
        ("kitchen".to_string(), cfg.kitchen_weight),
    ];
    if builtup_area_sqft >= cfg.dining_min_builtup_sqft {
        program.push(("dining".to_string(), cfg.dining_weight));
    }

    let bedroom_share = cfg.bedrooms_weight / bedrooms as f64;
    program.extend((1..=bedrooms).map(|i| (format!("bedroom_{}", i), bedroom_share)));

    let bathrooms = bedrooms.div_ceil(2);
    let bathroom_share = cfg.bathrooms_weight / bathrooms as f64;
    program.extend((1..=bathrooms).map(|i| (format!("bathroom_{}", i), bathroom_share)));

    if floors > 1 {
        program.push(("staircase".to_string(), cfg.staircase_weight));
    }

    let total: f64 = program.iter().map(|(_, w)| w).sum();
    for (_, share) in &mut program {
        *share /= total;
    }
    program
}

/// Split `total` into integers proportional to `shares` (largest remainder).
fn allocate(total: u32, shares: &[f64]) -> Vec<u32> {
    let exact: Vec<f64> = shares.iter().map(|s| s * total as f64).collect();
    let mut areas: Vec<u32> = exact.iter().map(|e| e.floor() as u32).collect();

    let assigned: u32 = areas.iter().sum();
    let remaining = total.saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = exact[a] - exact[a].floor();
        let frac_b = exact[b] - exact[b].floor();
        frac_b.total_cmp(&frac_a).then(a.cmp(&b))
    });
    for &idx in order.iter().cycle().take(remaining) {
        areas[idx] += 1;
    }
    areas
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(plot: u32) -> ParsedAttributes {
        ParsedAttributes {
            plot_size_sqft: Some(plot),
            ..Default::default()
        }
    }

    fn room_names(layout: &Layout) -> Vec<&str> {
        layout.rooms.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn builtup_never_exceeds_plot_and_rooms_sum_exactly() {
        let cfg = LayoutConfig::default();
        for plot in (1..=60).chain((100..=20_000).step_by(137)).chain([1_000_000]) {
            let layout = build(&attrs(plot), &cfg).unwrap();
            assert!(layout.builtup_area_sqft <= plot, "plot {}", plot);
            assert!(layout.builtup_area_sqft > 0);
            assert_eq!(layout.total_room_area(), layout.builtup_area_sqft, "plot {}", plot);
        }
    }

    #[test]
    fn builtup_uses_coverage_ratio() {
        let layout = build(&attrs(1200), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.plot_size_sqft, 1200);
        assert_eq!(layout.builtup_area_sqft, 780);
    }

    #[test]
    fn dimensions_match_area() {
        let layout = build(&attrs(2400), &LayoutConfig::default()).unwrap();
        for room in &layout.rooms {
            let area = room.width_ft * room.length_ft;
            let tolerance = 0.05 * (room.width_ft + room.length_ft) + 0.01;
            assert!(
                (area - room.area_sqft as f64).abs() <= tolerance,
                "{}: {} x {} vs {}",
                room.name,
                room.width_ft,
                room.length_ft,
                room.area_sqft
            );
            assert!(room.length_ft >= room.width_ft);
        }
    }

    #[test]
    fn default_program_for_small_house() {
        let layout = build(&attrs(1200), &LayoutConfig::default()).unwrap();
        assert_eq!(
            room_names(&layout),
            ["living_room", "kitchen", "bedroom_1", "bedroom_2", "bathroom_1"]
        );
        assert_eq!(layout.floors, 1);
    }

    #[test]
    fn hints_drive_the_program() {
        let parsed = ParsedAttributes {
            plot_size_sqft: Some(3000),
            floors: Some(2),
            bedrooms: Some(4),
            ..Default::default()
        };
        let layout = build(&parsed, &LayoutConfig::default()).unwrap();
        let names = room_names(&layout);
        assert!(names.contains(&"dining"));
        assert!(names.contains(&"staircase"));
        assert_eq!(names.iter().filter(|n| n.starts_with("bedroom_")).count(), 4);
        assert_eq!(names.iter().filter(|n| n.starts_with("bathroom_")).count(), 2);
        assert_eq!(layout.floors, 2);
    }

    #[test]
    fn bedrooms_are_capped() {
        let parsed = ParsedAttributes {
            plot_size_sqft: Some(5000),
            bedrooms: Some(40),
            ..Default::default()
        };
        let cfg = LayoutConfig::default();
        let layout = build(&parsed, &cfg).unwrap();
        let bedrooms = room_names(&layout)
            .iter()
            .filter(|n| n.starts_with("bedroom_"))
            .count();
        assert_eq!(bedrooms as u32, cfg.max_bedrooms);
    }

    #[test]
    fn missing_or_zero_plot_is_invalid() {
        let cfg = LayoutConfig::default();
        assert!(matches!(
            build(&ParsedAttributes::default(), &cfg),
            Err(PlanError::InvalidAttributes(_))
        ));
        assert!(matches!(
            build(&attrs(0), &cfg),
            Err(PlanError::InvalidAttributes(_))
        ));
    }

    #[test]
    fn allocate_distributes_remainders() {
        assert_eq!(allocate(10, &[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]), vec![4, 3, 3]);
        assert_eq!(allocate(0, &[0.5, 0.5]), vec![0, 0]);
        assert_eq!(allocate(7, &[1.0]), vec![7]);
    }
}
