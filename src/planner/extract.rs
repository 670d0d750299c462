//! Attribute extraction from free-text project descriptions.
//!
//! Every matcher is case-insensitive and tolerant of surrounding words. A field
//! that cannot be matched confidently is left as `None`; nothing here fails.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::domain::{Material, ParsedAttributes};

const SQFT_PER_SQYD: f64 = 9.0;
const SQFT_PER_SQM: f64 = 10.7639;
const SQFT_PER_ACRE: f64 = 43_560.0;

const MAX_FLOORS: u32 = 10;
const MAX_BEDROOMS: u32 = 8;

/// A number with optional separators, in western (1,200,000) or Indian
/// (12,00,000) grouping.
pub(crate) const NUMBER: &str =
    r"(?:\d{1,3}(?:,\d{3})+|\d{1,2}(?:,\d{2})+,\d{3}|\d+)(?:\.\d+)?";

/// `<number> <area unit>`.
static AREA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?ix)
        (?P<num>{NUMBER})
        [\s-]*
        (?:
            (?P<sqft>sq\.?[\s-]*f(?:ee|oo)?t|square[\s-]*f(?:ee|oo)?t|sft|ft2)
          | (?P<sqyd>sq\.?[\s-]*y(?:ar)?ds?|square[\s-]*yards?|gaj|gaz)
          | (?P<sqm>sq\.?[\s-]*m(?:et(?:er|re)s?|trs?)?|square[\s-]*met(?:er|re)s?|m2)
          | (?P<acre>acres?)
        )\b"
    ))
    .expect("area pattern is valid")
});

/// `<width> x <length>` in feet, e.g. "30x40 plot" or "30 by 40 ft".
static DIMENSIONS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<w>\d+(?:\.\d+)?)\s*(?:x|×|by)\s*(?P<l>\d+(?:\.\d+)?)(?:\s*(?:ft|feet|foot)\b|\s+(?:plot|site|land)\b)",
    )
    .expect("dimensions pattern is valid")
});

static BASIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:basic|budget|economy|economical|affordable|low[\s-]*cost)\b")
        .expect("basic pattern is valid")
});

static STANDARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:standard|regular|normal|medium)\b").expect("standard pattern is valid")
});

static PREMIUM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:premium|luxury|luxurious|deluxe|high[\s-]*end)\b")
        .expect("premium pattern is valid")
});

const COUNT: &str = r"(?P<n>\d{1,2}|one|two|three|four|five|six|seven|eight|nine|ten)";

static FLOORS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{COUNT}[\s-]*(?:floors?|storeys?|story|stories|levels?)\b"
    ))
    .expect("floors pattern is valid")
});

static GROUND_PLUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bg\s*\+\s*(?P<n>\d{1,2})\b").expect("ground-plus pattern is valid")
});

static NAMED_FLOORS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<kind>single[\s-]*(?:floor|storey|story)|duplex|double[\s-]*(?:storey|story)|triplex|triple[\s-]*(?:storey|story))\b",
    )
    .expect("named floors pattern is valid")
});

static BEDROOMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{COUNT}[\s-]*(?:bhk|bed(?:room)?s?)\b"
    ))
    .expect("bedrooms pattern is valid")
});

/// Parse a project description into whatever attributes it states.
pub fn parse(text: &str) -> ParsedAttributes {
    let attrs = ParsedAttributes {
        plot_size_sqft: plot_size_sqft(text),
        material: material(text),
        floors: floors(text),
        bedrooms: bedrooms(text),
    };
    tracing::debug!(?attrs, "Extracted attributes from description");
    attrs
}

fn plot_size_sqft(text: &str) -> Option<u32> {
    if let Some(caps) = AREA_PATTERN.captures(text) {
        let value = parse_number(&caps["num"])?;
        let factor = if caps.name("sqft").is_some() {
            1.0
        } else if caps.name("sqyd").is_some() {
            SQFT_PER_SQYD
        } else if caps.name("sqm").is_some() {
            SQFT_PER_SQM
        } else {
            SQFT_PER_ACRE
        };
        return round_sqft(value * factor);
    }

    let caps = DIMENSIONS_PATTERN.captures(text)?;
    let width = parse_number(&caps["w"])?;
    let length = parse_number(&caps["l"])?;
    round_sqft(width * length)
}

fn material(text: &str) -> Option<Material> {
    let hits: Vec<Material> = [
        (&*BASIC_PATTERN, Material::Basic),
        (&*STANDARD_PATTERN, Material::Standard),
        (&*PREMIUM_PATTERN, Material::Premium),
    ]
    .into_iter()
    .filter(|(re, _)| re.is_match(text))
    .map(|(_, m)| m)
    .collect();

    match hits.as_slice() {
        [only] => Some(*only),
        [] => None,
        conflicting => {
            tracing::debug!(?conflicting, "Conflicting material words, leaving unset");
            None
        }
    }
}

fn floors(text: &str) -> Option<u32> {
    let explicit = FLOORS_PATTERN
        .captures(text)
        .and_then(|c| count(&c))
        .or_else(|| {
            GROUND_PLUS_PATTERN
                .captures(text)
                .and_then(|c| count(&c))
                .map(|upper| upper + 1)
        })
        .or_else(|| {
            NAMED_FLOORS_PATTERN.captures(text).map(|c| {
                let kind = c["kind"].to_lowercase();
                if kind.starts_with("single") {
                    1
                } else if kind.starts_with("tri") {
                    3
                } else {
                    2
                }
            })
        })?;

    (1..=MAX_FLOORS).contains(&explicit).then_some(explicit)
}

fn bedrooms(text: &str) -> Option<u32> {
    BEDROOMS_PATTERN
        .captures(text)
        .and_then(|c| count(&c))
        .filter(|n| (1..=MAX_BEDROOMS).contains(n))
}

fn count(caps: &Captures<'_>) -> Option<u32> {
    let raw = caps.name("n")?.as_str().to_lowercase();
    let word = match raw.as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => return digits.parse().ok(),
    };
    Some(word)
}

/// Parse a decimal number, ignoring thousands separators.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round a square-foot value to an integer, rejecting values that do not fit.
pub(crate) fn round_sqft(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded.is_finite() && rounded >= 0.0 && rounded <= u32::MAX as f64)
        .then_some(rounded as u32)
}
