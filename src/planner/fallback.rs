//! Plot-size inference from a bare number when no unit was recognized.

use regex::Regex;
use std::sync::LazyLock;

use super::extract::{parse_number, round_sqft, NUMBER};
use super::PlanError;
use crate::domain::ParsedAttributes;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(NUMBER).expect("number pattern is valid")
});

/// Decides which unit a unit-less number was written in and converts it to
/// square feet.
pub trait PlotUnitPolicy {
    fn to_sqft(&self, value: f64) -> Option<u32>;
}

/// Values above `threshold` are read as square yards, the rest as square feet.
///
/// The cut-off is a heuristic and misclassifies values close to it.
#[derive(Debug, Clone, PartialEq)]
pub struct YardThresholdPolicy {
    pub threshold: f64,
    /// Square feet per square yard.
    pub factor: f64,
}

impl Default for YardThresholdPolicy {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            factor: 9.0,
        }
    }
}

impl PlotUnitPolicy for YardThresholdPolicy {
    fn to_sqft(&self, value: f64) -> Option<u32> {
        if value > self.threshold {
            round_sqft(value * self.factor)
        } else {
            round_sqft(value)
        }
    }
}

/// Fill `plot_size_sqft` from the first number in `text` if the extractor
/// left it empty. An already-resolved value is never touched.
pub fn resolve_plot_size(
    attrs: &mut ParsedAttributes,
    text: &str,
    policy: &impl PlotUnitPolicy,
) -> Result<(), PlanError> {
    if attrs.plot_size_sqft.is_some() {
        return Ok(());
    }

    let raw = FIRST_NUMBER
        .find(text)
        .ok_or(PlanError::MissingPlotSize)?
        .as_str();
    let value = parse_number(raw).ok_or(PlanError::MissingPlotSize)?;
    let sqft = policy
        .to_sqft(value)
        .ok_or_else(|| PlanError::InvalidAttributes(format!("plot size {} is out of range", raw)))?;

    tracing::debug!(raw, sqft, "Inferred plot size from bare number");
    attrs.plot_size_sqft = Some(sqft);
    Ok(())
}
