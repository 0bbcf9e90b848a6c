//! Empirical statistics over resample and shuffle distributions.

use serde::{Deserialize, Serialize};

use crate::errors::{invalid_input, YpError};

/// Validates a coverage level (confidence or band level) in the open interval (0, 1).
pub fn check_level(level: f64, field: &str) -> Result<(), YpError> {
    if !level.is_finite() || level <= 0.0 || level >= 1.0 {
        return Err(invalid_input(
            "invalid-level",
            field,
            format!("{field} must lie strictly between 0 and 1; got {level}"),
        ));
    }
    Ok(())
}

/// Two-sided percentile band of an empirical distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    /// Coverage level of the band (e.g. 0.95 for the 2.5th/97.5th percentiles).
    pub level: f64,
    /// Lower percentile.
    pub lower: f64,
    /// Upper percentile.
    pub upper: f64,
}

impl PercentileBand {
    /// Builds the band covering `level` of an ascending-sorted sample.
    pub fn from_sorted(sorted: &[f64], level: f64) -> Self {
        let tail = (1.0 - level) / 2.0;
        Self {
            level,
            lower: percentile(sorted, tail),
            upper: percentile(sorted, 1.0 - tail),
        }
    }

    /// Whether `value` lies inside the band, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Arithmetic mean; NaN for an empty slice.
///
/// Terms are scaled by `1 / n` before summing, so values near `f64::MAX`
/// do not overflow the accumulator.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let weight = 1.0 / values.len() as f64;
    values.iter().map(|value| value * weight).sum()
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let centre = mean(values);
    let sum_sq = values.iter().map(|v| (v - centre) * (v - centre)).sum::<f64>();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Minimum and maximum of a slice; NaN pair when empty.
pub fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Sorts in ascending total order.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Percentile of an ascending-sorted sample with linear interpolation
/// between neighbouring order statistics.
///
/// `quantile` is a probability in `[0, 1]`; values outside are clamped.
pub fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = quantile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}
