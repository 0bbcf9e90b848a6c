use serde::{Deserialize, Serialize};
use yp_core::{FlagKind, QualityFlag, Severity};

/// Default two-sided coverage of reported intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Estimator that produced a [`ConfidenceInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Empirical percentiles of a resample distribution.
    Bootstrap,
    /// First-order variance propagation with a normal quantile.
    DeltaMethod,
}

/// Confidence interval around a point estimate.
///
/// `lower <= point_estimate <= upper` holds whenever the bounds are finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Central estimate.
    pub point_estimate: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Estimator that produced the interval.
    pub method: IntervalMethod,
    /// Two-sided coverage level.
    pub confidence_level: f64,
    /// Propagated standard error (delta method) or resample standard
    /// deviation (bootstrap).
    pub standard_error: f64,
    /// Quality flags that apply to this interval.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
}

impl ConfidenceInterval {
    /// Centre of the bounds.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies between the bounds, inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Whether a flag of the given kind is attached.
    pub fn has_flag(&self, kind: FlagKind) -> bool {
        yp_core::has_flag(&self.flags, kind)
    }
}

/// Intervals for the ratio and for the coordinate produced by one estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalReport {
    /// Interval for `comparison / reference` (pre-clamp).
    pub ratio: ConfidenceInterval,
    /// Interval for the clamped coordinate.
    pub coordinate: ConfidenceInterval,
    /// Severity tier of the input point estimate (paired observations: of
    /// the pooled ratio of means).
    pub severity: Severity,
    /// Number of resamples (bootstrap only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resample_count: Option<usize>,
    /// Master seed (bootstrap only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
    /// Mean of the resampled ratios (bootstrap only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ratio_mean: Option<f64>,
    /// Mean of the resampled coordinates (bootstrap only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coordinate_mean: Option<f64>,
    /// Union of the flags raised while producing the report.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
    /// SHA-256 of the canonical input, uncertainty spec and options.
    pub input_hash: String,
}

impl IntervalReport {
    /// Whether a flag of the given kind was raised.
    pub fn has_flag(&self, kind: FlagKind) -> bool {
        yp_core::has_flag(&self.flags, kind)
    }
}

/// Offset between two intervals over the same quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodAgreement {
    /// `|midpoint(a) - midpoint(b)|` divided by the width of `b`.
    pub midpoint_offset: f64,
    /// `|width(a) - width(b)|` divided by the width of `b`.
    pub width_difference: f64,
}

/// Measures how far interval `a` sits from reference interval `b`.
pub fn agreement(a: &ConfidenceInterval, b: &ConfidenceInterval) -> MethodAgreement {
    let scale = b.width();
    MethodAgreement {
        midpoint_offset: (a.midpoint() - b.midpoint()).abs() / scale,
        width_difference: (a.width() - b.width()).abs() / scale,
    }
}
