use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use yp_core::errors::{invalid_input, ErrorInfo, YpError};
use yp_core::stat::check_level;
use yp_core::{
    coordinate, coordinate_derivative, stable_hash_string, DiagnosticInput, QualityFlag, Severity,
    NEAR_THRESHOLD_RATIO, RATIO_CLAMP_MAX,
};

use crate::interval::{
    ConfidenceInterval, IntervalMethod, IntervalReport, DEFAULT_CONFIDENCE_LEVEL,
};
use crate::spec::{Moments, UncertaintySpec};

/// Options for [`delta_method_interval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaOpts {
    /// Two-sided coverage level.
    pub confidence_level: f64,
}

impl Default for DeltaOpts {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }
}

/// Two-sided standard normal critical value `Φ⁻¹(1 - (1 - level) / 2)`.
pub fn normal_quantile(level: f64) -> Result<f64, YpError> {
    check_level(level, "confidence_level")?;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|err| YpError::Execution(ErrorInfo::new("normal-distribution", err.to_string())))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Variance of `comparison / reference` by first-order propagation.
///
/// Uses the gradient form, which stays defined at `comparison = 0`.
/// Negative round-off is floored at zero.
pub fn ratio_variance(
    reference: f64,
    comparison: f64,
    reference_var: f64,
    comparison_var: f64,
    covariance: f64,
) -> f64 {
    let d_ref = -comparison / (reference * reference);
    let d_cmp = 1.0 / reference;
    let variance = d_ref * d_ref * reference_var
        + d_cmp * d_cmp * comparison_var
        + 2.0 * d_ref * d_cmp * covariance;
    variance.max(0.0)
}

/// Delta-method interval for the ratio and the coordinate.
///
/// Only defined for scalar point estimates described by
/// [`UncertaintySpec::StandardDeviations`]. The coordinate variance is the
/// ratio variance scaled by the squared derivative of the transform at the
/// clamped ratio. Above a ratio of 0.9 the linearisation is unreliable and
/// both intervals carry [`QualityFlag::LinearizationDegraded`].
pub fn delta_method_interval(
    input: &DiagnosticInput,
    spec: &UncertaintySpec,
    opts: &DeltaOpts,
) -> Result<IntervalReport, YpError> {
    let z = normal_quantile(opts.confidence_level)?;
    let moments = match spec {
        UncertaintySpec::StandardDeviations {
            reference_std,
            comparison_std,
            covariance,
        } => Moments::validate(*reference_std, *comparison_std, *covariance)?,
        UncertaintySpec::PairedObservations => {
            return Err(invalid_input(
                "mode-mismatch",
                "uncertainty_spec",
                "the delta method needs standard deviations; paired observations are only supported by the bootstrap",
            ))
        }
    };
    let scalars = (
        input.reference().as_scalar(),
        input.comparison().as_scalar(),
    );
    let (reference, comparison) = match scalars {
        (Some(reference), Some(comparison)) => (reference, comparison),
        _ => {
            return Err(invalid_input(
                "mode-mismatch",
                "reference",
                format!(
                    "the delta method needs scalar point estimates; got shape {}",
                    input.shape()
                ),
            ))
        }
    };
    let input_hash = stable_hash_string(&(input, spec, opts))?;

    let ratio = comparison / reference;
    let ratio_se = ratio_variance(
        reference,
        comparison,
        moments.reference_std * moments.reference_std,
        moments.comparison_std * moments.comparison_std,
        moments.covariance,
    )
    .sqrt();
    let coord = coordinate(ratio);
    let coordinate_se = coordinate_derivative(ratio) * ratio_se;

    let mut flags = Vec::new();
    if ratio > NEAR_THRESHOLD_RATIO {
        warn!(ratio, "delta-method linearisation near the singular boundary");
        flags.push(QualityFlag::LinearizationDegraded { ratio });
    }
    if ratio > RATIO_CLAMP_MAX {
        flags.push(QualityFlag::ClampedAtThreshold { count: 1 });
    }
    debug!(ratio, ratio_se, coordinate = coord, coordinate_se, z, "delta-method interval");

    let interval = |point: f64, se: f64| ConfidenceInterval {
        point_estimate: point,
        lower: point - z * se,
        upper: point + z * se,
        method: IntervalMethod::DeltaMethod,
        confidence_level: opts.confidence_level,
        standard_error: se,
        flags: flags.clone(),
    };
    Ok(IntervalReport {
        ratio: interval(ratio, ratio_se),
        coordinate: interval(coord, coordinate_se),
        severity: Severity::classify(ratio),
        resample_count: None,
        seed: None,
        ratio_mean: None,
        coordinate_mean: None,
        flags,
        input_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_form_matches_relative_form_away_from_zero() {
        let (r, c, vr, vc, cov) = (100.0, 50.0, 1.0, 0.25, 0.2);
        let ratio: f64 = c / r;
        let relative = ratio * ratio * (vr / (r * r) + vc / (c * c) - 2.0 * cov / (r * c));
        assert!((ratio_variance(r, c, vr, vc, cov) - relative).abs() < 1e-15);
    }

    #[test]
    fn zero_comparison_keeps_only_comparison_term() {
        let variance = ratio_variance(100.0, 0.0, 4.0, 1.0, 0.0);
        assert!((variance - 1e-4).abs() < 1e-18);
    }

    #[test]
    fn quantile_at_95_percent() {
        let z = normal_quantile(0.95).unwrap();
        assert!((z - 1.959_963_984_540_054).abs() < 1e-9);
        assert!(normal_quantile(1.0).is_err());
    }
}
