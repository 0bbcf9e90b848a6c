use serde::{Deserialize, Serialize};
use yp_core::errors::{invalid_input, YpError};

/// Description of the measurement uncertainty attached to an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UncertaintySpec {
    /// Scalar point estimates with standard deviations and an optional
    /// covariance between reference and comparison.
    StandardDeviations {
        /// Standard deviation of the reference value.
        reference_std: f64,
        /// Standard deviation of the comparison value.
        comparison_std: f64,
        /// Covariance between reference and comparison.
        #[serde(default)]
        covariance: f64,
    },
    /// The input arrays are paired raw observations.
    PairedObservations,
}

impl UncertaintySpec {
    /// Independent standard deviations.
    pub fn standard_deviations(reference_std: f64, comparison_std: f64) -> Self {
        UncertaintySpec::StandardDeviations {
            reference_std,
            comparison_std,
            covariance: 0.0,
        }
    }

    /// Sets the covariance of a [`UncertaintySpec::StandardDeviations`] spec.
    pub fn with_covariance(self, covariance: f64) -> Self {
        match self {
            UncertaintySpec::StandardDeviations {
                reference_std,
                comparison_std,
                ..
            } => UncertaintySpec::StandardDeviations {
                reference_std,
                comparison_std,
                covariance,
            },
            other => other,
        }
    }
}

/// Validated second moments of a [`UncertaintySpec::StandardDeviations`] spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub reference_std: f64,
    pub comparison_std: f64,
    pub covariance: f64,
}

impl Moments {
    pub(crate) fn validate(
        reference_std: f64,
        comparison_std: f64,
        covariance: f64,
    ) -> Result<Self, YpError> {
        check_std(reference_std, "reference_std")?;
        check_std(comparison_std, "comparison_std")?;
        if !covariance.is_finite() {
            return Err(invalid_input(
                "non-finite",
                "covariance",
                format!("covariance must be finite; got {covariance}"),
            ));
        }
        let bound = reference_std * comparison_std;
        if covariance.abs() > bound * (1.0 + 1e-12) {
            return Err(invalid_input(
                "covariance-out-of-range",
                "covariance",
                format!(
                    "covariance {covariance} exceeds reference_std * comparison_std = {bound}"
                ),
            ));
        }
        Ok(Self {
            reference_std,
            comparison_std,
            covariance,
        })
    }

    /// Correlation coefficient, 0 when either standard deviation vanishes.
    pub(crate) fn correlation(&self) -> f64 {
        let bound = self.reference_std * self.comparison_std;
        if bound > 0.0 {
            (self.covariance / bound).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

fn check_std(value: f64, field: &str) -> Result<(), YpError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid_input(
            "invalid-std",
            field,
            format!("{field} must be finite and non-negative; got {value}"),
        ));
    }
    Ok(())
}
