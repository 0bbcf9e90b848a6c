//! Coordinate response to fractional perturbations of either input.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use yp_core::errors::{invalid_input, ErrorInfo, YpError};
use yp_core::{evaluate_pair, Evaluation, QualityFlag, Values};

/// Fractions used when none are configured (1%, 5% and 10%).
pub const DEFAULT_PERTURBATION_FRACTIONS: [f64; 3] = [0.01, 0.05, 0.10];

/// Options for [`sensitivity_check`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityOpts {
    /// Fractional perturbations, each finite and strictly inside (0, 1).
    pub fractions: Vec<f64>,
}

impl Default for SensitivityOpts {
    fn default() -> Self {
        Self {
            fractions: DEFAULT_PERTURBATION_FRACTIONS.to_vec(),
        }
    }
}

/// Unperturbed ratio and coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityBaseline {
    /// Pre-clamp ratio.
    pub ratio: Values,
    /// Coordinate.
    pub coordinate: Values,
    /// Quality flags of the unperturbed evaluation.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
}

/// Result of one perturbed recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationOutcome {
    /// Perturbed reference or comparison values.
    pub perturbed: Values,
    /// Pre-clamp ratio after perturbation.
    pub ratio: Values,
    /// Coordinate after perturbation.
    pub coordinate: Values,
    /// `coordinate - baseline coordinate`, elementwise.
    pub delta: Values,
    /// Delta as a percentage of the baseline coordinate, elementwise.
    pub change_pct: Values,
    /// Mean of `delta`.
    pub mean_delta: f64,
    /// Mean of `change_pct`.
    pub mean_change_pct: f64,
    /// Mean relative coordinate change per relative input change,
    /// `(dy / y) / (dp / p)`.
    pub elasticity: f64,
    /// Quality flags of the perturbed evaluation.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
}

/// The four recomputations for one fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    /// Perturbation fraction.
    pub fraction: f64,
    /// Reference scaled by `1 + fraction`.
    pub reference_up: PerturbationOutcome,
    /// Reference scaled by `1 - fraction`.
    pub reference_down: PerturbationOutcome,
    /// Comparison scaled by `1 + fraction`.
    pub comparison_up: PerturbationOutcome,
    /// Comparison scaled by `1 - fraction`.
    pub comparison_down: PerturbationOutcome,
}

/// Baseline plus one entry per requested fraction, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Unperturbed evaluation.
    pub baseline: SensitivityBaseline,
    /// Perturbed evaluations.
    pub entries: Vec<SensitivityEntry>,
}

impl SensitivityReport {
    /// Entry for `fraction`, matched exactly.
    pub fn entry(&self, fraction: f64) -> Option<&SensitivityEntry> {
        self.entries.iter().find(|entry| entry.fraction == fraction)
    }
}

#[derive(Clone, Copy)]
enum Side {
    Reference,
    Comparison,
}

fn check_fractions(fractions: &[f64]) -> Result<(), YpError> {
    if fractions.is_empty() {
        return Err(invalid_input(
            "empty-fractions",
            "fractions",
            "at least one perturbation fraction is required",
        ));
    }
    if let Some((index, value)) = fractions
        .iter()
        .enumerate()
        .find(|(_, f)| !f.is_finite() || **f <= 0.0 || **f >= 1.0)
    {
        return Err(invalid_input(
            "invalid-fraction",
            "fractions",
            format!("fractions must lie strictly between 0 and 1; element {index} is {value}"),
        ));
    }
    Ok(())
}

/// Measures how the coordinate responds when each input is scaled up and
/// down by every requested fraction.
///
/// Reports the measured deltas only; whether a sensitivity is acceptable is
/// left to the caller.
pub fn sensitivity_check(
    reference: &Values,
    comparison: &Values,
    opts: &SensitivityOpts,
) -> Result<SensitivityReport, YpError> {
    check_fractions(&opts.fractions)?;
    let base = evaluate_pair(reference, comparison)?;
    debug!(fractions = opts.fractions.len(), "sensitivity check started");

    let mut entries = Vec::with_capacity(opts.fractions.len());
    for &fraction in &opts.fractions {
        let outcome = |side: Side, signed: f64| {
            perturb(reference, comparison, &base, side, signed)
        };
        entries.push(SensitivityEntry {
            fraction,
            reference_up: outcome(Side::Reference, fraction)?,
            reference_down: outcome(Side::Reference, -fraction)?,
            comparison_up: outcome(Side::Comparison, fraction)?,
            comparison_down: outcome(Side::Comparison, -fraction)?,
        });
    }

    let flags = base.flags();
    Ok(SensitivityReport {
        baseline: SensitivityBaseline {
            ratio: base.ratio,
            coordinate: base.coordinate,
            flags,
        },
        entries,
    })
}

fn perturbation_error(err: YpError, side: Side, signed: f64) -> YpError {
    let input = match side {
        Side::Reference => "reference",
        Side::Comparison => "comparison",
    };
    match err {
        YpError::InvalidInput(info) => YpError::InvalidInput(
            ErrorInfo::new(
                "perturbation-overflow",
                format!(
                    "scaling {input} by {} leaves the finite range: {}",
                    1.0 + signed,
                    info.message
                ),
            )
            .with_context("field", "fractions")
            .with_context("input", input),
        ),
        other => other,
    }
}

fn perturb(
    reference: &Values,
    comparison: &Values,
    base: &Evaluation,
    side: Side,
    signed: f64,
) -> Result<PerturbationOutcome, YpError> {
    let scale = 1.0 + signed;
    let (perturbed, evaluation) = match side {
        Side::Reference => {
            let perturbed = reference.map(|v| v * scale);
            let evaluation = evaluate_pair(&perturbed, comparison);
            (perturbed, evaluation)
        }
        Side::Comparison => {
            let perturbed = comparison.map(|v| v * scale);
            let evaluation = evaluate_pair(reference, &perturbed);
            (perturbed, evaluation)
        }
    };
    // The unperturbed pair is valid; failures here come from the scaling.
    let evaluation = evaluation.map_err(|err| perturbation_error(err, side, signed))?;
    let delta = evaluation
        .coordinate
        .zip_with(&base.coordinate, |new, old| new - old)?;
    let change_pct = delta.zip_with(&base.coordinate, |d, old| d / old * 100.0)?;
    let mean_change_pct = change_pct.mean();
    let flags = evaluation.flags();
    if !flags.is_empty() {
        warn!(signed, clamped = evaluation.clamped, "perturbed ratios clamped");
    }
    Ok(PerturbationOutcome {
        perturbed,
        mean_delta: delta.mean(),
        mean_change_pct,
        elasticity: mean_change_pct / (signed * 100.0),
        ratio: evaluation.ratio,
        coordinate: evaluation.coordinate,
        delta,
        change_pct,
        flags,
    })
}
