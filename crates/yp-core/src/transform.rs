//! Ratio and coordinate transform with input validation and severity tiers.
//!
//! For a reference value `p1 > 0` and a comparison value `p2 >= 0` the
//! transform computes `ratio = p2 / p1` and `coordinate = (1 - ratio)^(-1/2)`.
//! The coordinate is undefined at `ratio = 1`, so ratios are clamped to
//! [`RATIO_CLAMP_MAX`] before the reparameterisation and the coordinate never
//! exceeds [`coordinate_ceiling`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{invalid_input, YpError};
use crate::flags::QualityFlag;
use crate::values::{Shape, Values};

/// Largest ratio fed into the reparameterisation.
pub const RATIO_CLAMP_MAX: f64 = 0.999_999;

/// Ratio from which a value is classified as [`Severity::NearThreshold`].
pub const NEAR_THRESHOLD_RATIO: f64 = 0.9;

/// Ratio from which a value is classified as [`Severity::AtOrBeyondThreshold`].
pub const SINGULAR_RATIO: f64 = 1.0;

/// Clamps a ratio to [`RATIO_CLAMP_MAX`].
pub fn clamp_ratio(ratio: f64) -> f64 {
    ratio.min(RATIO_CLAMP_MAX)
}

/// Reparameterises a ratio into the diagnostic coordinate, clamping first.
pub fn coordinate(ratio: f64) -> f64 {
    (1.0 - clamp_ratio(ratio)).powf(-0.5)
}

/// Local derivative `d(coordinate)/d(ratio) = 0.5 (1 - ratio)^(-3/2)` at the
/// clamped ratio.
pub fn coordinate_derivative(ratio: f64) -> f64 {
    0.5 * (1.0 - clamp_ratio(ratio)).powf(-1.5)
}

/// Upper bound of the coordinate, reached at the clamp threshold (≈ 1000).
pub fn coordinate_ceiling() -> f64 {
    coordinate(RATIO_CLAMP_MAX)
}

/// How close a ratio sits to the singular boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// `ratio < 0.9`.
    #[default]
    Normal,
    /// `0.9 <= ratio < 1.0`.
    NearThreshold,
    /// `ratio >= 1.0`.
    AtOrBeyondThreshold,
}

impl Severity {
    /// Classifies a pre-clamp ratio.
    pub fn classify(ratio: f64) -> Self {
        if ratio >= SINGULAR_RATIO {
            Severity::AtOrBeyondThreshold
        } else if ratio >= NEAR_THRESHOLD_RATIO {
            Severity::NearThreshold
        } else {
            Severity::Normal
        }
    }

    /// Worst tier among `severities`; [`Severity::Normal`] when empty.
    pub fn worst<I>(severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        severities.into_iter().max().unwrap_or_default()
    }
}

/// Descriptive labels required for every diagnostic input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    reference_label: String,
    comparison_label: String,
    failure_definition: String,
}

impl Labels {
    /// Validates and stores the three labels.
    pub fn new(
        reference_label: impl Into<String>,
        comparison_label: impl Into<String>,
        failure_definition: impl Into<String>,
    ) -> Result<Self, YpError> {
        let labels = Self {
            reference_label: reference_label.into(),
            comparison_label: comparison_label.into(),
            failure_definition: failure_definition.into(),
        };
        check_label(&labels.reference_label, "reference_label")?;
        check_label(&labels.comparison_label, "comparison_label")?;
        check_label(&labels.failure_definition, "failure_definition")?;
        Ok(labels)
    }

    /// Description of the reference (capacity-like) quantity.
    pub fn reference_label(&self) -> &str {
        &self.reference_label
    }

    /// Description of the comparison (load-like) quantity.
    pub fn comparison_label(&self) -> &str {
        &self.comparison_label
    }

    /// What counts as failure in the caller's context.
    pub fn failure_definition(&self) -> &str {
        &self.failure_definition
    }
}

fn check_label(value: &str, field: &str) -> Result<(), YpError> {
    if value.trim().is_empty() {
        return Err(invalid_input(
            "blank-label",
            field,
            format!("{field} is required and must be a non-empty, non-whitespace string"),
        ));
    }
    Ok(())
}

/// Validates every element of a reference container (finite, `> 0`).
pub fn check_reference(values: &Values, field: &str) -> Result<(), YpError> {
    check_elements(values, field)?;
    if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| *v <= 0.0) {
        return Err(invalid_input(
            "non-positive-reference",
            field,
            format!("{field} must be positive; element {index} is {value}"),
        ));
    }
    Ok(())
}

/// Validates every element of a comparison container (finite, `>= 0`).
pub fn check_comparison(values: &Values, field: &str) -> Result<(), YpError> {
    check_elements(values, field)?;
    if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| *v < 0.0) {
        return Err(invalid_input(
            "negative-comparison",
            field,
            format!("{field} must be non-negative; element {index} is {value}"),
        ));
    }
    Ok(())
}

fn check_elements(values: &Values, field: &str) -> Result<(), YpError> {
    if values.is_empty() {
        return Err(invalid_input(
            "empty-values",
            field,
            format!("{field} must contain at least one value"),
        ));
    }
    if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(invalid_input(
            "non-finite",
            field,
            format!("{field} must be finite; element {index} is {value}"),
        ));
    }
    Ok(())
}

/// Validates a reference/comparison pair and resolves the combined shape.
pub fn validate_pair(
    reference: &Values,
    comparison: &Values,
    reference_field: &str,
    comparison_field: &str,
) -> Result<Shape, YpError> {
    check_reference(reference, reference_field)?;
    check_comparison(comparison, comparison_field)?;
    let shape = reference.broadcast_shape(comparison)?;
    check_ratios(reference, comparison, shape, comparison_field)?;
    Ok(shape)
}

/// Rejects pairs whose quotient leaves the finite range, e.g. a tiny
/// reference under a huge comparison.
fn check_ratios(
    reference: &Values,
    comparison: &Values,
    shape: Shape,
    field: &str,
) -> Result<(), YpError> {
    let len = match shape {
        Shape::Scalar => 1,
        Shape::Array(len) => len,
    };
    let overflow = reference
        .expand(len)
        .into_iter()
        .zip(comparison.expand(len))
        .enumerate()
        .find(|(_, (r, c))| !(c / r).is_finite());
    if let Some((index, (r, c))) = overflow {
        return Err(invalid_input(
            "ratio-overflow",
            field,
            format!("{field} / reference overflows at element {index}: {c} / {r}"),
        ));
    }
    Ok(())
}

/// Ratio, coordinate and severity computed from a validated pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Pre-clamp `comparison / reference`.
    pub ratio: Values,
    /// Clamped coordinate.
    pub coordinate: Values,
    /// Per-element severity, in element order.
    pub element_severity: Vec<Severity>,
    /// Worst observed severity.
    pub severity: Severity,
    /// Number of ratios above the clamp threshold.
    pub clamped: usize,
}

impl Evaluation {
    fn compute(reference: &Values, comparison: &Values, shape: Shape) -> Self {
        let ratio = match shape {
            Shape::Scalar => Values::Scalar(comparison.as_slice()[0] / reference.as_slice()[0]),
            Shape::Array(len) => Values::Array(
                reference
                    .expand(len)
                    .into_iter()
                    .zip(comparison.expand(len))
                    .map(|(r, c)| c / r)
                    .collect(),
            ),
        };
        let coordinate = ratio.map(coordinate);
        let element_severity: Vec<Severity> = ratio.iter().map(Severity::classify).collect();
        let severity = Severity::worst(element_severity.iter().copied());
        let clamped = ratio.iter().filter(|r| *r > RATIO_CLAMP_MAX).count();
        Self {
            ratio,
            coordinate,
            element_severity,
            severity,
            clamped,
        }
    }

    /// Quality flags implied by the evaluation.
    pub fn flags(&self) -> Vec<QualityFlag> {
        if self.clamped > 0 {
            vec![QualityFlag::ClampedAtThreshold {
                count: self.clamped,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Validates and evaluates a reference/comparison pair without labels.
pub fn evaluate_pair(reference: &Values, comparison: &Values) -> Result<Evaluation, YpError> {
    let shape = validate_pair(reference, comparison, "reference", "comparison")?;
    Ok(Evaluation::compute(reference, comparison, shape))
}

#[derive(Deserialize)]
struct DiagnosticInputRecord {
    reference: Values,
    comparison: Values,
    reference_label: String,
    comparison_label: String,
    failure_definition: String,
}

/// Validated, immutable pair of inputs plus their descriptive labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiagnosticInputRecord")]
pub struct DiagnosticInput {
    reference: Values,
    comparison: Values,
    #[serde(flatten)]
    labels: Labels,
    #[serde(skip)]
    shape: Shape,
}

impl DiagnosticInput {
    /// Validates labels, then reference, then comparison, then shapes.
    pub fn new(
        reference: impl Into<Values>,
        comparison: impl Into<Values>,
        reference_label: impl Into<String>,
        comparison_label: impl Into<String>,
        failure_definition: impl Into<String>,
    ) -> Result<Self, YpError> {
        let labels = Labels::new(reference_label, comparison_label, failure_definition)?;
        let reference = reference.into();
        let comparison = comparison.into();
        let shape = validate_pair(&reference, &comparison, "reference", "comparison")?;
        Ok(Self {
            reference,
            comparison,
            labels,
            shape,
        })
    }

    /// Reference (capacity-like) values.
    pub fn reference(&self) -> &Values {
        &self.reference
    }

    /// Comparison (load-like) values.
    pub fn comparison(&self) -> &Values {
        &self.comparison
    }

    /// Descriptive labels.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Shape of the elementwise result.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// True when both inputs are scalar point estimates.
    pub fn is_scalar(&self) -> bool {
        self.shape() == Shape::Scalar
    }

    /// Computes the transform for this input.
    pub fn evaluate(&self) -> DiagnosticResult {
        let evaluation = Evaluation::compute(&self.reference, &self.comparison, self.shape);
        debug!(
            severity = ?evaluation.severity,
            clamped = evaluation.clamped,
            len = evaluation.ratio.len(),
            "evaluated diagnostic coordinate"
        );
        let flags = evaluation.flags();
        DiagnosticResult {
            ratio: evaluation.ratio,
            coordinate: evaluation.coordinate,
            severity: evaluation.severity,
            element_severity: evaluation.element_severity,
            flags,
            labels: self.labels.clone(),
        }
    }
}

impl TryFrom<DiagnosticInputRecord> for DiagnosticInput {
    type Error = YpError;

    fn try_from(record: DiagnosticInputRecord) -> Result<Self, Self::Error> {
        DiagnosticInput::new(
            record.reference,
            record.comparison,
            record.reference_label,
            record.comparison_label,
            record.failure_definition,
        )
    }
}

/// Output of [`transform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Pre-clamp `comparison / reference`.
    pub ratio: Values,
    /// Clamped coordinate `(1 - ratio)^(-1/2)`.
    pub coordinate: Values,
    /// Worst observed severity tier.
    pub severity: Severity,
    /// Per-element severity tiers.
    pub element_severity: Vec<Severity>,
    /// Non-fatal quality flags.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
    /// Labels carried through for traceability.
    pub labels: Labels,
}

/// Validates the inputs and computes ratio, coordinate and severity.
///
/// ```
/// use yp_core::{transform, Severity};
///
/// let result = transform(100.0, 85.0, "capacity", "load", "timeout").unwrap();
/// assert_eq!(result.ratio.as_scalar(), Some(0.85));
/// assert!((result.coordinate.as_scalar().unwrap() - 2.582).abs() < 1e-3);
/// assert_eq!(result.severity, Severity::Normal);
/// ```
pub fn transform(
    reference: impl Into<Values>,
    comparison: impl Into<Values>,
    reference_label: &str,
    comparison_label: &str,
    failure_definition: &str,
) -> Result<DiagnosticResult, YpError> {
    let input = DiagnosticInput::new(
        reference,
        comparison,
        reference_label,
        comparison_label,
        failure_definition,
    )?;
    Ok(input.evaluate())
}
