//! Side-by-side evaluation of several labelled datasets.
//!
//! Each dataset is transformed independently and returned with descriptive
//! statistics. No cross-dataset aggregate is computed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use yp_core::errors::{invalid_input, ErrorInfo, YpError};
use yp_core::stat;
use yp_core::{evaluate_pair, QualityFlag, Severity, Values};

/// Reference/comparison pair under a caller-chosen label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataset {
    /// Name reported back in the matching [`DatasetEntry`].
    pub label: String,
    /// Reference values.
    pub reference: Values,
    /// Comparison values.
    pub comparison: Values,
}

impl LabeledDataset {
    /// Builds a dataset; validation happens in [`compare_datasets`].
    pub fn new(
        label: impl Into<String>,
        reference: impl Into<Values>,
        comparison: impl Into<Values>,
    ) -> Self {
        Self {
            label: label.into(),
            reference: reference.into(),
            comparison: comparison.into(),
        }
    }
}

/// Descriptive statistics of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Smallest ratio.
    pub ratio_min: f64,
    /// Largest ratio.
    pub ratio_max: f64,
    /// Mean ratio.
    pub ratio_mean: f64,
    /// Smallest coordinate.
    pub coordinate_min: f64,
    /// Largest coordinate.
    pub coordinate_max: f64,
    /// Mean coordinate.
    pub coordinate_mean: f64,
    /// Number of evaluated points.
    pub n_points: usize,
}

impl DatasetStats {
    fn from_sequences(ratio: &[f64], coordinate: &[f64]) -> Self {
        let (ratio_min, ratio_max) = stat::min_max(ratio);
        let (coordinate_min, coordinate_max) = stat::min_max(coordinate);
        Self {
            ratio_min,
            ratio_max,
            ratio_mean: stat::mean(ratio),
            coordinate_min,
            coordinate_max,
            coordinate_mean: stat::mean(coordinate),
            n_points: ratio.len(),
        }
    }
}

/// Evaluated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Dataset label.
    pub label: String,
    /// Pre-clamp ratios, unmodified.
    pub ratio: Values,
    /// Coordinates, unmodified.
    pub coordinate: Values,
    /// Worst severity in the dataset.
    pub severity: Severity,
    /// Descriptive statistics.
    pub stats: DatasetStats,
    /// Quality flags of this dataset.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
}

/// Per-dataset results in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// One entry per input dataset.
    pub datasets: Vec<DatasetEntry>,
}

impl ComparisonReport {
    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Whether the report holds no datasets.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Looks up an entry by label.
    pub fn get(&self, label: &str) -> Option<&DatasetEntry> {
        self.datasets.iter().find(|entry| entry.label == label)
    }
}

fn in_dataset(err: YpError, label: &str) -> YpError {
    match err {
        YpError::InvalidInput(info) => YpError::InvalidInput(
            ErrorInfo {
                message: format!("dataset '{label}': {}", info.message),
                ..info
            }
            .with_context("dataset", label),
        ),
        other => other,
    }
}

fn label_error(code: &str, index: usize, message: String) -> YpError {
    YpError::InvalidInput(
        ErrorInfo::new(code, message)
            .with_context("field", "label")
            .with_context("dataset_index", index.to_string()),
    )
}

/// Transforms each dataset independently.
///
/// Labels must be non-blank and unique. Every dataset is validated like a
/// single transform input; errors name the offending dataset.
pub fn compare_datasets(datasets: &[LabeledDataset]) -> Result<ComparisonReport, YpError> {
    if datasets.is_empty() {
        return Err(invalid_input(
            "no-datasets",
            "datasets",
            "at least one dataset is required",
        ));
    }
    let mut entries: Vec<DatasetEntry> = Vec::with_capacity(datasets.len());
    for (index, dataset) in datasets.iter().enumerate() {
        let label = dataset.label.as_str();
        if label.trim().is_empty() {
            return Err(label_error(
                "blank-label",
                index,
                format!("dataset {index} has a blank label"),
            ));
        }
        if entries.iter().any(|entry| entry.label == label) {
            return Err(label_error(
                "duplicate-label",
                index,
                format!("dataset label '{label}' is used more than once"),
            ));
        }
        let evaluation = evaluate_pair(&dataset.reference, &dataset.comparison)
            .map_err(|err| in_dataset(err, label))?;
        let flags = evaluation.flags();
        if !flags.is_empty() {
            warn!(dataset = label, clamped = evaluation.clamped, "dataset ratios clamped");
        }
        let stats = DatasetStats::from_sequences(
            evaluation.ratio.as_slice(),
            evaluation.coordinate.as_slice(),
        );
        entries.push(DatasetEntry {
            label: label.to_owned(),
            ratio: evaluation.ratio,
            coordinate: evaluation.coordinate,
            severity: evaluation.severity,
            stats,
            flags,
        });
    }
    debug!(datasets = entries.len(), "compared datasets");
    Ok(ComparisonReport { datasets: entries })
}

/// Like [`compare_datasets`], labelling the pairs `dataset_0`, `dataset_1`, ...
pub fn compare_unlabeled(pairs: &[(Values, Values)]) -> Result<ComparisonReport, YpError> {
    let datasets: Vec<LabeledDataset> = pairs
        .iter()
        .enumerate()
        .map(|(index, (reference, comparison))| {
            LabeledDataset::new(format!("dataset_{index}"), reference.clone(), comparison.clone())
        })
        .collect();
    compare_datasets(&datasets)
}
