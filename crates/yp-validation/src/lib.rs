#![deny(missing_docs)]
//! Exploratory validation procedures for the diagnostic coordinate.
//!
//! None of these procedures returns a verdict: they report sequences,
//! baselines and deltas for a caller or presentation layer to inspect.

pub mod compare;
pub mod config;
pub mod negative;
pub mod sensitivity;

pub use compare::{
    compare_datasets, compare_unlabeled, ComparisonReport, DatasetEntry, DatasetStats,
    LabeledDataset,
};
pub use config::{load_config, ValidationConfig};
pub use negative::{
    negative_control, NegativeControlOpts, NegativeControlResult, ShuffleBaseline,
    DEFAULT_BAND_LEVEL, DEFAULT_SHUFFLE_COUNT,
};
pub use sensitivity::{
    sensitivity_check, PerturbationOutcome, SensitivityBaseline, SensitivityEntry,
    SensitivityOpts, SensitivityReport, DEFAULT_PERTURBATION_FRACTIONS,
};
