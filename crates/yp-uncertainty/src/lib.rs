#![deny(missing_docs)]
//! Confidence intervals for the diagnostic ratio and coordinate.
//!
//! Two estimators are provided: a seeded percentile bootstrap
//! ([`bootstrap_interval`]) and first-order variance propagation
//! ([`delta_method_interval`]). Both return an [`IntervalReport`] holding one
//! [`ConfidenceInterval`] for the ratio and one for the coordinate.

/// Percentile bootstrap over Gaussian draws or paired observations.
pub mod bootstrap;
pub mod config;
/// Delta-method propagation.
pub mod delta;
/// Interval and report types.
pub mod interval;
/// Uncertainty descriptions accepted by the estimators.
pub mod spec;

pub use bootstrap::{
    bootstrap_interval, BootstrapOpts, DEFAULT_RESAMPLE_COUNT, MIN_RECOMMENDED_RESAMPLES,
};
pub use config::{load_config, UncertaintyConfig};
pub use delta::{delta_method_interval, normal_quantile, ratio_variance, DeltaOpts};
pub use interval::{
    agreement, ConfidenceInterval, IntervalMethod, IntervalReport, MethodAgreement,
    DEFAULT_CONFIDENCE_LEVEL,
};
pub use spec::UncertaintySpec;
