//! Non-fatal quality flags attached to results.

use serde::{Deserialize, Serialize};

/// Discriminant of a [`QualityFlag`], convenient for branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// See [`QualityFlag::ClampedAtThreshold`].
    ClampedAtThreshold,
    /// See [`QualityFlag::LowResampleCount`].
    LowResampleCount,
    /// See [`QualityFlag::LinearizationDegraded`].
    LinearizationDegraded,
    /// See [`QualityFlag::SamplesTruncated`].
    SamplesTruncated,
}

/// Condition detected while producing a result that did not prevent it.
///
/// Flags are part of the returned value so automated callers can branch on
/// them; the presentation layer decides how to word them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityFlag {
    /// Ratios above the clamp threshold had their coordinate clamped.
    ClampedAtThreshold {
        /// Number of clamped values.
        count: usize,
    },
    /// Fewer resamples than the recommended minimum were requested.
    LowResampleCount {
        /// Requested resample count.
        requested: usize,
        /// Recommended minimum.
        minimum: usize,
    },
    /// First-order propagation was applied close to the singular point.
    LinearizationDegraded {
        /// Pre-clamp ratio at which the linearisation was evaluated.
        ratio: f64,
    },
    /// Gaussian draws outside the physical domain were truncated.
    SamplesTruncated {
        /// Reference draws raised to the positive floor.
        reference: usize,
        /// Comparison draws raised to zero.
        comparison: usize,
    },
}

impl QualityFlag {
    /// Returns the discriminant of the flag.
    pub fn kind(&self) -> FlagKind {
        match self {
            QualityFlag::ClampedAtThreshold { .. } => FlagKind::ClampedAtThreshold,
            QualityFlag::LowResampleCount { .. } => FlagKind::LowResampleCount,
            QualityFlag::LinearizationDegraded { .. } => FlagKind::LinearizationDegraded,
            QualityFlag::SamplesTruncated { .. } => FlagKind::SamplesTruncated,
        }
    }
}

/// Whether `flags` contains a flag of the given kind.
pub fn has_flag(flags: &[QualityFlag], kind: FlagKind) -> bool {
    flags.iter().any(|flag| flag.kind() == kind)
}
