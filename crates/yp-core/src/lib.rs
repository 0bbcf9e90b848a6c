#![deny(missing_docs)]
#![doc = "Diagnostic coordinate transform, severity tiers, quality flags and the shared error, RNG, serde and statistics primitives used by the uncertainty and validation crates."]

pub mod errors;
pub mod exec;
pub mod flags;
/// Stable input hashing for report provenance.
pub mod hash;
pub mod rng;
pub mod serde;
pub mod stat;
pub mod transform;
pub mod values;

pub use errors::{invalid_input, ErrorInfo, YpError};
pub use exec::map_units;
pub use flags::{has_flag, FlagKind, QualityFlag};
pub use hash::stable_hash_string;
pub use rng::{derive_substream_seed, RngHandle};
pub use stat::PercentileBand;
pub use transform::{
    check_comparison, check_reference, clamp_ratio, coordinate, coordinate_ceiling,
    coordinate_derivative, evaluate_pair, transform, validate_pair, DiagnosticInput,
    DiagnosticResult, Evaluation, Labels, Severity, NEAR_THRESHOLD_RATIO, RATIO_CLAMP_MAX,
    SINGULAR_RATIO,
};
pub use values::{Shape, Values};
