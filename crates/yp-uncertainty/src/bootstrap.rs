use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use yp_core::errors::{invalid_input, YpError};
use yp_core::stat::{self, check_level, PercentileBand};
use yp_core::{
    coordinate, map_units, stable_hash_string, DiagnosticInput, QualityFlag, RngHandle, Severity,
    Shape, RATIO_CLAMP_MAX,
};

use crate::interval::{
    ConfidenceInterval, IntervalMethod, IntervalReport, DEFAULT_CONFIDENCE_LEVEL,
};
use crate::spec::{Moments, UncertaintySpec};

/// Resample count below which [`QualityFlag::LowResampleCount`] is raised.
pub const MIN_RECOMMENDED_RESAMPLES: usize = 1000;

/// Resample count used when none is configured.
pub const DEFAULT_RESAMPLE_COUNT: usize = 2000;

/// Resamples drawn from one RNG substream.
const CHUNK_SIZE: usize = 1024;

/// Floor applied to Gaussian reference draws.
const REFERENCE_FLOOR: f64 = 1e-10;

/// Options for [`bootstrap_interval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapOpts {
    /// Number of resamples.
    pub resample_count: usize,
    /// Two-sided coverage level.
    pub confidence_level: f64,
    /// Master seed; chunk `k` draws from substream `k`.
    pub seed: u64,
    /// Worker threads; 1 runs on the calling thread.
    pub workers: usize,
}

impl Default for BootstrapOpts {
    fn default() -> Self {
        Self {
            resample_count: DEFAULT_RESAMPLE_COUNT,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: 0,
            workers: 1,
        }
    }
}

impl BootstrapOpts {
    /// Default options with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

enum Sampler {
    Gaussian {
        reference: f64,
        comparison: f64,
        moments: Moments,
        correlation: f64,
    },
    Paired {
        reference: Vec<f64>,
        comparison: Vec<f64>,
    },
}

#[derive(Default)]
struct ChunkDraws {
    ratios: Vec<f64>,
    truncated_reference: usize,
    truncated_comparison: usize,
}

impl Sampler {
    fn resolve(input: &DiagnosticInput, spec: &UncertaintySpec) -> Result<Self, YpError> {
        match (input.shape(), spec) {
            (
                Shape::Scalar,
                UncertaintySpec::StandardDeviations {
                    reference_std,
                    comparison_std,
                    covariance,
                },
            ) => {
                let moments = Moments::validate(*reference_std, *comparison_std, *covariance)?;
                Ok(Sampler::Gaussian {
                    reference: input.reference().as_slice()[0],
                    comparison: input.comparison().as_slice()[0],
                    correlation: moments.correlation(),
                    moments,
                })
            }
            (Shape::Array(len), UncertaintySpec::PairedObservations) => Ok(Sampler::Paired {
                reference: input.reference().expand(len),
                comparison: input.comparison().expand(len),
            }),
            (Shape::Scalar, UncertaintySpec::PairedObservations) => Err(invalid_input(
                "mode-mismatch",
                "uncertainty_spec",
                "paired observations require array inputs; scalar point estimates need standard deviations",
            )),
            (Shape::Array(_), UncertaintySpec::StandardDeviations { .. }) => Err(invalid_input(
                "mode-mismatch",
                "uncertainty_spec",
                "standard deviations apply to scalar point estimates; array inputs are resampled as paired observations",
            )),
        }
    }

    /// Ratio at the input point estimate; the pooled ratio of means for
    /// paired observations.
    fn point_ratio(&self) -> f64 {
        match self {
            Sampler::Gaussian {
                reference,
                comparison,
                ..
            } => comparison / reference,
            Sampler::Paired {
                reference,
                comparison,
            } => stat::mean(comparison) / stat::mean(reference),
        }
    }

    fn draw(&self, rng: &mut RngHandle, count: usize) -> ChunkDraws {
        let mut draws = ChunkDraws {
            ratios: Vec::with_capacity(count),
            ..ChunkDraws::default()
        };
        match self {
            Sampler::Gaussian {
                reference,
                comparison,
                moments,
                correlation,
            } => {
                let residual = (1.0 - correlation * correlation).max(0.0).sqrt();
                for _ in 0..count {
                    let z_ref: f64 = StandardNormal.sample(rng);
                    let z_cmp: f64 = StandardNormal.sample(rng);
                    let mut r = reference + moments.reference_std * z_ref;
                    let mut c = comparison
                        + moments.comparison_std * (correlation * z_ref + residual * z_cmp);
                    if r < REFERENCE_FLOOR {
                        r = REFERENCE_FLOOR;
                        draws.truncated_reference += 1;
                    }
                    if c < 0.0 {
                        c = 0.0;
                        draws.truncated_comparison += 1;
                    }
                    draws.ratios.push(c / r);
                }
            }
            Sampler::Paired {
                reference,
                comparison,
            } => {
                let len = reference.len();
                let weight = 1.0 / len as f64;
                for _ in 0..count {
                    let mut mean_ref = 0.0;
                    let mut mean_cmp = 0.0;
                    for _ in 0..len {
                        let idx = rng.gen_range(0..len);
                        mean_ref += reference[idx] * weight;
                        mean_cmp += comparison[idx] * weight;
                    }
                    draws.ratios.push(mean_cmp / mean_ref);
                }
            }
        }
        draws
    }
}

/// Percentile bootstrap interval for the ratio and the coordinate.
///
/// Scalar inputs with [`UncertaintySpec::StandardDeviations`] are resampled
/// from (possibly correlated) normal distributions centred at the point
/// estimates; array inputs with [`UncertaintySpec::PairedObservations`] are
/// resampled with replacement using the same index for both arrays, each
/// resample yielding the ratio of the resampled means. Every resample goes
/// through the clamped transform. Bounds are the empirical
/// `(1 - level) / 2` and `1 - (1 - level) / 2` percentiles and the point
/// estimate is the resample median. The report severity classifies the
/// input point estimate, not the median.
///
/// Resamples are drawn in fixed chunks, chunk `k` seeded from substream `k`
/// of `opts.seed`, so equal seeds give bit-identical bounds for any
/// `opts.workers`.
pub fn bootstrap_interval(
    input: &DiagnosticInput,
    spec: &UncertaintySpec,
    opts: &BootstrapOpts,
) -> Result<IntervalReport, YpError> {
    check_level(opts.confidence_level, "confidence_level")?;
    if opts.resample_count == 0 {
        return Err(invalid_input(
            "zero-resamples",
            "resample_count",
            "resample_count must be at least 1",
        ));
    }
    let sampler = Sampler::resolve(input, spec)?;
    let input_hash = stable_hash_string(&(input, spec, opts))?;

    let total = opts.resample_count;
    let chunks = total.div_ceil(CHUNK_SIZE);
    debug!(
        resamples = total,
        chunks,
        workers = opts.workers,
        seed = opts.seed,
        "bootstrap started"
    );
    let draws = map_units(opts.workers, chunks, |chunk| {
        let start = chunk * CHUNK_SIZE;
        let count = CHUNK_SIZE.min(total - start);
        let mut rng = RngHandle::for_substream(opts.seed, chunk as u64);
        sampler.draw(&mut rng, count)
    })?;

    let mut ratios = Vec::with_capacity(total);
    let mut truncated_reference = 0;
    let mut truncated_comparison = 0;
    for chunk in draws {
        ratios.extend(chunk.ratios);
        truncated_reference += chunk.truncated_reference;
        truncated_comparison += chunk.truncated_comparison;
    }
    if let Some(index) = ratios.iter().position(|ratio| !ratio.is_finite()) {
        return Err(invalid_input(
            "ratio-overflow",
            "uncertainty_spec",
            format!("resample {index} produced a non-finite ratio; the uncertainty is too wide for the magnitude of the inputs"),
        ));
    }
    let mut coordinates: Vec<f64> = ratios.iter().copied().map(coordinate).collect();
    let clamped = ratios.iter().filter(|r| **r > RATIO_CLAMP_MAX).count();
    let ratio_mean = stat::mean(&ratios);
    let coordinate_mean = stat::mean(&coordinates);

    let mut flags = Vec::new();
    if total < MIN_RECOMMENDED_RESAMPLES {
        warn!(
            requested = total,
            minimum = MIN_RECOMMENDED_RESAMPLES,
            "bootstrap resample count below recommended minimum"
        );
        flags.push(QualityFlag::LowResampleCount {
            requested: total,
            minimum: MIN_RECOMMENDED_RESAMPLES,
        });
    }
    if truncated_reference + truncated_comparison > 0 {
        flags.push(QualityFlag::SamplesTruncated {
            reference: truncated_reference,
            comparison: truncated_comparison,
        });
    }
    if clamped > 0 {
        flags.push(QualityFlag::ClampedAtThreshold { count: clamped });
    }

    stat::sort_ascending(&mut ratios);
    stat::sort_ascending(&mut coordinates);
    let ratio = percentile_interval(&ratios, opts.confidence_level, flags.clone());
    let coordinate = percentile_interval(&coordinates, opts.confidence_level, flags.clone());
    debug!(
        ratio_lower = ratio.lower,
        ratio_upper = ratio.upper,
        coordinate_lower = coordinate.lower,
        coordinate_upper = coordinate.upper,
        "bootstrap finished"
    );

    Ok(IntervalReport {
        severity: Severity::classify(sampler.point_ratio()),
        ratio,
        coordinate,
        resample_count: Some(total),
        seed: Some(opts.seed),
        ratio_mean: Some(ratio_mean),
        coordinate_mean: Some(coordinate_mean),
        flags,
        input_hash,
    })
}

fn percentile_interval(sorted: &[f64], level: f64, flags: Vec<QualityFlag>) -> ConfidenceInterval {
    let band = PercentileBand::from_sorted(sorted, level);
    ConfidenceInterval {
        point_estimate: stat::percentile(sorted, 0.5),
        lower: band.lower,
        upper: band.upper,
        method: IntervalMethod::Bootstrap,
        confidence_level: level,
        standard_error: stat::std_dev(sorted),
        flags,
    }
}
