//! Shuffled negative control.
//!
//! The comparison sequence is randomly re-paired with the reference
//! sequence `shuffle_count` times; the coordinates of those re-pairings form
//! a baseline that the real pairing can be looked at against. Nothing here
//! decides whether the real sequence differs from the baseline.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use yp_core::errors::{invalid_input, YpError};
use yp_core::stat::{self, check_level, PercentileBand};
use yp_core::{
    coordinate, evaluate_pair, map_units, stable_hash_string, QualityFlag, RngHandle, Shape,
    Values, RATIO_CLAMP_MAX,
};

/// Shuffle count used when none is configured.
pub const DEFAULT_SHUFFLE_COUNT: usize = 100;

/// Band level used when none is configured.
pub const DEFAULT_BAND_LEVEL: f64 = 0.95;

/// Options for [`negative_control`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeControlOpts {
    /// Number of random re-pairings.
    pub shuffle_count: usize,
    /// Master seed; shuffle `i` uses substream `i`.
    pub seed: u64,
    /// Coverage of the baseline band and envelope.
    pub band_level: f64,
    /// Worker threads; 1 runs on the calling thread.
    pub workers: usize,
    /// Keep every shuffled coordinate sequence in the result.
    pub retain_shuffles: bool,
}

impl Default for NegativeControlOpts {
    fn default() -> Self {
        Self {
            shuffle_count: DEFAULT_SHUFFLE_COUNT,
            seed: 0,
            band_level: DEFAULT_BAND_LEVEL,
            workers: 1,
            retain_shuffles: false,
        }
    }
}

/// Summary of the shuffled coordinate sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuffleBaseline {
    /// Mean over shuffles of the per-shuffle mean coordinate.
    pub mean_of_means: f64,
    /// Percentile band of the per-shuffle mean coordinates.
    pub band: PercentileBand,
    /// Elementwise mean coordinate across shuffles.
    pub elementwise_mean: Vec<f64>,
    /// Elementwise lower percentile across shuffles.
    pub envelope_lower: Vec<f64>,
    /// Elementwise upper percentile across shuffles.
    pub envelope_upper: Vec<f64>,
    /// Shuffled ratios above the clamp threshold, over all shuffles.
    pub clamped: usize,
}

/// Real sequences next to the shuffled baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeControlResult {
    /// Real pre-clamp ratios.
    pub real_ratio: Vec<f64>,
    /// Real coordinates.
    pub real_coordinate: Vec<f64>,
    /// Mean of the real coordinates.
    pub real_mean_coordinate: f64,
    /// Baseline built from the shuffles.
    pub baseline: ShuffleBaseline,
    /// Number of shuffles.
    pub shuffle_count: usize,
    /// Master seed.
    pub seed: u64,
    /// Quality flags of the real pairing.
    #[serde(default)]
    pub flags: Vec<QualityFlag>,
    /// SHA-256 of the canonical inputs and options.
    pub input_hash: String,
    /// Shuffled coordinate sequences, when retained.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shuffled: Option<Vec<Vec<f64>>>,
}

/// Builds a shuffled baseline for the pairing of `reference` and
/// `comparison_real`.
///
/// The comparison must hold at least two values; a scalar reference is
/// broadcast. Shuffle `i` permutes the comparison sequence with an RNG
/// seeded from substream `i` of `opts.seed`, so the result is identical for
/// every worker count.
pub fn negative_control(
    reference: &Values,
    comparison_real: &Values,
    opts: &NegativeControlOpts,
) -> Result<NegativeControlResult, YpError> {
    if opts.shuffle_count == 0 {
        return Err(invalid_input(
            "zero-shuffles",
            "shuffle_count",
            "shuffle_count must be at least 1",
        ));
    }
    check_level(opts.band_level, "band_level")?;
    let real = evaluate_pair(reference, comparison_real)?;
    let len = match (real.ratio.shape(), comparison_real.shape()) {
        (Shape::Array(len), Shape::Array(_)) if len >= 2 => len,
        _ => {
            return Err(invalid_input(
                "too-few-values",
                "comparison",
                "negative control needs at least two comparison values to re-pair",
            ))
        }
    };
    let input_hash = stable_hash_string(&(reference, comparison_real, opts))?;
    let reference = reference.expand(len);
    let comparison = comparison_real.to_vec();
    debug!(
        shuffles = opts.shuffle_count,
        len,
        workers = opts.workers,
        seed = opts.seed,
        "negative control started"
    );

    let shuffles = map_units(opts.workers, opts.shuffle_count, |index| {
        let mut rng = RngHandle::for_substream(opts.seed, index as u64);
        let mut permuted = comparison.clone();
        permuted.shuffle(&mut rng);
        reference
            .iter()
            .zip(permuted)
            .map(|(r, c)| c / r)
            .collect::<Vec<f64>>()
    })?;

    if shuffles.iter().flatten().any(|ratio| !ratio.is_finite()) {
        return Err(invalid_input(
            "ratio-overflow",
            "comparison",
            "a shuffled pairing produced a non-finite ratio; reference and comparison magnitudes are too far apart",
        ));
    }
    let clamped = shuffles
        .iter()
        .flatten()
        .filter(|ratio| **ratio > RATIO_CLAMP_MAX)
        .count();
    let shuffled: Vec<Vec<f64>> = shuffles
        .into_iter()
        .map(|ratios| ratios.into_iter().map(coordinate).collect())
        .collect();
    let baseline = summarize(&shuffled, len, opts.band_level, clamped);

    let real_coordinate = real.coordinate.to_vec();
    let real_mean_coordinate = stat::mean(&real_coordinate);
    let flags = real.flags();
    if !flags.is_empty() {
        warn!(clamped = real.clamped, "real ratios clamped in negative control");
    }
    debug!(
        real_mean = real_mean_coordinate,
        baseline_lower = baseline.band.lower,
        baseline_upper = baseline.band.upper,
        "negative control finished"
    );

    Ok(NegativeControlResult {
        real_ratio: real.ratio.to_vec(),
        real_coordinate,
        real_mean_coordinate,
        baseline,
        shuffle_count: opts.shuffle_count,
        seed: opts.seed,
        flags,
        input_hash,
        shuffled: opts.retain_shuffles.then_some(shuffled),
    })
}

fn summarize(shuffled: &[Vec<f64>], len: usize, level: f64, clamped: usize) -> ShuffleBaseline {
    let mut means: Vec<f64> = shuffled.iter().map(|seq| stat::mean(seq)).collect();
    let mean_of_means = stat::mean(&means);
    stat::sort_ascending(&mut means);
    let band = PercentileBand::from_sorted(&means, level);

    let mut elementwise_mean = Vec::with_capacity(len);
    let mut envelope_lower = Vec::with_capacity(len);
    let mut envelope_upper = Vec::with_capacity(len);
    let mut column = Vec::with_capacity(shuffled.len());
    for index in 0..len {
        column.clear();
        column.extend(shuffled.iter().map(|seq| seq[index]));
        elementwise_mean.push(stat::mean(&column));
        stat::sort_ascending(&mut column);
        let envelope = PercentileBand::from_sorted(&column, level);
        envelope_lower.push(envelope.lower);
        envelope_upper.push(envelope.upper);
    }

    ShuffleBaseline {
        mean_of_means,
        band,
        elementwise_mean,
        envelope_lower,
        envelope_upper,
        clamped,
    }
}
