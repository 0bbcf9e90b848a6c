use rand::Rng;
use yp_core::{RngHandle, Values};
use yp_validation::{negative_control, NegativeControlOpts, DEFAULT_SHUFFLE_COUNT};

fn independent_pairing(seed: u64, len: usize) -> (Values, Values) {
    let mut rng = RngHandle::from_seed(seed);
    let reference: Vec<f64> = (0..len).map(|_| rng.gen_range(80.0..120.0)).collect();
    let comparison: Vec<f64> = (0..len).map(|_| rng.gen_range(10.0..70.0)).collect();
    (Values::from(reference), Values::from(comparison))
}

#[test]
fn real_mean_sits_inside_baseline_band_for_most_seeds() {
    let trials = 50;
    let mut inside = 0;
    for seed in 0..trials {
        let (reference, comparison) = independent_pairing(10_000 + seed, 30);
        let opts = NegativeControlOpts {
            shuffle_count: 200,
            seed,
            ..NegativeControlOpts::default()
        };
        let result = negative_control(&reference, &comparison, &opts).unwrap();
        if result.baseline.band.contains(result.real_mean_coordinate) {
            inside += 1;
        }
    }
    assert!(inside >= 40, "real mean inside band for {inside} of {trials} seeds");
}

#[test]
fn result_is_identical_across_worker_counts() {
    let (reference, comparison) = independent_pairing(5, 40);
    let sequential = NegativeControlOpts {
        seed: 77,
        retain_shuffles: true,
        ..NegativeControlOpts::default()
    };
    let parallel = NegativeControlOpts {
        workers: 3,
        ..sequential.clone()
    };
    let a = negative_control(&reference, &comparison, &sequential).unwrap();
    let b = negative_control(&reference, &comparison, &parallel).unwrap();
    assert_eq!(a.baseline, b.baseline);
    assert_eq!(a.shuffled, b.shuffled);
    assert_eq!(a.real_coordinate, b.real_coordinate);

    let other_seed = NegativeControlOpts {
        seed: 78,
        ..sequential
    };
    let c = negative_control(&reference, &comparison, &other_seed).unwrap();
    assert_ne!(a.baseline.mean_of_means, c.baseline.mean_of_means);
}

#[test]
fn shuffles_are_permutations_of_the_comparison() {
    let reference = Values::from(100.0);
    let comparison = Values::from(vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    let opts = NegativeControlOpts {
        shuffle_count: 12,
        retain_shuffles: true,
        ..NegativeControlOpts::default()
    };
    let result = negative_control(&reference, &comparison, &opts).unwrap();
    let shuffled = result.shuffled.as_ref().unwrap();
    assert_eq!(shuffled.len(), 12);

    let mut real = result.real_coordinate.clone();
    real.sort_by(f64::total_cmp);
    for sequence in shuffled {
        let mut sorted = sequence.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(sorted, real);
    }
    // A constant reference makes every re-pairing share the real mean.
    assert!((result.baseline.mean_of_means - result.real_mean_coordinate).abs() < 1e-12);
    assert!(result.baseline.band.width() < 1e-12);
}

#[test]
fn summary_shapes_and_defaults() {
    let (reference, comparison) = independent_pairing(9, 16);
    let result =
        negative_control(&reference, &comparison, &NegativeControlOpts::default()).unwrap();
    assert_eq!(result.shuffle_count, DEFAULT_SHUFFLE_COUNT);
    assert_eq!(result.seed, 0);
    assert!(result.shuffled.is_none());
    assert_eq!(result.real_ratio.len(), 16);
    assert_eq!(result.baseline.elementwise_mean.len(), 16);
    assert_eq!(result.baseline.band.level, 0.95);
    for index in 0..16 {
        assert!(result.baseline.envelope_lower[index] <= result.baseline.elementwise_mean[index]);
        assert!(result.baseline.elementwise_mean[index] <= result.baseline.envelope_upper[index]);
    }
    assert_eq!(result.input_hash.len(), 64);
    assert!(result.flags.is_empty());
    assert_eq!(result.baseline.clamped, 0);
}

#[test]
fn invalid_requests_are_rejected() {
    let reference = Values::from(vec![100.0, 100.0, 100.0]);
    let comparison = Values::from(vec![10.0, 20.0, 30.0]);

    let zero = NegativeControlOpts {
        shuffle_count: 0,
        ..NegativeControlOpts::default()
    };
    let err = negative_control(&reference, &comparison, &zero).unwrap_err();
    assert_eq!(err.info().field(), Some("shuffle_count"));

    let band = NegativeControlOpts {
        band_level: 1.5,
        ..NegativeControlOpts::default()
    };
    let err = negative_control(&reference, &comparison, &band).unwrap_err();
    assert_eq!(err.info().code, "invalid-level");

    let err = negative_control(&reference, &Values::from(20.0), &NegativeControlOpts::default())
        .unwrap_err();
    assert_eq!(err.info().code, "too-few-values");

    let err = negative_control(
        &reference,
        &Values::from(vec![10.0, 20.0]),
        &NegativeControlOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "shape-mismatch");

    let err = negative_control(
        &reference,
        &Values::from(vec![10.0, -1.0, 5.0]),
        &NegativeControlOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "negative-comparison");
}

#[test]
fn overflowing_repairing_is_rejected() {
    // Real pairing is finite; swapping the comparisons is not.
    let reference = Values::from(vec![1e-300, 1.0]);
    let comparison = Values::from(vec![1.0, 1e300]);
    let opts = NegativeControlOpts {
        shuffle_count: 50,
        ..NegativeControlOpts::default()
    };
    let err = negative_control(&reference, &comparison, &opts).unwrap_err();
    assert_eq!(err.info().code, "ratio-overflow");
}
