use yp_uncertainty::{
    agreement, bootstrap_interval, delta_method_interval, BootstrapOpts, DeltaOpts,
    UncertaintySpec,
};
use yp_core::DiagnosticInput;

fn low_noise_input() -> (DiagnosticInput, UncertaintySpec) {
    let input = DiagnosticInput::new(100.0, 50.0, "capacity", "load", "overload").unwrap();
    (input, UncertaintySpec::standard_deviations(1.0, 0.5))
}

#[test]
fn bootstrap_and_delta_agree_in_low_noise_limit() {
    let (input, spec) = low_noise_input();
    let opts = BootstrapOpts {
        resample_count: 1_000_000,
        seed: 42,
        workers: 4,
        ..BootstrapOpts::default()
    };
    let boot = bootstrap_interval(&input, &spec, &opts).unwrap();
    let delta = delta_method_interval(&input, &spec, &DeltaOpts::default()).unwrap();

    let ratio = agreement(&boot.ratio, &delta.ratio);
    assert!(ratio.midpoint_offset < 0.01, "ratio midpoint offset {ratio:?}");
    assert!(ratio.width_difference < 0.02, "ratio width difference {ratio:?}");

    // Curvature of the transform shifts the bootstrap percentiles slightly
    // upward relative to the symmetric delta interval.
    let coordinate = agreement(&boot.coordinate, &delta.coordinate);
    assert!(coordinate.midpoint_offset < 0.03, "coordinate midpoint offset {coordinate:?}");
    assert!(coordinate.width_difference < 0.02, "coordinate width difference {coordinate:?}");

    assert!(boot.flags.is_empty());
    assert!(delta.flags.is_empty());
}

#[test]
fn positive_covariance_narrows_both_intervals() {
    let (input, independent) = low_noise_input();
    let correlated = independent.clone().with_covariance(0.4);
    let opts = BootstrapOpts {
        resample_count: 20_000,
        seed: 3,
        ..BootstrapOpts::default()
    };

    let delta_ind = delta_method_interval(&input, &independent, &DeltaOpts::default()).unwrap();
    let delta_cor = delta_method_interval(&input, &correlated, &DeltaOpts::default()).unwrap();
    assert!(delta_cor.ratio.width() < delta_ind.ratio.width());
    assert!(delta_cor.coordinate.standard_error < delta_ind.coordinate.standard_error);

    let boot_ind = bootstrap_interval(&input, &independent, &opts).unwrap();
    let boot_cor = bootstrap_interval(&input, &correlated, &opts).unwrap();
    assert!(boot_cor.ratio.width() < boot_ind.ratio.width());
    assert!(agreement(&boot_cor.ratio, &delta_cor.ratio).width_difference < 0.05);
}

#[test]
fn narrower_level_gives_narrower_delta_interval() {
    let (input, spec) = low_noise_input();
    let wide = delta_method_interval(&input, &spec, &DeltaOpts::default()).unwrap();
    let narrow =
        delta_method_interval(&input, &spec, &DeltaOpts { confidence_level: 0.5 }).unwrap();
    assert!(narrow.ratio.width() < wide.ratio.width());
    assert_eq!(narrow.ratio.point_estimate, wide.ratio.point_estimate);
    assert!(narrow.ratio.contains(0.5));
}
