use proptest::prelude::*;
use yp_core::{coordinate, FlagKind, Values};
use yp_validation::{sensitivity_check, SensitivityOpts, DEFAULT_PERTURBATION_FRACTIONS};

fn one_percent() -> SensitivityOpts {
    SensitivityOpts {
        fractions: vec![0.01],
    }
}

fn comparison_up_delta(reference: f64, comparison: f64) -> f64 {
    let report =
        sensitivity_check(&Values::from(reference), &Values::from(comparison), &one_percent())
            .unwrap();
    report.entries[0].comparison_up.mean_delta
}

#[test]
fn near_singular_ratio_is_more_sensitive() {
    let near = comparison_up_delta(100.0, 99.0);
    let far = comparison_up_delta(100.0, 50.0);
    assert!(near > far, "near {near} vs far {far}");
    assert!(near > 50.0);
    assert!(far < 0.01);
}

#[test]
fn default_fractions_give_four_outcomes_each() {
    let report = sensitivity_check(
        &Values::from(100.0),
        &Values::from(85.0),
        &SensitivityOpts::default(),
    )
    .unwrap();
    assert_eq!(report.entries.len(), DEFAULT_PERTURBATION_FRACTIONS.len());
    let fractions: Vec<f64> = report.entries.iter().map(|e| e.fraction).collect();
    assert_eq!(fractions, DEFAULT_PERTURBATION_FRACTIONS);
    assert_eq!(report.baseline.ratio, Values::Scalar(0.85));

    let entry = report.entry(0.05).unwrap();
    assert_eq!(entry.reference_up.perturbed, Values::Scalar(105.0));
    assert_eq!(entry.reference_down.perturbed, Values::Scalar(95.0));
    assert!(entry.reference_up.mean_delta < 0.0);
    assert!(entry.reference_down.mean_delta > 0.0);
    assert!(entry.comparison_up.mean_delta > 0.0);
    assert!(entry.comparison_down.mean_delta < 0.0);
    assert!(entry.reference_up.elasticity < 0.0);
    assert!(entry.comparison_up.elasticity > 0.0);

    let base = coordinate(0.85);
    let expected = (coordinate(85.0 * 1.05 / 100.0) - base) / base * 100.0;
    assert!((entry.comparison_up.mean_change_pct - expected).abs() < 1e-9);
}

#[test]
fn array_inputs_report_elementwise_deltas() {
    let report = sensitivity_check(
        &Values::from(vec![100.0, 100.0, 100.0]),
        &Values::from(vec![30.0, 60.0, 90.0]),
        &one_percent(),
    )
    .unwrap();
    let outcome = &report.entries[0].comparison_up;
    assert_eq!(outcome.delta.len(), 3);
    let deltas = outcome.delta.to_vec();
    assert!(deltas[0] < deltas[1] && deltas[1] < deltas[2]);
    assert!((outcome.mean_delta - deltas.iter().sum::<f64>() / 3.0).abs() < 1e-12);
}

#[test]
fn crossing_the_clamp_is_flagged() {
    let report = sensitivity_check(
        &Values::from(100.0),
        &Values::from(95.0),
        &SensitivityOpts {
            fractions: vec![0.10],
        },
    )
    .unwrap();
    let entry = &report.entries[0];
    assert!(yp_core::has_flag(&entry.comparison_up.flags, FlagKind::ClampedAtThreshold));
    assert!(entry.reference_up.flags.is_empty());
    assert!(report.baseline.flags.is_empty());
}

#[test]
fn invalid_fractions_are_rejected() {
    for fractions in [vec![], vec![0.0], vec![0.05, 1.0], vec![f64::NAN], vec![-0.01]] {
        let err = sensitivity_check(
            &Values::from(100.0),
            &Values::from(50.0),
            &SensitivityOpts { fractions },
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.info().field(), Some("fractions"));
    }
    let err = sensitivity_check(&Values::from(0.0), &Values::from(50.0), &one_percent())
        .unwrap_err();
    assert_eq!(err.info().code, "non-positive-reference");
}

proptest! {
    #[test]
    fn delta_grows_towards_the_threshold(low in 0.05f64..0.5, high in 0.5f64..0.98) {
        prop_assume!(high - low > 1e-3);
        let near = comparison_up_delta(100.0, high * 100.0);
        let far = comparison_up_delta(100.0, low * 100.0);
        prop_assert!(near > far);
    }
}

#[test]
fn overflowing_perturbation_is_attributed_to_fractions() {
    let err = sensitivity_check(
        &Values::from(1.7e308),
        &Values::from(1e308),
        &SensitivityOpts::default(),
    )
    .unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(err.info().code, "perturbation-overflow");
    assert_eq!(err.info().field(), Some("fractions"));
    assert_eq!(err.info().context.get("input").map(String::as_str), Some("reference"));

    // Shrinking the reference by 10% pushes this ratio past f64::MAX.
    let err = sensitivity_check(
        &Values::from(1e-300),
        &Values::from(1.7e8),
        &SensitivityOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "perturbation-overflow");
    assert_eq!(err.info().field(), Some("fractions"));

    let err = sensitivity_check(
        &Values::from(1e-300),
        &Values::from(1e300),
        &SensitivityOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "ratio-overflow");
    assert_eq!(err.info().field(), Some("comparison"));
}
