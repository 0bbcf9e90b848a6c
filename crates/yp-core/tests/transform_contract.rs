use yp_core::{
    coordinate, coordinate_ceiling, has_flag, transform, FlagKind, QualityFlag, Severity, Values,
    RATIO_CLAMP_MAX,
};

const REF: &str = "test_capacity";
const CMP: &str = "test_load";
const FAIL: &str = "test_failure";

#[test]
fn scalar_end_to_end() {
    let result = transform(100.0, 85.0, REF, CMP, FAIL).unwrap();
    assert_eq!(result.ratio, Values::Scalar(0.85));
    let y = result.coordinate.as_scalar().unwrap();
    assert!((y - 2.582).abs() < 1e-3, "coordinate was {y}");
    assert_eq!(result.severity, Severity::Normal);
    assert!(result.flags.is_empty());
    assert_eq!(result.labels.reference_label(), REF);
    assert_eq!(result.labels.comparison_label(), CMP);
    assert_eq!(result.labels.failure_definition(), FAIL);
}

#[test]
fn half_ratio_gives_sqrt_two() {
    let result = transform(100.0, 50.0, REF, CMP, FAIL).unwrap();
    assert_eq!(result.ratio.as_scalar(), Some(0.5));
    assert!((result.coordinate.as_scalar().unwrap() - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn zero_comparison_gives_unit_coordinate() {
    let result = transform(100.0, 0.0, REF, CMP, FAIL).unwrap();
    assert_eq!(result.ratio.as_scalar(), Some(0.0));
    assert_eq!(result.coordinate.as_scalar(), Some(1.0));
    assert_eq!(coordinate(0.0), 1.0);
}

#[test]
fn arrays_are_elementwise() {
    let result = transform(
        vec![100.0, 100.0, 100.0],
        vec![25.0, 50.0, 75.0],
        REF,
        CMP,
        FAIL,
    )
    .unwrap();
    let expected = [0.25, 0.5, 0.75];
    assert_eq!(result.ratio.len(), 3);
    for (idx, (x, y)) in result.ratio.iter().zip(result.coordinate.iter()).enumerate() {
        assert!((x - expected[idx]).abs() < 1e-12);
        assert!((y - (1.0 - expected[idx]).powf(-0.5)).abs() < 1e-12);
    }
    assert_eq!(result.element_severity, vec![Severity::Normal; 3]);
}

#[test]
fn scalar_reference_broadcasts_against_array() {
    let result = transform(200.0, vec![20.0, 190.0], REF, CMP, FAIL).unwrap();
    assert_eq!(result.ratio, Values::Array(vec![0.1, 0.95]));
    assert_eq!(
        result.element_severity,
        vec![Severity::Normal, Severity::NearThreshold]
    );
    assert_eq!(result.severity, Severity::NearThreshold);
}

#[test]
fn severity_tiers() {
    assert_eq!(Severity::classify(0.5), Severity::Normal);
    assert_eq!(Severity::classify(0.9), Severity::NearThreshold);
    assert_eq!(Severity::classify(0.999), Severity::NearThreshold);
    assert_eq!(Severity::classify(1.0), Severity::AtOrBeyondThreshold);
    assert_eq!(Severity::classify(1.2), Severity::AtOrBeyondThreshold);

    let at_boundary = transform(100.0, 90.0, REF, CMP, FAIL).unwrap();
    assert_eq!(at_boundary.severity, Severity::NearThreshold);
    let beyond = transform(100.0, 120.0, REF, CMP, FAIL).unwrap();
    assert_eq!(beyond.severity, Severity::AtOrBeyondThreshold);
    let below = transform(100.0, 80.0, REF, CMP, FAIL).unwrap();
    assert_eq!(below.severity, Severity::Normal);
}

#[test]
fn worst_severity_is_reported_for_arrays() {
    let result = transform(
        vec![100.0, 100.0, 100.0],
        vec![50.0, 95.0, 75.0],
        REF,
        CMP,
        FAIL,
    )
    .unwrap();
    assert_eq!(result.severity, Severity::NearThreshold);
}

#[test]
fn clamping_keeps_coordinate_finite_and_flags_it() {
    let at_one = transform(100.0, 100.0, REF, CMP, FAIL).unwrap();
    assert_eq!(at_one.ratio.as_scalar(), Some(1.0));
    let y = at_one.coordinate.as_scalar().unwrap();
    assert!(y.is_finite());
    assert!(y > 100.0);
    assert_eq!(y, coordinate_ceiling());
    assert_eq!(
        at_one.flags,
        vec![QualityFlag::ClampedAtThreshold { count: 1 }]
    );

    let beyond = transform(100.0, 150.0, REF, CMP, FAIL).unwrap();
    assert_eq!(beyond.ratio.as_scalar(), Some(1.5));
    assert_eq!(beyond.coordinate.as_scalar(), Some(coordinate_ceiling()));
    assert!(has_flag(&beyond.flags, FlagKind::ClampedAtThreshold));
}

#[test]
fn ceiling_is_the_coordinate_at_the_clamp_threshold() {
    let ceiling = coordinate_ceiling();
    assert_eq!(coordinate(RATIO_CLAMP_MAX), ceiling);
    assert!((ceiling - 1000.0).abs() < 1e-3);
    assert_eq!(coordinate_ceiling(), ceiling);
}

#[test]
fn near_boundary_values_stay_finite() {
    let result = transform(1000.0, 999.0, REF, CMP, FAIL).unwrap();
    assert!((result.coordinate.as_scalar().unwrap() - 31.62).abs() < 0.01 * 31.62);

    let arrays = transform(
        vec![100.0, 100.0, 100.0],
        vec![99.0, 99.9, 99.99],
        REF,
        CMP,
        FAIL,
    )
    .unwrap();
    assert!(arrays.coordinate.iter().all(|y| y.is_finite() && y > 0.0));
    assert!(arrays.flags.is_empty());
}

#[test]
fn coordinate_grows_toward_the_threshold() {
    let ys: Vec<f64> = [0.5, 0.7, 0.8, 0.85]
        .iter()
        .map(|x| {
            transform(100.0, x * 100.0, REF, CMP, FAIL)
                .unwrap()
                .coordinate
                .as_scalar()
                .unwrap()
        })
        .collect();
    assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
}
