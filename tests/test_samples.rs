mod synthetic;

use std::collections::HashMap;
use std::path::Path;

use kilonova_lightcurves::samples::{
    calc_baryonic_mass, calc_compactness, downsample, masses_from_chirp, TidalInput,
};
use kilonova_lightcurves::{Error, PosteriorSamples};

fn parse(text: &str) -> PosteriorSamples {
    PosteriorSamples::parse(text, Path::new("test.dat")).unwrap()
}

#[test]
fn components_are_ordered_heavier_first() {
    let samples = parse(&synthetic::posterior_components(20, 11, true));
    assert_eq!(samples.len(), 20);
    for s in &samples.samples {
        assert!(s.m1 >= s.m2, "m1 {} < m2 {}", s.m1, s.m2);
        match s.tidal {
            TidalInput::Components { lambda1, lambda2 } => {
                // the lighter body is the less compact one
                assert!(lambda2 >= lambda1, "lambda1 {lambda1} lambda2 {lambda2}");
            }
            other => panic!("expected component lambdas, got {other:?}"),
        }
    }
}

#[test]
fn tilde_columns_give_positive_lambdas() {
    let samples = parse(&synthetic::posterior_tilde(30, 12));
    let binaries = samples.derive(false).unwrap();
    assert_eq!(binaries.len(), 30);
    for b in &binaries {
        assert!(b.m1 >= b.m2);
        assert!((1.0..2.0).contains(&b.m1), "m1 = {}", b.m1);
        assert!(b.lambda1 > 0.0 && b.lambda2 > 0.0, "{b:?}");
        assert!(b.mb1 > b.m1 && b.mb2 > b.m2);
    }
}

#[test]
fn chirp_mass_is_preserved() {
    let (m1, m2) = masses_from_chirp(1.188, 0.8);
    let mc = (m1 * m2).powf(0.6) / (m1 + m2).powf(0.2);
    assert!((mc - 1.188).abs() < 1e-10, "mc = {mc}");
    assert!((m2 / m1 - 0.8).abs() < 1e-12);

    let (a1, a2) = masses_from_chirp(1.188, 1.25);
    assert!((a1 - m1).abs() < 1e-12 && (a2 - m2).abs() < 1e-12);
}

#[test]
fn negative_lambdas_are_removed_on_request() {
    let text = "m1 m2 lambda1 lambda2\n1.4 1.3 -10.0 400.0\n1.4 1.3 300.0 400.0\n";
    let samples = parse(text);
    assert_eq!(samples.derive(true).unwrap().len(), 1);
    assert_eq!(samples.derive(false).unwrap().len(), 2);
}

#[test]
fn all_negative_is_an_error() {
    let text = "m1 m2 lambda1 lambda2\n1.4 1.3 -10.0 400.0\n";
    let err = parse(text).derive(true).unwrap_err();
    assert!(matches!(err, Error::EmptySamples), "got {err}");
}

#[test]
fn missing_mass_columns() {
    let err = PosteriorSamples::parse("lambda1 lambda2\n300 400\n", Path::new("x.dat")).unwrap_err();
    assert!(matches!(err, Error::MissingColumn(_)), "got {err}");
}

#[test]
fn ragged_rows_report_the_line() {
    let err = PosteriorSamples::parse("m1 m2\n1.4 1.3\n1.5\n", Path::new("x.dat")).unwrap_err();
    match err {
        Error::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn missing_tidal_columns_fail_on_derive() {
    let samples = parse("m1 m2\n1.4 1.3\n");
    assert!(matches!(samples.derive(false), Err(Error::MissingColumn(_))));
}

#[test]
fn mass_summary_matches_column() {
    let samples = parse("m1 m2 lambda1 lambda2\n1.4 1.2 300 400\n1.6 1.0 300 400\n");
    let summary = samples.mass_summary().unwrap();
    assert!((summary.m1_mean - 1.5).abs() < 1e-12);
    assert!((summary.m1_std - 0.1).abs() < 1e-12);
    assert!((summary.m2_mean - 1.1).abs() < 1e-12);
}

#[test]
fn compactness_decreases_with_deformability() {
    let stiff = calc_compactness(800.0);
    let soft = calc_compactness(200.0);
    assert!(soft > stiff);
    assert!(calc_baryonic_mass(1.35, soft) > calc_baryonic_mass(1.35, stiff));
}

#[test]
fn downsample_is_seeded_and_ordered() {
    let rows: Vec<usize> = (0..100).collect();
    let a = downsample(&rows, 10, 7);
    let b = downsample(&rows, 10, 7);
    assert_eq!(a, b);
    assert_eq!(a.len(), 10);
    assert!(a.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(downsample(&rows, 500, 7).len(), 100);
}

fn columns(cols: &[(&str, &[f64])]) -> HashMap<String, Vec<f64>> {
    cols.iter()
        .map(|(name, values)| (name.to_string(), values.to_vec()))
        .collect()
}

#[test]
fn ragged_columns_are_errors() {
    let table = columns(&[
        ("m1", &[1.4, 1.5]),
        ("m2", &[1.3, 1.2]),
        ("lambda1", &[300.0]),
        ("lambda2", &[400.0]),
    ]);
    let err = PosteriorSamples::from_columns(&table).unwrap_err();
    assert!(
        matches!(err, Error::LengthMismatch { expected: 2, found: 1, .. }),
        "got {err}"
    );
    assert!(err.to_string().contains("lambda1"), "{err}");

    let table = columns(&[
        ("mc", &[1.19, 1.18, 1.2]),
        ("q", &[0.9, 0.8]),
        ("lambdat", &[400.0, 500.0, 600.0]),
    ]);
    let err = PosteriorSamples::from_columns(&table).unwrap_err();
    assert!(
        matches!(err, Error::LengthMismatch { expected: 3, found: 2, .. }),
        "got {err}"
    );
}
