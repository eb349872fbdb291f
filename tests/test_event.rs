mod synthetic;

use std::path::Path;

use kilonova_lightcurves::common::distance_modulus;
use kilonova_lightcurves::{Error, EventPhotometry};

fn load() -> EventPhotometry {
    EventPhotometry::parse(&synthetic::event_photometry(), Path::new("event.dat")).unwrap()
}

#[test]
fn groups_points_by_filter() {
    let data = load();
    assert_eq!(data.bands.len(), 3);
    assert_eq!(data.band("g").unwrap().len(), 3);
    assert_eq!(data.band("i").unwrap().len(), 3);
    assert!(data.has_band("K"));
    assert!(data.band("z").is_none());
}

#[test]
fn iso_times_become_mjd() {
    let data = load();
    let i = data.band("i").unwrap();
    assert!((i[1].t - 57984.5).abs() < 1e-9, "t = {}", i[1].t);
}

#[test]
fn infinite_error_marks_upper_limit() {
    let g = load().band("g").unwrap();
    assert!(!g[0].is_upper_limit());
    assert!(g[2].is_upper_limit());
}

#[test]
fn absolute_frame() {
    let t0 = 57982.5285236896;
    let data = load().to_absolute(t0, 40.0);
    let g = data.band("g").unwrap();
    let dm = distance_modulus(40.0);
    assert!((dm - 33.0103).abs() < 1e-3, "dm = {dm}");
    assert!((g[0].t - (57983.0 - t0)).abs() < 1e-9);
    assert!((g[0].mag - (17.40 - dm)).abs() < 1e-9);
    assert_eq!(g[0].mag_err, 0.05);
}

#[test]
fn nan_magnitudes_are_dropped() {
    let text = "57983.0 r nan 0.1\n57984.0 r 18.0 0.1\n";
    let data = EventPhotometry::parse(text, Path::new("x.dat")).unwrap();
    assert_eq!(data.bands["r"].len(), 2);
    assert_eq!(data.band("r").unwrap().len(), 1);
}

#[test]
fn malformed_lines_are_errors() {
    let err = EventPhotometry::parse("57983.0 r 18.0\n", Path::new("x.dat")).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 1, .. }), "got {err}");

    let err = EventPhotometry::parse("yesterday r 18.0 0.1\n", Path::new("x.dat")).unwrap_err();
    assert!(err.to_string().contains("yesterday"), "{err}");
}

#[test]
fn missing_file_is_io_error() {
    let err = EventPhotometry::load("/nonexistent/event.dat").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
