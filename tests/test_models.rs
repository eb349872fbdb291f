use kilonova_lightcurves::ejecta::{diuj2017, kaky2016};
use kilonova_lightcurves::samples::{calc_baryonic_mass, calc_compactness};
use kilonova_lightcurves::{
    generate_tables, BinaryProperties, Band, Ejecta, Error, KnModel, ModelParameters,
};

fn binary(m1: f64, m2: f64, lambda1: f64, lambda2: f64, chi: f64) -> BinaryProperties {
    let c1 = calc_compactness(lambda1);
    let c2 = calc_compactness(lambda2);
    BinaryProperties {
        m1,
        m2,
        chi_eff: chi,
        lambda1,
        lambda2,
        c1,
        c2,
        mb1: calc_baryonic_mass(m1, c1),
        mb2: calc_baryonic_mass(m2, c2),
    }
}

fn short_params() -> ModelParameters {
    ModelParameters {
        tmax: 20.0,
        dt: 0.05,
        ..ModelParameters::default()
    }
}

#[test]
fn bns_ejecta_in_expected_range() {
    let ej = diuj2017(&binary(1.4, 1.3, 300.0, 500.0, 0.0));
    assert!(ej.mej > 1e-3 && ej.mej < 2e-2, "mej = {}", ej.mej);
    assert!(ej.vej > 0.15 && ej.vej < 0.35, "vej = {}", ej.vej);
}

#[test]
fn bhns_ejecta_grows_with_spin() {
    let slow = kaky2016(&binary(5.0, 1.35, 0.0, 500.0, 0.5));
    let fast = kaky2016(&binary(5.0, 1.35, 0.0, 500.0, 0.75));
    assert!(fast.mej > slow.mej, "slow {} fast {}", slow.mej, fast.mej);
    assert!(fast.mej > 0.0 && fast.mej < 0.1, "mej = {}", fast.mej);
    assert!((fast.vej - (1.533e-2 * 5.0 / 1.35 + 0.1907)).abs() < 1e-12);
}

#[test]
fn comparable_masses_leave_no_bhns_ejecta() {
    let ej = kaky2016(&binary(1.4, 1.3, 300.0, 500.0, 0.0));
    assert_eq!(ej.mej, 0.0);
}

#[test]
fn semianalytic_lightcurve_peaks_then_fades() {
    let params = short_params();
    let times = params.model_times().unwrap();
    let lc = KnModel::DiUj2017
        .lightcurve(&Ejecta { mej: 0.01, vej: 0.2 }, &params, &times)
        .unwrap();
    assert_eq!(lc.t.len(), times.len());
    assert!(lc.lbol.iter().all(|&l| l > 0.0 && l.is_finite()));

    let (t_peak, m_peak) = lc.peak(Band::I).unwrap();
    assert!(t_peak < 20.0);
    assert!(m_peak > -20.0 && m_peak < -10.0, "peak i = {m_peak}");
    let last = lc.band(Band::I)[times.len() - 1];
    assert!(last > m_peak);
}

#[test]
fn metzger_lightcurve_is_bright_and_declining() {
    let params = short_params();
    let times = params.model_times().unwrap();
    let lc = KnModel::Me2017
        .lightcurve(&Ejecta { mej: 0.01, vej: 0.2 }, &params, &times)
        .unwrap();
    assert!(lc.lbol.iter().all(|&l| l > 0.0 && l.is_finite()));
    let at = |t: f64| {
        let i = times.iter().position(|&x| x >= t).unwrap();
        lc.lbol[i]
    };
    assert!(at(10.0) < at(1.0), "L(1d) {} L(10d) {}", at(1.0), at(10.0));
    assert!(at(1.0) > 1e39 && at(1.0) < 1e43, "L(1d) = {}", at(1.0));
}

#[test]
fn dark_ejecta_has_no_peak() {
    let params = short_params();
    let times = params.model_times().unwrap();
    let lc = KnModel::KaKy2016
        .lightcurve(&Ejecta { mej: 0.0, vej: 0.2 }, &params, &times)
        .unwrap();
    assert!(lc.peak(Band::G).is_none());
}

#[test]
fn tables_carry_peaks_for_every_row() {
    let binaries = vec![
        binary(1.4, 1.3, 300.0, 500.0, 0.0),
        binary(1.5, 1.2, 250.0, 700.0, 0.0),
    ];
    let tables =
        generate_tables(&[KnModel::DiUj2017, KnModel::Me2017], &binaries, &short_params()).unwrap();
    assert_eq!(tables.len(), 2);
    for table in &tables {
        assert_eq!(table.len(), 2);
        for row in &table.rows {
            let peak = row.peak(Band::I).unwrap();
            assert!(peak.mag.is_finite() && peak.t.is_finite());
        }
    }
    // both models share the BNS ejecta fit
    assert_eq!(tables[0].mej(), tables[1].mej());
}

#[test]
fn grid_models_are_refused() {
    let binaries = vec![binary(1.4, 1.3, 300.0, 500.0, 0.0)];
    let err = generate_tables(&[KnModel::Ka2017], &binaries, &short_params()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedModel(ref m) if m == "Ka2017"), "got {err}");
}

#[test]
fn model_list_parsing() {
    let models = KnModel::parse_list("DiUj2017, Me2017").unwrap();
    assert_eq!(models, vec![KnModel::DiUj2017, KnModel::Me2017]);

    let err = KnModel::parse_list("DiUj2017,Foo2020").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Foo2020") && msg.contains("RoFe2017"), "{msg}");
}
