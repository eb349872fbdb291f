mod synthetic;

use std::path::Path;

use kilonova_lightcurves::{
    run, AnalysisConfig, Band, Error, KnModel, ModelParameters, RunSummary, TimeGrid,
};

fn config(root: &Path, models: Vec<KnModel>, do_event: bool) -> AnalysisConfig {
    let data = root.join("data");
    let lightcurves = root.join("lightcurves");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::create_dir_all(&lightcurves).unwrap();
    let posterior = data.join("G298048.dat");
    std::fs::write(&posterior, synthetic::posterior_components(12, 5, true)).unwrap();
    std::fs::write(
        lightcurves.join("G298048_PS1_GROND_SOFI.dat"),
        synthetic::event_photometry(),
    )
    .unwrap();

    let params = ModelParameters {
        tmax: 15.0,
        dt: 0.05,
        ..ModelParameters::default()
    };
    AnalysisConfig {
        output_dir: root.join("output"),
        plot_dir: root.join("plots"),
        posterior_samples: posterior,
        lightcurves_dir: lightcurves,
        models,
        name: "G298048".to_string(),
        do_event,
        event: "G298048_PS1_GROND_SOFI".to_string(),
        distance: 40.0,
        t0: 57982.5285236896,
        grid: TimeGrid::new(params.tini, params.tmax, 0.1).unwrap(),
        params,
        remove_negative_lambda: true,
        downsample: Some(8),
        seed: 42,
    }
}

#[test]
fn full_run_writes_figures_and_tables() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), vec![KnModel::DiUj2017, KnModel::Me2017], true);
    let summary = run(&cfg).unwrap();

    assert_eq!(summary.n_samples, 8);
    assert_eq!(summary.models.len(), 2);
    let plot_dir = dir.path().join("plots/DiUj2017_Me2017/event/G298048");
    assert_eq!(summary.plot_dir, plot_dir);

    for name in [
        "mag.svg",
        "peaki.svg",
        "mag_panels.svg",
        "gminusi.svg",
        "Lbol.svg",
        "mej.svg",
        "vej.svg",
        "masses.svg",
    ] {
        let path = plot_dir.join(name);
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert!(text.contains("<svg"), "{name} is not an SVG");
    }

    for model in ["DiUj2017", "Me2017"] {
        for band in Band::PANELS {
            assert!(plot_dir.join(format!("dat/{model}_{band}.dat")).exists());
        }
        assert!(plot_dir.join(format!("dat/{model}_Lbol.dat")).exists());

        let samples = dir
            .path()
            .join(format!("output/DiUj2017_Me2017/G298048/{model}_samples.dat"));
        let text = std::fs::read_to_string(samples).unwrap();
        assert_eq!(text.lines().count(), 1 + 8);
    }
}

#[test]
fn summary_json_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), vec![KnModel::DiUj2017], false);
    let summary = run(&cfg).unwrap();

    let path = cfg.table_dir().join("summary.json");
    let back: RunSummary = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(back.models.len(), 1);

    let model = &back.models[0];
    assert_eq!(model.model, "DiUj2017");
    assert_eq!(model.rows, 8);
    assert_eq!(model.accepted + model.rejected, model.rows);
    let (lo, mid, hi) = (
        model.mej.p05.unwrap(),
        model.mej.p50.unwrap(),
        model.mej.p95.unwrap(),
    );
    assert!(lo <= mid && mid <= hi);
    assert_eq!(summary.models[0].mej.p50, model.mej.p50);

    let masses = back.masses.unwrap();
    assert!(masses.m1_mean >= masses.m2_mean);
}

#[test]
fn missing_event_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), vec![KnModel::DiUj2017], true);
    cfg.event = "does_not_exist".to_string();
    let err = run(&cfg).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "got {err}");
}

#[test]
fn unsupported_model_fails_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), vec![KnModel::DiUj2017, KnModel::WoKo2017], false);
    let err = run(&cfg).unwrap_err();
    assert!(matches!(err, Error::UnsupportedModel(_)), "got {err}");
    assert!(!cfg.event_plot_dir().exists());
}

#[test]
fn nonpositive_distance_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for distance in [0.0, -5.0, f64::NAN] {
        let mut cfg = config(dir.path(), vec![KnModel::DiUj2017], false);
        cfg.distance = distance;
        let err = run(&cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidDistance(_)), "got {err}");
    }
    assert!(!dir.path().join("plots").exists());
}
