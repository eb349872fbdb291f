//! End-to-end event analysis: posterior samples in, figures and tables out.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::batch::generate_tables;
use crate::common::Band;
use crate::config::AnalysisConfig;
use crate::envelope::{write_envelope_dat, ResampledModel};
use crate::error::{Error, Result};
use crate::event::EventPhotometry;
use crate::model::ModelTable;
use crate::plots::{self, DensityAxes, DensityCurve};
use crate::samples::{downsample, MassSummary, PosteriorSamples};
use crate::stats::{Quantiles, EMPTY_BIN_DENSITY};

/// Per-model figures of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub rows: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub mej: Quantiles,
    pub vej: Quantiles,
    pub peak_i_time: Quantiles,
    pub peak_i_mag: Quantiles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub models: Vec<ModelSummary>,
    pub n_samples: usize,
    pub masses: Option<MassSummary>,
    pub plot_dir: PathBuf,
    pub table_dir: PathBuf,
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Run the whole pipeline described by `config`.
pub fn run(config: &AnalysisConfig) -> Result<RunSummary> {
    if !(config.distance.is_finite() && config.distance > 0.0) {
        return Err(Error::InvalidDistance(config.distance));
    }
    if let Some(model) = config.models.iter().find(|m| !m.is_supported()) {
        return Err(Error::UnsupportedModel(model.name().to_string()));
    }

    let samples = PosteriorSamples::read(&config.posterior_samples)?;
    if samples.is_empty() {
        return Err(Error::EmptySamples);
    }
    let masses = samples.mass_summary();
    if let Some(m) = &masses {
        info!("m1: {:.5} +-{:.5}", m.m1_mean, m.m1_std);
        info!("m2: {:.5} +-{:.5}", m.m2_mean, m.m2_std);
    }

    let mut binaries = samples.derive(config.remove_negative_lambda)?;
    if let Some(n) = config.downsample {
        binaries = downsample(&binaries, n, config.seed);
        info!("downsampled to {} samples", binaries.len());
    }
    if binaries.is_empty() {
        return Err(Error::EmptySamples);
    }

    let tables = generate_tables(&config.models, &binaries, &config.params)?;

    let plot_dir = config.event_plot_dir();
    let dat_dir = plot_dir.join("dat");
    create_dir(&dat_dir)?;

    let resampled: Vec<ResampledModel> = tables
        .iter()
        .map(|t| {
            let r = ResampledModel::from_table(t, &config.grid);
            info!(
                "{}: {} lightcurves kept, {} skipped",
                r.model,
                r.n_accepted(),
                r.n_rejected
            );
            r
        })
        .collect();

    let event = if config.do_event {
        let path = config.event_file();
        let data = EventPhotometry::load(&path)?;
        info!("loaded event photometry from {}", path.display());
        Some(data.to_absolute(config.t0, config.distance))
    } else {
        None
    };

    write_figures(&plot_dir, &tables, &resampled, event.as_ref(), config.distance)?;
    write_envelopes(&dat_dir, &resampled)?;
    info!("wrote envelope tables to {}", dat_dir.display());

    let table_dir = config.table_dir();
    create_dir(&table_dir)?;
    for table in &tables {
        write_samples_dat(&table_dir.join(format!("{}_samples.dat", table.model)), table)?;
    }

    let summary = RunSummary {
        name: config.name.clone(),
        models: tables
            .iter()
            .zip(&resampled)
            .map(|(t, r)| summarize(t, r))
            .collect(),
        n_samples: binaries.len(),
        masses,
        plot_dir,
        table_dir: table_dir.clone(),
    };
    let summary_path = table_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&summary_path, json).map_err(|e| Error::io(&summary_path, e))?;
    info!("wrote {}", summary_path.display());

    Ok(summary)
}

fn summarize(table: &ModelTable, resampled: &ResampledModel) -> ModelSummary {
    let (peak_t, peak_mag): (Vec<f64>, Vec<f64>) = table
        .rows
        .iter()
        .filter_map(|r| r.peak(Band::I))
        .map(|p| (p.t, p.mag))
        .unzip();
    ModelSummary {
        model: table.model.to_string(),
        rows: table.len(),
        accepted: resampled.n_accepted(),
        rejected: resampled.n_rejected,
        mej: Quantiles::of(&table.mej()),
        vej: Quantiles::of(&table.vej()),
        peak_i_time: Quantiles::of(&peak_t),
        peak_i_mag: Quantiles::of(&peak_mag),
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

const DENSITY_RANGE: (f64, f64) = (EMPTY_BIN_DENSITY * 0.5, 100.0);

fn write_figures(
    plot_dir: &Path,
    tables: &[ModelTable],
    resampled: &[ResampledModel],
    event: Option<&EventPhotometry>,
    distance: f64,
) -> Result<()> {
    plots::plot_all_lightcurves(&plot_dir.join("mag.svg"), resampled)?;
    plots::plot_peak_i(&plot_dir.join("peaki.svg"), tables, distance)?;
    plots::plot_mag_panels(&plot_dir.join("mag_panels.svg"), resampled, event, distance)?;
    plots::plot_color(&plot_dir.join("gminusi.svg"), resampled, Band::G, Band::I)?;
    plots::plot_lbol(&plot_dir.join("Lbol.svg"), resampled)?;

    let colors = plots::spread_colors(tables.len());
    let per_model = |values: fn(&ModelTable) -> Vec<f64>| -> Vec<DensityCurve> {
        tables
            .iter()
            .zip(&colors)
            .map(|(t, &color)| DensityCurve {
                label: Some(t.model.legend().to_string()),
                color,
                samples: values(t),
                dashed: false,
            })
            .collect()
    };

    plots::plot_densities(
        &plot_dir.join("mej.svg"),
        &per_model(|t: &ModelTable| t.mej().into_iter().map(f64::log10).collect()),
        &DensityAxes {
            x_desc: "log10 (Ejecta Mass)",
            bounds: (-3.0, -1.0),
            y_range: DENSITY_RANGE,
        },
    )?;
    plots::plot_densities(
        &plot_dir.join("vej.svg"),
        &per_model(ModelTable::vej),
        &DensityAxes {
            x_desc: "Ejecta Velocity [c]",
            bounds: (0.0, 1.0),
            y_range: DENSITY_RANGE,
        },
    )?;

    let mut masses = per_model(ModelTable::m1);
    masses.extend(tables.iter().zip(&colors).map(|(t, &color)| DensityCurve {
        label: None,
        color,
        samples: t.m2(),
        dashed: true,
    }));
    plots::plot_densities(
        &plot_dir.join("masses.svg"),
        &masses,
        &DensityAxes {
            x_desc: "Masses [Msun]",
            bounds: (0.0, 2.0),
            y_range: DENSITY_RANGE,
        },
    )?;

    info!("wrote figures to {}", plot_dir.display());
    Ok(())
}

fn write_envelopes(dat_dir: &Path, resampled: &[ResampledModel]) -> Result<()> {
    for model in resampled {
        for band in Band::PANELS {
            write_envelope_dat(
                dat_dir.join(format!("{}_{}.dat", model.model, band)),
                &model.times,
                &model.band_envelope(band),
            )?;
        }
        write_envelope_dat(
            dat_dir.join(format!("{}_Lbol.dat", model.model)),
            &model.times,
            &model.lbol_envelope(),
        )?;
    }
    Ok(())
}

/// One line per sample: binary, ejecta and i-band peak.
pub fn write_samples_dat(path: &Path, table: &ModelTable) -> Result<()> {
    let mut out =
        String::from("m1 m2 chi_eff lambda1 lambda2 c1 c2 mb1 mb2 mej vej peak_t_i peak_mag_i\n");
    for row in &table.rows {
        let b = &row.binary;
        let peak = row.peak(Band::I);
        let _ = writeln!(
            out,
            "{:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5} {:.5e} {:.5} {:.5} {:.5}",
            b.m1,
            b.m2,
            b.chi_eff,
            b.lambda1,
            b.lambda2,
            b.c1,
            b.c2,
            b.mb1,
            b.mb2,
            row.ejecta.mej,
            row.ejecta.vej,
            peak.map_or(f64::NAN, |p| p.t),
            peak.map_or(f64::NAN, |p| p.mag),
        );
    }
    std::fs::write(path, out).map_err(|e| Error::io(path, e))?;
    info!("wrote {}", path.display());
    Ok(())
}
