use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::envelope::TimeGrid;
use crate::error::{Error, Result};
use crate::model::KnModel;

/// Physical and numerical inputs shared by every kilonova model.
///
/// Any subset can be overridden from a JSON file; missing keys keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// First model time [days]
    pub tini: f64,
    /// Last model time [days]
    pub tmax: f64,
    /// Model time step [days]
    pub dt: f64,
    /// Minimum ejecta velocity [c]
    pub vmin: f64,
    /// Polar half-opening angle of the ejecta [rad]
    pub th: f64,
    /// Azimuthal half-extent of the ejecta [rad]
    pub ph: f64,
    /// Grey opacity [cm^2/g]
    pub kappa: f64,
    /// Heating rate normalisation at one day [erg/g/s]
    pub eps: f64,
    /// Heating rate power-law index
    pub alp: f64,
    /// Thermalisation efficiency
    pub eth: f64,
    /// Include the energy released by the receding diffusion front
    pub flgbct: bool,
    /// Mass-velocity power-law index of the multi-shell model
    pub beta: f64,
    /// Opacity of lanthanide-bearing material [cm^2/g]
    pub kappa_r: f64,
    /// Electron fraction
    #[serde(rename = "Ye")]
    pub ye: f64,
    /// Photospheric temperature floor [K]
    pub t_floor: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            tini: 0.1,
            tmax: 50.0,
            dt: 0.01,
            vmin: 0.02,
            th: 0.2,
            ph: 3.14,
            kappa: 1.0,
            eps: 1.58e10,
            alp: 1.2,
            eth: 0.5,
            flgbct: true,
            beta: 3.0,
            kappa_r: 1.0,
            ye: 0.3,
            t_floor: 2500.0,
        }
    }
}

impl ModelParameters {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Times at which the models are evaluated.
    pub fn model_times(&self) -> Result<Vec<f64>> {
        TimeGrid::new(self.tini, self.tmax, self.dt).map(|g| g.points())
    }
}

/// Everything one analysis run needs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub output_dir: PathBuf,
    pub plot_dir: PathBuf,
    pub posterior_samples: PathBuf,
    pub lightcurves_dir: PathBuf,
    pub models: Vec<KnModel>,
    pub name: String,
    pub do_event: bool,
    pub event: String,
    /// Luminosity distance [Mpc]
    pub distance: f64,
    /// Merger time [MJD]
    pub t0: f64,
    pub params: ModelParameters,
    /// Common grid the per-sample lightcurves are resampled onto.
    pub grid: TimeGrid,
    pub remove_negative_lambda: bool,
    pub downsample: Option<usize>,
    pub seed: u64,
}

impl AnalysisConfig {
    /// Joined model names, used to namespace output directories.
    pub fn models_tag(&self) -> String {
        self.models
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// `<plot_dir>/<models>/event/<name>`
    pub fn event_plot_dir(&self) -> PathBuf {
        self.plot_dir
            .join(self.models_tag())
            .join("event")
            .join(&self.name)
    }

    /// `<output_dir>/<models>/<name>`
    pub fn table_dir(&self) -> PathBuf {
        self.output_dir.join(self.models_tag()).join(&self.name)
    }

    pub fn event_file(&self) -> PathBuf {
        self.lightcurves_dir.join(format!("{}.dat", self.event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: ModelParameters = serde_json::from_str(r#"{"kappa_r": 10.0, "Ye": 0.1}"#).unwrap();
        assert_eq!(p.kappa_r, 10.0);
        assert_eq!(p.ye, 0.1);
        assert_eq!(p.eps, 1.58e10);
        assert!(p.flgbct);
    }
}
