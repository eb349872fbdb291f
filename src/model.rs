use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::Band;
use crate::config::ModelParameters;
use crate::ejecta::{self, Ejecta};
use crate::error::{Error, Result};
use crate::metzger::metzger_lightcurve;
use crate::samples::BinaryProperties;
use crate::semianalytic::semianalytic_lightcurve;
use crate::thermal::band_magnitudes;

// ---------------------------------------------------------------------------
// Model names
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnModel {
    DiUj2017,
    KaKy2016,
    Me2017,
    SmCh2017,
    WoKo2017,
    BaKa2016,
    Ka2017,
    RoFe2017,
}

impl KnModel {
    pub const ALL: [KnModel; 8] = [
        KnModel::DiUj2017,
        KnModel::KaKy2016,
        KnModel::Me2017,
        KnModel::SmCh2017,
        KnModel::WoKo2017,
        KnModel::BaKa2016,
        KnModel::Ka2017,
        KnModel::RoFe2017,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KnModel::DiUj2017 => "DiUj2017",
            KnModel::KaKy2016 => "KaKy2016",
            KnModel::Me2017 => "Me2017",
            KnModel::SmCh2017 => "SmCh2017",
            KnModel::WoKo2017 => "WoKo2017",
            KnModel::BaKa2016 => "BaKa2016",
            KnModel::Ka2017 => "Ka2017",
            KnModel::RoFe2017 => "RoFe2017",
        }
    }

    /// Comma-separated list of every accepted model name.
    pub fn valid_names() -> String {
        KnModel::ALL.map(|m| m.name()).join(",")
    }

    /// Citation used in plot legends.
    pub fn legend(self) -> &'static str {
        match self {
            KnModel::DiUj2017 => "Dietrich and Ujevic (2017)",
            KnModel::KaKy2016 => "Kawaguchi et al. (2016)",
            KnModel::Me2017 => "Metzger (2017)",
            KnModel::SmCh2017 => "Smartt et al. (2017)",
            KnModel::WoKo2017 => "Wollaeger et al. (2017)",
            KnModel::BaKa2016 => "Barnes et al. (2016)",
            KnModel::Ka2017 => "Kasen (2017)",
            KnModel::RoFe2017 => "Rosswog et al. (2017)",
        }
    }

    /// Parse a comma-separated model list such as `"DiUj2017,Me2017"`.
    pub fn parse_list(list: &str) -> Result<Vec<KnModel>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(KnModel::from_str)
            .collect()
    }

    /// Whether ejecta and lightcurves can be computed in-crate.
    pub fn is_supported(self) -> bool {
        matches!(self, KnModel::DiUj2017 | KnModel::KaKy2016 | KnModel::Me2017)
    }

    pub fn ejecta(self, binary: &BinaryProperties) -> Result<Ejecta> {
        match self {
            KnModel::DiUj2017 | KnModel::Me2017 => Ok(ejecta::diuj2017(binary)),
            KnModel::KaKy2016 => Ok(ejecta::kaky2016(binary)),
            _ => Err(Error::UnsupportedModel(self.name().to_string())),
        }
    }

    pub fn lightcurve(
        self,
        ejecta: &Ejecta,
        params: &ModelParameters,
        times: &[f64],
    ) -> Result<Lightcurve> {
        match self {
            KnModel::DiUj2017 | KnModel::KaKy2016 => {
                Ok(semianalytic_lightcurve(ejecta, params, times))
            }
            KnModel::Me2017 => Ok(metzger_lightcurve(ejecta, params, times)),
            _ => Err(Error::UnsupportedModel(self.name().to_string())),
        }
    }
}

impl std::fmt::Display for KnModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KnModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KnModel::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Lightcurves
// ---------------------------------------------------------------------------

/// Model output: times [days], bolometric luminosity [erg/s] and absolute
/// AB magnitudes with one row per band in `Band::ALL` order.
#[derive(Debug, Clone)]
pub struct Lightcurve {
    pub t: Vec<f64>,
    pub lbol: Vec<f64>,
    pub mag: Array2<f64>,
}

impl Lightcurve {
    /// No emission at any time.
    pub fn dark(times: &[f64]) -> Self {
        Self {
            t: times.to_vec(),
            lbol: vec![0.0; times.len()],
            mag: Array2::from_elem((Band::ALL.len(), times.len()), f64::NAN),
        }
    }

    /// Blackbody magnitudes for a luminosity history and photospheric radii [cm].
    pub fn from_luminosity(times: &[f64], lbol: Vec<f64>, radii: &[f64], t_floor: f64) -> Self {
        let mut mag = Array2::from_elem((Band::ALL.len(), times.len()), f64::NAN);
        for (j, (&l, &r)) in lbol.iter().zip(radii).enumerate() {
            for (b, m) in band_magnitudes(l, r, t_floor).into_iter().enumerate() {
                mag[[b, j]] = m;
            }
        }
        Self {
            t: times.to_vec(),
            lbol,
            mag,
        }
    }

    pub fn band(&self, band: Band) -> ArrayView1<'_, f64> {
        self.mag.row(band.index())
    }

    /// Time and magnitude of the brightest finite point in `band`.
    pub fn peak(&self, band: Band) -> Option<(f64, f64)> {
        self.band(band)
            .iter()
            .zip(&self.t)
            .filter(|(m, _)| m.is_finite())
            .min_by(|a, b| a.0.total_cmp(b.0))
            .map(|(&m, &t)| (t, m))
    }
}

// ---------------------------------------------------------------------------
// Model tables
// ---------------------------------------------------------------------------

/// Peak time [days] and peak magnitude in one band, NaN when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakMag {
    pub t: f64,
    pub mag: f64,
}

#[derive(Debug, Clone)]
pub struct ModelRow {
    pub binary: BinaryProperties,
    pub ejecta: Ejecta,
    pub lightcurve: Lightcurve,
    /// Filled by `calc_peak_mags`, indexed like `Band::ALL`.
    pub peaks: Option<[PeakMag; 9]>,
}

impl ModelRow {
    pub fn peak(&self, band: Band) -> Option<PeakMag> {
        self.peaks.map(|p| p[band.index()])
    }
}

/// Ejecta and lightcurve of one model for every posterior sample.
#[derive(Debug, Clone)]
pub struct ModelTable {
    pub model: KnModel,
    pub rows: Vec<ModelRow>,
}

impl ModelTable {
    /// Evaluate `model` for every binary, in parallel over samples.
    pub fn generate(
        model: KnModel,
        binaries: &[BinaryProperties],
        params: &ModelParameters,
    ) -> Result<Self> {
        if !model.is_supported() {
            return Err(Error::UnsupportedModel(model.name().to_string()));
        }
        let times = params.model_times()?;
        let rows = binaries
            .par_iter()
            .map(|binary| -> Result<ModelRow> {
                let ejecta = model.ejecta(binary)?;
                let lightcurve = model.lightcurve(&ejecta, params, &times)?;
                Ok(ModelRow {
                    binary: *binary,
                    ejecta,
                    lightcurve,
                    peaks: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { model, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn mej(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ejecta.mej).collect()
    }

    pub fn vej(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ejecta.vej).collect()
    }

    pub fn m1(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.binary.m1).collect()
    }

    pub fn m2(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.binary.m2).collect()
    }
}

/// Fill the per-band peak time and magnitude of every row.
pub fn calc_peak_mags(table: &mut ModelTable) {
    for row in &mut table.rows {
        let mut peaks = [PeakMag {
            t: f64::NAN,
            mag: f64::NAN,
        }; 9];
        for band in Band::ALL {
            if let Some((t, mag)) = row.lightcurve.peak(band) {
                peaks[band.index()] = PeakMag { t, mag };
            }
        }
        row.peaks = Some(peaks);
    }
}
