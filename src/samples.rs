use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::common::mean_std;
use crate::error::{Error, Result};

/// Column aliases accepted for each quantity, first match wins.
const M1_COLUMNS: &[&str] = &["m1", "mass_1", "m1_source"];
const M2_COLUMNS: &[&str] = &["m2", "mass_2", "m2_source"];
const MC_COLUMNS: &[&str] = &["mc", "mchirp", "chirp_mass"];
const Q_COLUMNS: &[&str] = &["q", "mass_ratio"];
const LAMBDA1_COLUMNS: &[&str] = &["lambda1", "lambda_1"];
const LAMBDA2_COLUMNS: &[&str] = &["lambda2", "lambda_2"];
const LAMBDAT_COLUMNS: &[&str] = &["lambdat", "lambda_tilde"];
const DLAMBDAT_COLUMNS: &[&str] = &["dlambdat", "delta_lambda_tilde"];
const CHI_COLUMNS: &[&str] = &["chi_eff", "chi", "a1"];

/// Tidal information carried by a posterior row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TidalInput {
    Components { lambda1: f64, lambda2: f64 },
    Tilde { lambdat: f64, dlambdat: f64 },
    Missing,
}

/// One posterior draw, with component masses ordered so that `m1 >= m2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosteriorSample {
    pub m1: f64,
    pub m2: f64,
    pub chi_eff: f64,
    pub tidal: TidalInput,
}

/// Binary parameters after tidal deformability, compactness and baryonic
/// mass have been derived for both components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryProperties {
    pub m1: f64,
    pub m2: f64,
    pub chi_eff: f64,
    pub lambda1: f64,
    pub lambda2: f64,
    pub c1: f64,
    pub c2: f64,
    pub mb1: f64,
    pub mb2: f64,
}

/// Mean and standard deviation of the component masses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassSummary {
    pub m1_mean: f64,
    pub m1_std: f64,
    pub m2_mean: f64,
    pub m2_std: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PosteriorSamples {
    pub samples: Vec<PosteriorSample>,
}

fn column<'a>(table: &'a HashMap<String, Vec<f64>>, aliases: &[&str]) -> Option<&'a [f64]> {
    aliases
        .iter()
        .find_map(|name| table.get(*name).map(|v| v.as_slice()))
}

fn check_length(name: &str, col: &[f64], expected: usize) -> Result<()> {
    if col.len() != expected {
        return Err(Error::LengthMismatch {
            what: format!("column {name}"),
            expected,
            found: col.len(),
        });
    }
    Ok(())
}

/// Component masses from chirp mass and mass ratio (`q = m2/m1`, inverted if > 1).
pub fn masses_from_chirp(mc: f64, q: f64) -> (f64, f64) {
    let q = if q > 1.0 { 1.0 / q } else { q };
    let m1 = mc * (1.0 + q).powf(0.2) * q.powf(-0.6);
    (m1, q * m1)
}

impl PosteriorSamples {
    /// Read a whitespace-separated posterior table with a header line.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (lineno, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(names) = header.as_ref() else {
                let names: Vec<String> = trimmed
                    .trim_start_matches('#')
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                columns = vec![Vec::new(); names.len()];
                header = Some(names);
                continue;
            };
            if trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != names.len() {
                return Err(Error::parse(
                    path,
                    lineno + 1,
                    format!("expected {} columns, found {}", names.len(), fields.len()),
                ));
            }
            for (col, field) in columns.iter_mut().zip(fields) {
                let value: f64 = field.parse().map_err(|_| {
                    Error::parse(path, lineno + 1, format!("invalid number {field:?}"))
                })?;
                col.push(value);
            }
        }

        let names = header.ok_or(Error::EmptySamples)?;
        let table: HashMap<String, Vec<f64>> = names.into_iter().zip(columns).collect();
        Self::from_columns(&table)
    }

    /// Build samples from named columns, resolving aliases.
    pub fn from_columns(table: &HashMap<String, Vec<f64>>) -> Result<Self> {
        let (m1s, m2s): (Vec<f64>, Vec<f64>) =
            match (column(table, M1_COLUMNS), column(table, M2_COLUMNS)) {
                (Some(m1), Some(m2)) => (m1.to_vec(), m2.to_vec()),
                _ => match (column(table, MC_COLUMNS), column(table, Q_COLUMNS)) {
                    (Some(mc), Some(q)) => {
                        check_length("q", q, mc.len())?;
                        mc.iter()
                            .zip(q)
                            .map(|(&mc, &q)| masses_from_chirp(mc, q))
                            .unzip()
                    }
                    _ => return Err(Error::MissingColumn("m1/m2 or mc/q".to_string())),
                },
            };

        if m1s.is_empty() {
            return Err(Error::EmptySamples);
        }

        let lambda1 = column(table, LAMBDA1_COLUMNS);
        let lambda2 = column(table, LAMBDA2_COLUMNS);
        let lambdat = column(table, LAMBDAT_COLUMNS);
        let dlambdat = column(table, DLAMBDAT_COLUMNS);
        let chi = column(table, CHI_COLUMNS);

        let n = m1s.len();
        check_length("m2", &m2s, n)?;
        for (name, col) in [
            ("lambda1", lambda1),
            ("lambda2", lambda2),
            ("lambdat", lambdat),
            ("dlambdat", dlambdat),
            ("chi_eff", chi),
        ] {
            if let Some(col) = col {
                check_length(name, col, n)?;
            }
        }

        let samples = (0..n)
            .map(|i| {
                let swap = m2s[i] > m1s[i];
                let (m1, m2) = if swap { (m2s[i], m1s[i]) } else { (m1s[i], m2s[i]) };
                let tidal = match (lambda1, lambda2, lambdat, dlambdat) {
                    (Some(l1), Some(l2), _, _) => {
                        let (lambda1, lambda2) = if swap { (l2[i], l1[i]) } else { (l1[i], l2[i]) };
                        TidalInput::Components { lambda1, lambda2 }
                    }
                    (_, _, Some(lt), Some(dlt)) => TidalInput::Tilde {
                        lambdat: lt[i],
                        // dlambdat is antisymmetric under exchange of the bodies
                        dlambdat: if swap { -dlt[i] } else { dlt[i] },
                    },
                    _ => TidalInput::Missing,
                };
                PosteriorSample {
                    m1,
                    m2,
                    chi_eff: chi.map_or(0.0, |c| c[i]),
                    tidal,
                }
            })
            .collect();

        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mass_summary(&self) -> Option<MassSummary> {
        let m1: Vec<f64> = self.samples.iter().map(|s| s.m1).collect();
        let m2: Vec<f64> = self.samples.iter().map(|s| s.m2).collect();
        let (m1_mean, m1_std) = mean_std(&m1)?;
        let (m2_mean, m2_std) = mean_std(&m2)?;
        Some(MassSummary {
            m1_mean,
            m1_std,
            m2_mean,
            m2_std,
        })
    }

    /// Derive tidal deformabilities, compactnesses and baryonic masses.
    ///
    /// With `remove_negative_lambda`, rows where either deformability is
    /// negative are dropped.
    pub fn derive(&self, remove_negative_lambda: bool) -> Result<Vec<BinaryProperties>> {
        let mut out = Vec::with_capacity(self.samples.len());
        let mut n_negative = 0usize;
        for sample in &self.samples {
            let (lambda1, lambda2) = calc_tidal_lambda(sample)?;
            if remove_negative_lambda && (lambda1 < 0.0 || lambda2 < 0.0) {
                n_negative += 1;
                continue;
            }
            let c1 = calc_compactness(lambda1);
            let c2 = calc_compactness(lambda2);
            out.push(BinaryProperties {
                m1: sample.m1,
                m2: sample.m2,
                chi_eff: sample.chi_eff,
                lambda1,
                lambda2,
                c1,
                c2,
                mb1: calc_baryonic_mass(sample.m1, c1),
                mb2: calc_baryonic_mass(sample.m2, c2),
            });
        }
        if n_negative > 0 {
            info!("removed {n_negative} samples with negative tidal deformability");
        }
        if out.is_empty() {
            return Err(Error::EmptySamples);
        }
        debug!("derived binary properties for {} samples", out.len());
        Ok(out)
    }
}

/// Component tidal deformabilities, either read directly or solved from
/// (Λ̃, δΛ̃) and the symmetric mass ratio.
pub fn calc_tidal_lambda(sample: &PosteriorSample) -> Result<(f64, f64)> {
    match sample.tidal {
        TidalInput::Components { lambda1, lambda2 } => Ok((lambda1, lambda2)),
        TidalInput::Tilde { lambdat, dlambdat } => {
            let eta = symmetric_mass_ratio(sample.m1, sample.m2);
            Ok(lambdas_from_tilde(lambdat, dlambdat, eta))
        }
        TidalInput::Missing => Err(Error::MissingColumn(
            "lambda1/lambda2 or lambdat/dlambdat".to_string(),
        )),
    }
}

pub fn symmetric_mass_ratio(m1: f64, m2: f64) -> f64 {
    m1 * m2 / (m1 + m2).powi(2)
}

/// Invert the linear relation between (λ1, λ2) and (Λ̃, δΛ̃).
pub fn lambdas_from_tilde(lambdat: f64, dlambdat: f64, eta: f64) -> (f64, f64) {
    let root = (1.0 - 4.0 * eta).max(0.0).sqrt();
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;

    // lambdat  = a * (λ1 + λ2) + b * (λ1 - λ2)
    // dlambdat = c * (λ1 + λ2) + d * (λ1 - λ2)
    let a = 8.0 / 13.0 * (1.0 + 7.0 * eta - 31.0 * eta2);
    let b = 8.0 / 13.0 * root * (1.0 + 9.0 * eta - 11.0 * eta2);
    let c = 0.5 * root * (1.0 - 13272.0 / 1319.0 * eta + 8944.0 / 1319.0 * eta2);
    let d = 0.5
        * (1.0 - 15910.0 / 1319.0 * eta + 32850.0 / 1319.0 * eta2 + 3380.0 / 1319.0 * eta3);

    let det = a * d - b * c;
    if det.abs() < 1e-300 {
        warn!("degenerate tidal system at eta={eta}");
        return (f64::NAN, f64::NAN);
    }
    let sum = (d * lambdat - b * dlambdat) / det;
    let diff = (a * dlambdat - c * lambdat) / det;
    ((sum + diff) / 2.0, (sum - diff) / 2.0)
}

/// Compactness from tidal deformability (quasi-universal relation).
pub fn calc_compactness(lambda: f64) -> f64 {
    let ln_l = lambda.ln();
    0.371 - 0.0391 * ln_l + 0.001056 * ln_l * ln_l
}

/// Baryonic mass from gravitational mass and compactness.
pub fn calc_baryonic_mass(mass: f64, compactness: f64) -> f64 {
    mass * (1.0 + 0.8857853174243745 * compactness.powf(1.2082383572002926))
}

/// Random subset of `n` rows without replacement; returns everything when
/// `n >= len`.
pub fn downsample<T: Clone>(rows: &[T], n: usize, seed: u64) -> Vec<T> {
    if n >= rows.len() {
        return rows.to_vec();
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut idx = sample(&mut rng, rows.len(), n).into_vec();
    idx.sort_unstable();
    idx.into_iter().map(|i| rows[i].clone()).collect()
}
