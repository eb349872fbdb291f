//! Resampling of per-sample model lightcurves onto a common time grid and
//! min / median / max envelopes across samples.

use std::fmt::Write as _;
use std::path::Path;

use log::{debug, warn};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::common::{median, Band};
use crate::error::{Error, Result};
use crate::interp::Interpolator;
use crate::model::{KnModel, Lightcurve, ModelTable};

// ---------------------------------------------------------------------------
// Time grid
// ---------------------------------------------------------------------------

/// Evenly spaced times from `tini` to `tmax` inclusive [days].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub tini: f64,
    pub tmax: f64,
    pub dt: f64,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            tini: 0.1,
            tmax: 50.0,
            dt: 0.1,
        }
    }
}

impl TimeGrid {
    pub fn new(tini: f64, tmax: f64, dt: f64) -> Result<Self> {
        let valid = tini.is_finite() && tmax.is_finite() && dt.is_finite() && dt > 0.0 && tmax >= tini;
        if !valid {
            return Err(Error::InvalidGrid { tini, tmax, dt });
        }
        Ok(Self { tini, tmax, dt })
    }

    pub fn n_points(&self) -> usize {
        ((self.tmax - self.tini) / self.dt).round() as usize + 1
    }

    pub fn points(&self) -> Vec<f64> {
        (0..self.n_points())
            .map(|i| self.tini + i as f64 * self.dt)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resampling
// ---------------------------------------------------------------------------

/// Why a sample's lightcurve was left out of the envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoLuminosity,
    MissingBand(Band),
}

/// Lightcurves of one model on the common grid; one matrix row per
/// accepted sample.
#[derive(Debug, Clone)]
pub struct ResampledModel {
    pub model: KnModel,
    pub times: Vec<f64>,
    /// Indexed like `Band::ALL`.
    pub mags: Vec<Array2<f64>>,
    pub lbol: Array2<f64>,
    /// Indices into the model table of the accepted rows.
    pub accepted: Vec<usize>,
    pub n_rejected: usize,
}

struct ResampledRow {
    mags: Vec<Vec<f64>>,
    lbol: Vec<f64>,
}

fn finite_points(t: &[f64], values: impl Iterator<Item = f64>) -> (Vec<f64>, Vec<f64>) {
    t.iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(&t, v)| (t, v))
        .unzip()
}

fn resample_row(lc: &Lightcurve, grid: &[f64]) -> std::result::Result<ResampledRow, Rejection> {
    if lc.lbol.iter().sum::<f64>() == 0.0 {
        return Err(Rejection::NoLuminosity);
    }

    let mut mags = Vec::with_capacity(Band::ALL.len());
    for band in Band::ALL {
        let (t, m) = finite_points(&lc.t, lc.band(band).iter().copied());
        let interp = Interpolator::new(&t, &m).map_err(|_| Rejection::MissingBand(band))?;
        mags.push(interp.eval_many(grid));
    }

    let (t, log_l) = finite_points(
        &lc.t,
        lc.lbol
            .iter()
            .map(|&l| if l > 0.0 { l.log10() } else { f64::NAN }),
    );
    let interp = Interpolator::new(&t, &log_l).map_err(|_| Rejection::NoLuminosity)?;
    let lbol = interp
        .eval_many(grid)
        .into_iter()
        .map(|x| 10f64.powf(x))
        .collect();

    Ok(ResampledRow { mags, lbol })
}

fn stack(rows: &[Vec<f64>], n_cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), n_cols), |(i, j)| rows[i][j])
}

impl ResampledModel {
    /// Interpolate every usable row of `table` onto `grid`.
    ///
    /// Rows without luminosity, or with a band lacking two finite
    /// magnitudes, are skipped.
    pub fn from_table(table: &ModelTable, grid: &TimeGrid) -> Self {
        let times = grid.points();
        let mut band_rows: Vec<Vec<Vec<f64>>> = vec![Vec::new(); Band::ALL.len()];
        let mut lbol_rows = Vec::new();
        let mut accepted = Vec::new();
        let mut n_rejected = 0usize;

        for (idx, row) in table.rows.iter().enumerate() {
            match resample_row(&row.lightcurve, &times) {
                Ok(r) => {
                    for (dst, src) in band_rows.iter_mut().zip(r.mags) {
                        dst.push(src);
                    }
                    lbol_rows.push(r.lbol);
                    accepted.push(idx);
                }
                Err(reason) => {
                    debug!("{}: skipping sample {idx}: {reason:?}", table.model);
                    n_rejected += 1;
                }
            }
        }

        if accepted.is_empty() && !table.rows.is_empty() {
            warn!("{}: no usable lightcurves", table.model);
        }

        let n_cols = times.len();
        Self {
            model: table.model,
            mags: band_rows.iter().map(|rows| stack(rows, n_cols)).collect(),
            lbol: stack(&lbol_rows, n_cols),
            times,
            accepted,
            n_rejected,
        }
    }

    pub fn n_accepted(&self) -> usize {
        self.accepted.len()
    }

    pub fn band(&self, band: Band) -> &Array2<f64> {
        &self.mags[band.index()]
    }

    pub fn band_envelope(&self, band: Band) -> Envelope {
        Envelope::from_rows(self.band(band))
    }

    /// Envelope of the per-sample colour `b1 - b2`.
    pub fn color_envelope(&self, b1: Band, b2: Band) -> Envelope {
        Envelope::from_rows(&(self.band(b1) - self.band(b2)))
    }

    pub fn lbol_envelope(&self) -> Envelope {
        Envelope::from_rows(&self.lbol)
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Column-wise statistics over samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min: Vec<f64>,
    pub median: Vec<f64>,
    pub max: Vec<f64>,
}

impl Envelope {
    /// NaN everywhere when `rows` has no rows.
    pub fn from_rows(rows: &Array2<f64>) -> Self {
        let n_cols = rows.ncols();
        let mut env = Self {
            min: Vec::with_capacity(n_cols),
            median: Vec::with_capacity(n_cols),
            max: Vec::with_capacity(n_cols),
        };
        for col in rows.axis_iter(Axis(1)) {
            let mut values = col.to_vec();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let med = median(&mut values);
            match med {
                Some(med) => {
                    env.min.push(min);
                    env.median.push(med);
                    env.max.push(max);
                }
                None => {
                    env.min.push(f64::NAN);
                    env.median.push(f64::NAN);
                    env.max.push(f64::NAN);
                }
            }
        }
        env
    }

    pub fn len(&self) -> usize {
        self.median.len()
    }

    pub fn is_empty(&self) -> bool {
        self.median.is_empty()
    }
}

/// Write `t [days] min median max` rows with five decimals.
pub fn write_envelope_dat(path: impl AsRef<Path>, times: &[f64], env: &Envelope) -> Result<()> {
    let path = path.as_ref();
    if times.len() != env.len() || env.min.len() != env.len() || env.max.len() != env.len() {
        return Err(Error::LengthMismatch {
            what: format!("envelope for {}", path.display()),
            expected: times.len(),
            found: env.len().min(env.min.len()).min(env.max.len()),
        });
    }
    let mut out = String::from("t [days] min median max\n");
    for (((t, lo), mid), hi) in times.iter().zip(&env.min).zip(&env.median).zip(&env.max) {
        let _ = writeln!(out, "{t:.5} {lo:.5} {mid:.5} {hi:.5}");
    }
    std::fs::write(path, out).map_err(|e| Error::io(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_500_points() {
        let grid = TimeGrid::default();
        let pts = grid.points();
        assert_eq!(pts.len(), 500);
        assert!((pts[0] - 0.1).abs() < 1e-12);
        assert!((pts[499] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        assert!(TimeGrid::new(0.1, 50.0, 0.0).is_err());
        assert!(TimeGrid::new(5.0, 1.0, 0.1).is_err());
        assert!(TimeGrid::new(f64::NAN, 1.0, 0.1).is_err());
    }

    #[test]
    fn envelope_of_three_rows() {
        let rows = ndarray::arr2(&[[1.0, 5.0], [3.0, 4.0], [2.0, 6.0]]);
        let env = Envelope::from_rows(&rows);
        assert_eq!(env.min, vec![1.0, 4.0]);
        assert_eq!(env.median, vec![2.0, 5.0]);
        assert_eq!(env.max, vec![3.0, 6.0]);
    }

    #[test]
    fn empty_envelope_is_nan() {
        let rows = Array2::<f64>::zeros((0, 3));
        let env = Envelope::from_rows(&rows);
        assert_eq!(env.len(), 3);
        assert!(env.median.iter().all(|v| v.is_nan()));
    }
}
