use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::distance_modulus;
use crate::error::{Error, Result};

/// Modified Julian Date of the Unix epoch.
const MJD_UNIX_EPOCH: f64 = 40587.0;

/// One photometric point. A non-finite `mag_err` marks an upper limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotometryPoint {
    pub t: f64,
    pub mag: f64,
    pub mag_err: f64,
}

impl PhotometryPoint {
    pub fn is_upper_limit(&self) -> bool {
        !self.mag_err.is_finite()
    }
}

/// Observed photometry of one event, grouped by filter name.
#[derive(Debug, Clone, Default)]
pub struct EventPhotometry {
    pub bands: BTreeMap<String, Vec<PhotometryPoint>>,
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.fff]` into MJD.
pub fn isot_to_mjd(s: &str) -> Option<f64> {
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    let utc = dt.and_utc();
    let secs = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;
    Some(secs / 86400.0 + MJD_UNIX_EPOCH)
}

fn parse_time(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().or_else(|| isot_to_mjd(field))
}

impl EventPhotometry {
    /// Read `time filter mag mag_err` lines. Time is MJD or an ISO timestamp.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut bands: BTreeMap<String, Vec<PhotometryPoint>> = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(Error::parse(
                    path,
                    lineno + 1,
                    "expected `time filter mag mag_err`",
                ));
            }
            let t = parse_time(fields[0]).ok_or_else(|| {
                Error::parse(path, lineno + 1, format!("invalid time {:?}", fields[0]))
            })?;
            let number = |s: &str| {
                s.parse::<f64>()
                    .map_err(|_| Error::parse(path, lineno + 1, format!("invalid number {s:?}")))
            };
            let point = PhotometryPoint {
                t,
                mag: number(fields[2])?,
                mag_err: number(fields[3])?,
            };
            bands.entry(fields[1].to_string()).or_default().push(point);
        }
        debug!(
            "loaded {} filters from {}",
            bands.len(),
            path.display()
        );
        Ok(Self { bands })
    }

    /// Shift times to days since `t0` and magnitudes to absolute at `distance_mpc`.
    pub fn to_absolute(&self, t0: f64, distance_mpc: f64) -> Self {
        let dm = distance_modulus(distance_mpc);
        let bands = self
            .bands
            .iter()
            .map(|(name, points)| {
                let shifted = points
                    .iter()
                    .map(|p| PhotometryPoint {
                        t: p.t - t0,
                        mag: p.mag - dm,
                        mag_err: p.mag_err,
                    })
                    .collect();
                (name.clone(), shifted)
            })
            .collect();
        Self { bands }
    }

    /// Points of one filter with NaN magnitudes dropped.
    pub fn band(&self, name: &str) -> Option<Vec<PhotometryPoint>> {
        self.bands
            .get(name)
            .map(|pts| pts.iter().copied().filter(|p| !p.mag.is_nan()).collect())
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.bands.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isot_epoch() {
        let mjd = isot_to_mjd("1970-01-01T00:00:00").unwrap();
        assert!((mjd - 40587.0).abs() < 1e-9);
        let mjd = isot_to_mjd("2017-08-17T12:41:04.400").unwrap();
        assert!((mjd - 57982.52852).abs() < 1e-4, "mjd {mjd}");
    }
}
