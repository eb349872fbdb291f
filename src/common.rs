use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Physical constants (CGS)
// ---------------------------------------------------------------------------

pub const MSUN_CGS: f64 = 1.989e33;
pub const C_CGS: f64 = 2.998e10;
pub const SECS_PER_DAY: f64 = 86400.0;
pub const SIGMA_SB: f64 = 5.670374e-5;
pub const PARSEC_CGS: f64 = 3.0857e18;

// ---------------------------------------------------------------------------
// Photometric bands
// ---------------------------------------------------------------------------

/// Photometric band of the model magnitudes, in blue-to-red order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    U,
    G,
    R,
    I,
    Z,
    Y,
    J,
    H,
    K,
}

impl Band {
    pub const ALL: [Band; 9] = [
        Band::U,
        Band::G,
        Band::R,
        Band::I,
        Band::Z,
        Band::Y,
        Band::J,
        Band::H,
        Band::K,
    ];

    /// Bands shown in the per-band panels and written as envelope tables.
    pub const PANELS: [Band; 8] = [
        Band::G,
        Band::R,
        Band::I,
        Band::Z,
        Band::Y,
        Band::J,
        Band::H,
        Band::K,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Band::U => "u",
            Band::G => "g",
            Band::R => "r",
            Band::I => "i",
            Band::Z => "z",
            Band::Y => "y",
            Band::J => "J",
            Band::H => "H",
            Band::K => "K",
        }
    }

    /// Row of this band in a model magnitude array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Band> {
        Band::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Effective wavelength in Å.
    pub fn wavelength_angstrom(self) -> f64 {
        match self {
            Band::U => 3540.0,
            Band::G => 4770.0,
            Band::R => 6231.0,
            Band::I => 7625.0,
            Band::Z => 9134.0,
            Band::Y => 9633.0,
            Band::J => 12350.0,
            Band::H => 16620.0,
            Band::K => 21590.0,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Photometry helpers
// ---------------------------------------------------------------------------

/// Distance modulus for a distance in Mpc: 5 * (log10(d_pc) - 1).
pub fn distance_modulus(distance_mpc: f64) -> f64 {
    5.0 * ((distance_mpc * 1e6).log10() - 1.0)
}

// ---------------------------------------------------------------------------
// Math utilities
// ---------------------------------------------------------------------------

pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Quantile `q` in [0, 1], linear between order statistics.
pub fn quantile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(values[lo] + frac * (values[hi] - values[lo]))
}

pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Convert NaN/Inf to None for JSON safety.
pub fn finite_or_none(v: f64) -> Option<f64> {
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_order_matches_index() {
        for (i, band) in Band::ALL.iter().enumerate() {
            assert_eq!(band.index(), i);
            assert_eq!(Band::from_name(band.name()), Some(*band));
        }
    }

    #[test]
    fn quantile_interpolates() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&mut v, 0.0), Some(1.0));
        assert_eq!(quantile(&mut v, 1.0), Some(4.0));
        assert!((quantile(&mut v, 0.5).unwrap() - 2.5).abs() < 1e-12);
    }
}
