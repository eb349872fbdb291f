use serde::{Deserialize, Serialize};

use crate::common::{finite_or_none, linspace, quantile};

/// Value used for empty histogram bins so they stay visible on log axes.
pub const EMPTY_BIN_DENSITY: f64 = 1e-3;

/// Probability density of `samples` on `n_edges` evenly spaced bin edges.
///
/// Edges span `bounds`, or the finite sample range when `bounds` is None.
/// The last bin is closed on the right; samples outside the edges and
/// non-finite samples are ignored. Returns `(bin_centers, density)` with
/// empty bins set to `EMPTY_BIN_DENSITY`.
pub fn histogram_density(
    samples: &[f64],
    n_edges: usize,
    bounds: Option<(f64, f64)>,
) -> (Vec<f64>, Vec<f64>) {
    if n_edges < 2 {
        return (Vec::new(), Vec::new());
    }
    let (lo, hi) = match bounds {
        Some(b) => b,
        None => {
            let finite = samples.iter().copied().filter(|v| v.is_finite());
            let lo = finite.clone().fold(f64::INFINITY, f64::min);
            let hi = finite.fold(f64::NEG_INFINITY, f64::max);
            if !lo.is_finite() {
                (0.0, 1.0)
            } else if lo == hi {
                (lo - 0.5, hi + 0.5)
            } else {
                (lo, hi)
            }
        }
    };

    let edges = linspace(lo, hi, n_edges);
    let n_bins = n_edges - 1;
    let width = (hi - lo) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for &x in samples {
        if !x.is_finite() || x < lo || x > hi {
            continue;
        }
        let idx = (((x - lo) / width) as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    let total: usize = counts.iter().sum();
    let density = counts
        .iter()
        .map(|&c| {
            if c == 0 {
                EMPTY_BIN_DENSITY
            } else {
                c as f64 / (total as f64 * width)
            }
        })
        .collect();
    let centers = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    (centers, density)
}

/// 5th, 50th and 95th percentiles of the finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    pub p05: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
}

impl Quantiles {
    pub fn of(values: &[f64]) -> Self {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let mut q = |p: f64| quantile(&mut finite, p).and_then(finite_or_none);
        Self {
            p05: q(0.05),
            p50: q(0.5),
            p95: q(0.95),
        }
    }
}
