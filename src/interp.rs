//! Piecewise-linear interpolation with linear extrapolation past the ends.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
}

/// Validated interpolation table, evaluated many times.
#[derive(Debug, Clone)]
pub struct Interpolator<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
}

impl<'a> Interpolator<'a> {
    pub fn new(xs: &'a [f64], ys: &'a [f64]) -> Result<Self, InterpError> {
        if xs.len() != ys.len() {
            return Err(InterpError::MismatchedLengths);
        }
        if xs.len() < 2 {
            return Err(InterpError::InsufficientData);
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(InterpError::UnsortedData);
        }
        Ok(Self { xs, ys })
    }

    /// Evaluate at `x`; outside the table the first or last segment is extended.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let idx = self
            .xs
            .partition_point(|&xi| xi < x)
            .clamp(1, n - 1);
        let (x1, x2) = (self.xs[idx - 1], self.xs[idx]);
        let (y1, y2) = (self.ys[idx - 1], self.ys[idx]);
        y1 + (x - x1) / (x2 - x1) * (y2 - y1)
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

/// One-shot interpolation with linear extrapolation.
pub fn interp_extrapolate(xs: &[f64], ys: &[f64], x: f64) -> Result<f64, InterpError> {
    Ok(Interpolator::new(xs, ys)?.eval(x))
}
