use std::path::PathBuf;

use thiserror::Error;

use crate::interp::InterpError;

/// Errors produced while reading inputs, evaluating models or writing outputs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("missing column {0} in posterior samples")]
    MissingColumn(String),
    #[error("unknown model {0}; model must be one of: {models}", models = crate::model::KnModel::valid_names())]
    UnknownModel(String),
    #[error("model {0} needs tabulated radiative-transfer grids and cannot be evaluated")]
    UnsupportedModel(String),
    #[error("{what}: expected {expected} values, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("distance must be positive and finite, got {0} Mpc")]
    InvalidDistance(f64),
    #[error("no posterior samples left to analyse")]
    EmptySamples,
    #[error("invalid time grid: tini={tini}, tmax={tmax}, dt={dt}")]
    InvalidGrid { tini: f64, tmax: f64, dt: f64 },
    #[error(transparent)]
    Interp(#[from] InterpError),
    #[error("plotting failed: {0}")]
    Plot(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
