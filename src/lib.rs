pub mod analysis;
pub mod batch;
pub mod common;
pub mod config;
pub mod ejecta;
pub mod envelope;
pub mod error;
pub mod event;
pub mod interp;
pub mod metzger;
pub mod model;
pub mod plots;
pub mod samples;
pub mod semianalytic;
pub mod stats;
pub mod thermal;

pub use analysis::{run, ModelSummary, RunSummary};
pub use batch::generate_tables;
pub use common::Band;
pub use config::{AnalysisConfig, ModelParameters};
pub use ejecta::Ejecta;
pub use envelope::{Envelope, ResampledModel, TimeGrid};
pub use error::{Error, Result};
pub use event::{EventPhotometry, PhotometryPoint};
pub use model::{calc_peak_mags, KnModel, Lightcurve, ModelTable};
pub use samples::{BinaryProperties, PosteriorSamples};
