use log::info;

use crate::config::ModelParameters;
use crate::error::Result;
use crate::model::{calc_peak_mags, KnModel, ModelTable};
use crate::samples::BinaryProperties;

/// Evaluate every model on the same set of binaries.
///
/// Models run one after another; within a model the samples are processed
/// in parallel via Rayon. Peak magnitudes are filled in on return.
pub fn generate_tables(
    models: &[KnModel],
    binaries: &[BinaryProperties],
    params: &ModelParameters,
) -> Result<Vec<ModelTable>> {
    models
        .iter()
        .map(|&model| {
            let mut table = ModelTable::generate(model, binaries, params)?;
            calc_peak_mags(&mut table);
            info!("{model}: computed {} lightcurves", table.len());
            Ok(table)
        })
        .collect()
}
