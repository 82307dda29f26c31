use std::path::Path;

use crate::{
    effects::{convolve::apply_effect, kernel::Effect},
    foundation::error::FxResult,
    raster::Raster,
};

/// Applies `effects` in order over the full row range, committing after each one so the
/// next effect reads the previous effect's output.
///
/// Returns the number of effects applied.
pub fn apply_effects(raster: &mut Raster, effects: &[Effect]) -> FxResult<u64> {
    let rows = raster.extent().full_rows();
    for &effect in effects {
        apply_effect(raster, effect, rows)?;
        raster.commit();
    }
    Ok(effects.len() as u64)
}

/// Load, filter and save one image end-to-end.
#[tracing::instrument(skip(effects), fields(effect_count = effects.len()))]
pub fn process_image(input: &Path, output: &Path, effects: &[Effect]) -> FxResult<u64> {
    let mut raster = Raster::load(input)?;
    let applied = apply_effects(&mut raster, effects)?;
    raster.save(output)?;
    Ok(applied)
}
