use rayon::prelude::*;

use crate::{
    config::{Mode, RunConfig},
    effects::{convolve::apply_effect_rows, kernel::Effect},
    foundation::{core::RowRange, error::FxResult},
    raster::Raster,
    records::EffectSpec,
    schedule::{Scheduler, SpecStats, build_thread_pool, first_error, partition::partition_rows},
};

/// Identifiers one at a time; every effect is split into `bands` row bands that run
/// concurrently, with a barrier and a commit before the next effect.
pub struct ParallelByRowSlice {
    pool: rayon::ThreadPool,
    bands: usize,
}

impl ParallelByRowSlice {
    pub fn new(bands: usize) -> FxResult<Self> {
        Ok(Self {
            pool: build_thread_pool(bands, "band")?,
            bands,
        })
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Applies every effect to `raster`, band-parallel, committing between effects.
    pub fn apply_effects(&self, raster: &mut Raster, effects: &[Effect]) -> FxResult<u64> {
        let bands = partition_rows(raster.extent().height, self.bands)?
            .into_iter()
            .filter(|b| !b.is_empty())
            .collect::<Vec<RowRange>>();

        for &effect in effects {
            self.apply_one(raster, effect, &bands)?;
            raster.commit();
        }
        Ok(effects.len() as u64)
    }

    fn apply_one(&self, raster: &mut Raster, effect: Effect, bands: &[RowRange]) -> FxResult<()> {
        let extent = raster.extent();
        let (source, views) = raster.band_views(bands)?;
        tracing::debug!(effect = %effect, bands = views.len(), "row-slice pass");

        let results = self.pool.install(|| {
            views
                .into_par_iter()
                .map(|(rows, out)| apply_effect_rows(effect, extent, source, rows, out))
                .collect::<Vec<_>>()
        });
        first_error(results)?;
        Ok(())
    }
}

impl Scheduler for ParallelByRowSlice {
    fn mode(&self) -> Mode {
        Mode::ParallelByRowSlice
    }

    fn process_spec(&mut self, spec: &EffectSpec, cfg: &RunConfig) -> FxResult<SpecStats> {
        let mut stats = SpecStats::default();
        for id in &cfg.data_dirs {
            let input = spec.input_path(&cfg.input_root, id);
            let output = spec.output_path(&cfg.output_root, id);

            let mut raster = Raster::load(&input)?;
            let applied = self.apply_effects(&mut raster, &spec.effects)?;
            raster.save(&output)?;
            stats.add_image(applied);
        }
        Ok(stats)
    }
}
