use rayon::prelude::*;

use crate::{
    config::{Mode, RunConfig},
    effects::pipeline::process_image,
    foundation::error::FxResult,
    records::EffectSpec,
    schedule::{Scheduler, SpecStats, build_thread_pool, first_error},
};

/// One task per data directory; the record's images are filtered concurrently and the
/// next record starts only after all of them are saved.
pub struct ParallelByImage {
    pool: rayon::ThreadPool,
}

impl ParallelByImage {
    /// `workers` is normally the number of data directories.
    pub fn new(workers: usize) -> FxResult<Self> {
        Ok(Self {
            pool: build_thread_pool(workers, "image")?,
        })
    }
}

impl Scheduler for ParallelByImage {
    fn mode(&self) -> Mode {
        Mode::ParallelByImage
    }

    fn process_spec(&mut self, spec: &EffectSpec, cfg: &RunConfig) -> FxResult<SpecStats> {
        let results = self.pool.install(|| {
            cfg.data_dirs
                .par_iter()
                .map(|id| {
                    let input = spec.input_path(&cfg.input_root, id);
                    let output = spec.output_path(&cfg.output_root, id);
                    process_image(&input, &output, &spec.effects)
                })
                .collect::<Vec<_>>()
        });

        let mut stats = SpecStats::default();
        for applied in first_error(results)? {
            stats.add_image(applied);
        }
        Ok(stats)
    }
}
