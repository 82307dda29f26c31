//! Scheduling strategies: how the work of one effect record is spread over threads.
//!
//! Every strategy processes records one at a time and returns from
//! [`Scheduler::process_spec`] only after all of that record's images are saved. Parallel
//! strategies run on a bounded rayon pool built once per run; `pool.install` returning is the
//! barrier between units of work.

mod by_image;
mod partition;
mod row_slice;
mod sequential;

pub use by_image::ParallelByImage;
pub use partition::partition_rows;
pub use row_slice::ParallelByRowSlice;
pub use sequential::Sequential;

use crate::{
    config::{Mode, RunConfig},
    foundation::error::{FxError, FxResult},
    records::EffectSpec,
};

/// Work done for one effect record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpecStats {
    pub images: u64,
    pub effects_applied: u64,
}

impl SpecStats {
    pub(crate) fn add_image(&mut self, effects_applied: u64) {
        self.images += 1;
        self.effects_applied += effects_applied;
    }
}

pub trait Scheduler: Send {
    fn mode(&self) -> Mode;

    /// Filters the image named by `spec` for every data directory in `cfg`.
    fn process_spec(&mut self, spec: &EffectSpec, cfg: &RunConfig) -> FxResult<SpecStats>;
}

pub fn create_scheduler(cfg: &RunConfig) -> FxResult<Box<dyn Scheduler>> {
    cfg.validate()?;
    let scheduler: Box<dyn Scheduler> = match cfg.mode {
        Mode::Sequential => Box::new(Sequential),
        Mode::ParallelByImage => Box::new(ParallelByImage::new(cfg.data_dirs.len())?),
        Mode::ParallelByRowSlice => Box::new(ParallelByRowSlice::new(cfg.thread_count)?),
    };
    Ok(scheduler)
}

pub(crate) fn build_thread_pool(
    threads: usize,
    label: &'static str,
) -> FxResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(FxError::validation(format!(
            "{label} pool needs at least one worker thread"
        )));
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("rasterfx-{label}-{i}"))
        .build()
        .map_err(|e| FxError::validation(format!("failed to build rayon thread pool: {e}")))
}

/// Returns the first error in submission order, after every task has finished.
pub(crate) fn first_error<T>(results: Vec<FxResult<T>>) -> FxResult<Vec<T>> {
    results.into_iter().collect()
}
