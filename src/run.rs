use std::time::{Duration, Instant};

use crate::{
    config::RunConfig,
    foundation::error::FxResult,
    records::{EffectSpec, EffectSpecStream},
    schedule::create_scheduler,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub specs: u64,
    pub images: u64,
    pub effects_applied: u64,
    pub elapsed: Duration,
}

/// Reads `cfg.effects_path` and processes every record with the configured strategy.
///
/// The first failing load, save, or effect resolution stops the run and is returned.
/// Images already written stay on disk.
pub fn run(cfg: &RunConfig) -> FxResult<RunStats> {
    cfg.validate()?;
    let mut specs = EffectSpecStream::open(&cfg.effects_path, cfg.strict_records)?;
    let stats = run_specs(cfg, specs.by_ref())?;
    tracing::debug!(decoded = specs.decoded(), "effect source drained");
    Ok(stats)
}

/// Processes records from any source, one record at a time.
#[tracing::instrument(
    skip_all,
    fields(mode = %cfg.mode, dirs = cfg.data_dirs.len(), threads = cfg.thread_count)
)]
pub fn run_specs<I>(cfg: &RunConfig, specs: I) -> FxResult<RunStats>
where
    I: IntoIterator<Item = FxResult<EffectSpec>>,
{
    let started = Instant::now();
    let mut scheduler = create_scheduler(cfg)?;
    let mut stats = RunStats::default();

    tracing::info!(data_dirs = ?cfg.data_dirs, "run started");
    for spec in specs {
        let spec = spec?;
        tracing::debug!(
            in_path = %spec.in_path,
            out_path = %spec.out_path,
            effects = spec.effects.len(),
            "processing effect record"
        );
        let done = scheduler.process_spec(&spec, cfg)?;
        stats.specs += 1;
        stats.images += done.images;
        stats.effects_applied += done.effects_applied;
    }

    stats.elapsed = started.elapsed();
    tracing::info!(
        specs = stats.specs,
        images = stats.images,
        effects = stats.effects_applied,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "run finished"
    );
    Ok(stats)
}
