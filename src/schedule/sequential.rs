use crate::{
    config::{Mode, RunConfig},
    effects::pipeline::process_image,
    foundation::error::FxResult,
    records::EffectSpec,
    schedule::{Scheduler, SpecStats},
};

/// No concurrency: identifiers in order, each effect over the whole image in one call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl Scheduler for Sequential {
    fn mode(&self) -> Mode {
        Mode::Sequential
    }

    fn process_spec(&mut self, spec: &EffectSpec, cfg: &RunConfig) -> FxResult<SpecStats> {
        let mut stats = SpecStats::default();
        for id in &cfg.data_dirs {
            let input = spec.input_path(&cfg.input_root, id);
            let output = spec.output_path(&cfg.output_root, id);
            let applied = process_image(&input, &output, &spec.effects)?;
            stats.add_image(applied);
        }
        Ok(stats)
    }
}
