//! rasterfx batch-applies 3x3 convolution filters to RGBA16 images.
//!
//! A run reads a stream of effect records (`inPath`, `outPath`, ordered effect codes) and, for
//! every configured data directory, loads the input, applies the effects in order and saves the
//! result. Three schedulers share the same filter engine:
//!
//! - [`Sequential`]: no concurrency.
//! - [`ParallelByImage`]: the images of one record are filtered concurrently.
//! - [`ParallelByRowSlice`]: each effect is split into row bands filtered concurrently.
//!
//! Every pass reads from the raster's snapshot and writes to its destination; the snapshot is
//! refreshed by [`Raster::commit`] between effects, so row partitioning never changes results.
#![forbid(unsafe_code)]

mod foundation;

pub mod bench;
pub mod config;
pub mod effects;
pub mod raster;
pub mod records;
pub mod run;
pub mod schedule;

pub use bench::{BenchEntry, BenchOpts, BenchReport, run_bench, sha256_hex};
pub use config::{Mode, RunConfig, parse_data_dirs};
pub use effects::convolve::{apply_effect, apply_effect_rows, convolve, grayscale};
pub use effects::kernel::{
    BOX_BLUR, EDGE_DETECT, Effect, EffectOp, Kernel, SHARPEN, clamp_sample, parse_effect_codes,
};
pub use effects::pipeline::{apply_effects, process_image};
pub use foundation::core::{Extent, RowRange, Rgba16, SAMPLE_MAX};
pub use foundation::error::{FxError, FxResult};
pub use raster::{Raster, load_raster, save_raster};
pub use records::{EffectRecord, EffectSpec, EffectSpecStream};
pub use run::{RunStats, run, run_specs};
pub use schedule::{
    ParallelByImage, ParallelByRowSlice, Scheduler, Sequential, SpecStats, create_scheduler,
    partition_rows,
};
