//! Timing sweeps over modes and thread counts, with optional output verification.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use sha2::Digest as _;

use crate::{
    config::{Mode, RunConfig},
    foundation::error::{FxError, FxResult},
    records::{EffectSpec, EffectSpecStream},
    run::run_specs,
};

#[derive(Clone, Debug)]
pub struct BenchOpts {
    pub modes: Vec<Mode>,
    pub thread_counts: Vec<usize>,
    /// Runs per configuration; the fastest one is reported.
    pub repeats: u32,
    /// Hash every output after each run and compare against a sequential reference run.
    pub verify: bool,
}

impl Default for BenchOpts {
    fn default() -> Self {
        Self {
            modes: vec![Mode::ParallelByImage, Mode::ParallelByRowSlice],
            thread_counts: vec![1, 2, 4, 6, 8, 12],
            repeats: 5,
            verify: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BenchEntry {
    pub mode: String,
    pub threads: usize,
    pub fastest_secs: f64,
    /// Fastest time of the first thread count for this mode divided by this fastest time.
    pub speedup: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BenchReport {
    pub data_dirs: Vec<String>,
    pub repeats: u32,
    pub entries: Vec<BenchEntry>,
}

type OutputDigests = BTreeMap<PathBuf, String>;

pub fn run_bench(base: &RunConfig, opts: &BenchOpts) -> FxResult<BenchReport> {
    if opts.repeats == 0 {
        return Err(FxError::validation("bench repeats must be >= 1"));
    }
    if opts.modes.is_empty() || opts.thread_counts.is_empty() {
        return Err(FxError::validation(
            "bench needs at least one mode and one thread count",
        ));
    }

    let specs = EffectSpecStream::open(&base.effects_path, base.strict_records)?
        .collect::<FxResult<Vec<_>>>()?;

    let reference = if opts.verify {
        let cfg = base.clone().with_mode(Mode::Sequential);
        run_specs(&cfg, specs.iter().cloned().map(Ok))?;
        Some(digest_outputs(&cfg, &specs)?)
    } else {
        None
    };

    let mut report = BenchReport {
        data_dirs: base.data_dirs.clone(),
        repeats: opts.repeats,
        entries: Vec::new(),
    };

    for &mode in &opts.modes {
        let mut baseline: Option<Duration> = None;
        for &threads in &opts.thread_counts {
            let cfg = base.clone().with_mode(mode).with_thread_count(threads);
            let mut fastest = Duration::MAX;
            for _ in 0..opts.repeats {
                let stats = run_specs(&cfg, specs.iter().cloned().map(Ok))?;
                fastest = fastest.min(stats.elapsed);
                if let Some(expected) = &reference {
                    verify_outputs(&cfg, &specs, expected)?;
                }
            }

            let base_time = *baseline.get_or_insert(fastest);
            let fastest_secs = fastest.as_secs_f64();
            let speedup = if fastest_secs > 0.0 {
                base_time.as_secs_f64() / fastest_secs
            } else {
                1.0
            };
            tracing::info!(%mode, threads, fastest_secs, speedup, "bench configuration done");
            report.entries.push(BenchEntry {
                mode: mode.to_string(),
                threads,
                fastest_secs,
                speedup,
            });
        }
    }

    Ok(report)
}

fn digest_outputs(cfg: &RunConfig, specs: &[EffectSpec]) -> FxResult<OutputDigests> {
    let mut out = OutputDigests::new();
    for spec in specs {
        for id in &cfg.data_dirs {
            let path = spec.output_path(&cfg.output_root, id);
            let bytes = std::fs::read(&path).map_err(|e| FxError::io(&path, e))?;
            out.insert(path, sha256_hex(&bytes));
        }
    }
    Ok(out)
}

fn verify_outputs(cfg: &RunConfig, specs: &[EffectSpec], expected: &OutputDigests) -> FxResult<()> {
    let actual = digest_outputs(cfg, specs)?;
    for (path, digest) in &actual {
        if expected.get(path) != Some(digest) {
            return Err(FxError::validation(format!(
                "output '{}' differs from the sequential reference (mode {}, threads {})",
                path.display(),
                cfg.mode,
                cfg.thread_count
            )));
        }
    }
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
