use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rasterfx::{BenchOpts, Mode, RunConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rasterfx", version)]
struct Cli {
    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply every effect record to every data directory.
    Run(RunArgs),
    /// Time modes and thread counts over the same inputs.
    Bench(BenchArgs),
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// Effect records (concatenated JSON objects).
    #[arg(long, default_value = RunConfig::DEFAULT_EFFECTS_PATH)]
    effects: PathBuf,

    /// Root holding one input directory per data directory identifier.
    #[arg(long, default_value = RunConfig::DEFAULT_INPUT_ROOT)]
    in_root: PathBuf,

    /// Output directory; files are written as `<id>_<outPath>`.
    #[arg(long, default_value = RunConfig::DEFAULT_OUTPUT_ROOT)]
    out_root: PathBuf,

    /// Fail on an undecodable effect record instead of stopping there.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Data directory identifiers joined with `+`, e.g. `small+big`.
    data_dirs: String,

    /// sequential (s), parallel-by-image (parfiles) or parallel-by-row-slice (parslices).
    #[arg(default_value = "sequential")]
    mode: Mode,

    /// Row bands per effect (row-slice mode only).
    #[arg(default_value_t = 1)]
    threads: usize,

    #[command(flatten)]
    paths: PathArgs,
}

#[derive(Parser, Debug)]
struct BenchArgs {
    /// Data directory identifiers joined with `+`.
    data_dirs: String,

    /// Modes to time.
    #[arg(long, value_delimiter = ',', default_value = "parallel-by-image,parallel-by-row-slice")]
    modes: Vec<Mode>,

    /// Thread counts to time for every mode.
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,6,8,12")]
    threads: Vec<usize>,

    /// Runs per configuration; the fastest is kept.
    #[arg(long, default_value_t = 5)]
    repeats: u32,

    /// Check every run's outputs against a sequential reference.
    #[arg(long)]
    verify: bool,

    /// Write the report as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    #[command(flatten)]
    paths: PathArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Bench(args) => cmd_bench(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_config(
    data_dirs: &str,
    mode: Mode,
    threads: usize,
    paths: PathArgs,
) -> anyhow::Result<RunConfig> {
    let cfg = RunConfig::new(data_dirs, mode, threads)
        .context("invalid run configuration")?
        .with_paths(paths.effects, paths.in_root, paths.out_root)
        .with_strict_records(paths.strict);
    Ok(cfg)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = make_config(&args.data_dirs, args.mode, args.threads, args.paths)?;
    let stats = rasterfx::run(&cfg).with_context(|| format!("{} run failed", cfg.mode))?;

    eprintln!(
        "processed {} record(s), {} image(s), {} effect pass(es)",
        stats.specs, stats.images, stats.effects_applied
    );
    // Wall seconds on stdout for benchmark drivers.
    println!("{:.2}", stats.elapsed.as_secs_f64());
    Ok(())
}

fn cmd_bench(args: BenchArgs) -> anyhow::Result<()> {
    let cfg = make_config(&args.data_dirs, Mode::Sequential, 1, args.paths)?;
    let opts = BenchOpts {
        modes: args.modes,
        thread_counts: args.threads,
        repeats: args.repeats,
        verify: args.verify,
    };

    let report = rasterfx::run_bench(&cfg, &opts).context("bench failed")?;

    eprintln!("{:<24} {:>8} {:>12} {:>8}", "mode", "threads", "fastest(s)", "speedup");
    for e in &report.entries {
        eprintln!(
            "{:<24} {:>8} {:>12.4} {:>8.2}",
            e.mode, e.threads, e.fastest_secs, e.speedup
        );
    }

    if let Some(path) = args.json {
        let f = File::create(&path)
            .with_context(|| format!("create bench report '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &report)
            .with_context(|| "write bench report JSON")?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
