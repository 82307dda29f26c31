use std::{fmt, path::PathBuf, str::FromStr};

use crate::foundation::error::{FxError, FxResult};

/// Which scheduling strategy drives a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One image, one effect, one pass at a time.
    Sequential,
    /// All identifiers of a record are filtered concurrently.
    ParallelByImage,
    /// Each effect is split into row bands filtered concurrently.
    ParallelByRowSlice,
}

impl Mode {
    pub const ALL: [Mode; 3] = [
        Mode::Sequential,
        Mode::ParallelByImage,
        Mode::ParallelByRowSlice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::ParallelByImage => "parallel-by-image",
            Self::ParallelByRowSlice => "parallel-by-row-slice",
        }
    }
}

impl FromStr for Mode {
    type Err = FxError;

    /// Accepts the long names plus the short aliases `s`, `parfiles` and `parslices`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sequential" | "s" => Ok(Self::Sequential),
            "parallel-by-image" | "parfiles" => Ok(Self::ParallelByImage),
            "parallel-by-row-slice" | "parslices" => Ok(Self::ParallelByRowSlice),
            other => Err(FxError::validation(format!(
                "unknown scheduling mode '{other}' (expected sequential, parallel-by-image or parallel-by-row-slice)"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a `+`-joined identifier list, e.g. `small+big`.
pub fn parse_data_dirs(joined: &str) -> FxResult<Vec<String>> {
    let ids = joined
        .split('+')
        .map(str::trim)
        .map(str::to_string)
        .collect::<Vec<_>>();
    if ids.iter().any(String::is_empty) {
        return Err(FxError::validation(format!(
            "data directory list '{joined}' contains an empty identifier"
        )));
    }
    Ok(ids)
}

/// Immutable parameters of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub data_dirs: Vec<String>,
    pub mode: Mode,
    /// Row bands per effect. Only the row-slice strategy reads this.
    pub thread_count: usize,
    pub effects_path: PathBuf,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Treat an undecodable effect record as an error instead of end of input.
    pub strict_records: bool,
}

impl RunConfig {
    pub const DEFAULT_EFFECTS_PATH: &'static str = "../data/effects.txt";
    pub const DEFAULT_INPUT_ROOT: &'static str = "../data/in";
    pub const DEFAULT_OUTPUT_ROOT: &'static str = "../data/out";

    pub fn new(data_dirs: &str, mode: Mode, thread_count: usize) -> FxResult<Self> {
        let cfg = Self {
            data_dirs: parse_data_dirs(data_dirs)?,
            mode,
            thread_count,
            effects_path: PathBuf::from(Self::DEFAULT_EFFECTS_PATH),
            input_root: PathBuf::from(Self::DEFAULT_INPUT_ROOT),
            output_root: PathBuf::from(Self::DEFAULT_OUTPUT_ROOT),
            strict_records: false,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_paths(
        mut self,
        effects_path: impl Into<PathBuf>,
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        self.effects_path = effects_path.into();
        self.input_root = input_root.into();
        self.output_root = output_root.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_strict_records(mut self, strict: bool) -> Self {
        self.strict_records = strict;
        self
    }

    pub fn validate(&self) -> FxResult<()> {
        if self.data_dirs.is_empty() {
            return Err(FxError::validation(
                "at least one data directory is required",
            ));
        }
        if self.data_dirs.iter().any(String::is_empty) {
            return Err(FxError::validation("data directory names must be non-empty"));
        }
        if self.thread_count == 0 {
            return Err(FxError::validation("thread count must be >= 1"));
        }
        Ok(())
    }
}
