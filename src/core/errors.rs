//! DRS-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DrError>;

/// Top-level error type for do-restarting.
///
/// Only configuration problems and inspector failures surface as `DrError`.
/// Per-daemon step failures are folded into outcomes as [`StepFailure`].
#[derive(Debug, Error)]
pub enum DrError {
    #[error("[DRS-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DRS-1003] configuration parse failure in {path}: {details}")]
    ConfigParse { path: PathBuf, details: String },

    #[error("[DRS-1101] invalid process pattern {pattern:?}: {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("[DRS-2001] {program} not found")]
    InspectorMissing { program: String },

    #[error("[DRS-2002] {program} timeout expired after {}s", .timeout.as_secs())]
    InspectorTimeout { program: String, timeout: Duration },

    #[error("[DRS-2003] {program} returned {code}: {stderr}")]
    InspectorFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("[DRS-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DRS-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl DrError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DRS-1001",
            Self::ConfigParse { .. } => "DRS-1003",
            Self::InvalidPattern { .. } => "DRS-1101",
            Self::InspectorMissing { .. } => "DRS-2001",
            Self::InspectorTimeout { .. } => "DRS-2002",
            Self::InspectorFailed { .. } => "DRS-2003",
            Self::Io { .. } => "DRS-3002",
            Self::Runtime { .. } => "DRS-3900",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Why a single subprocess step (hook or restart) did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepFailure {
    /// The program could not be found.
    NotFound { program: String },
    /// The program did not finish within its time budget and was killed.
    Timeout { seconds: u64 },
    /// The program exited unsuccessfully. `code` is `None` when killed by a signal.
    Exit { code: Option<i32> },
    /// Spawning or waiting on the program failed for another reason.
    Spawn { details: String },
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { program } => write!(f, "{program} not found"),
            Self::Timeout { seconds } => write!(f, "timeout expired after {seconds}s"),
            Self::Exit { code: Some(code) } => write!(f, "returned {code}"),
            Self::Exit { code: None } => write!(f, "terminated by signal"),
            Self::Spawn { details } => write!(f, "could not be started: {details}"),
        }
    }
}
