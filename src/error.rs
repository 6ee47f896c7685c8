//! Error types for payload execution.
//!
//! [`ParseWarning`]s are recovered where they happen and only recorded;
//! [`RunError`]s abort the whole run.

use crate::sink::SinkError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A condition that ends the current run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A script imports itself, directly or through other scripts.
    #[error("import cycle: '{}' is already being executed", .path.display())]
    Cycle { path: PathBuf },

    /// The import chain is deeper than allowed.
    #[error("import depth limit of {max_depth} exceeded by '{}'", .path.display())]
    RecursionLimit { path: PathBuf, max_depth: usize },

    /// A script file is missing or unreadable.
    #[error("cannot read script '{}': {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The injection sink rejected a primitive.
    #[error("injection failed: {0}")]
    Injection(#[from] SinkError),

    /// Cancellation was requested between commands.
    #[error("run cancelled")]
    Cancelled,
}

impl RunError {
    pub(crate) fn resource(path: &Path, source: io::Error) -> Self {
        RunError::Resource {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A recoverable problem with one line. Execution continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("unsupported character {0:?} skipped")]
    UnsupportedChar(char),

    #[error("{keyword}: {reason}")]
    InvalidArgument {
        keyword: &'static str,
        reason: String,
    },

    #[error("REPEAT with no previous command")]
    NothingToRepeat,

    #[error("REPEAT 0 does nothing")]
    ZeroRepeat,
}

impl ParseWarning {
    pub(crate) fn invalid(keyword: &'static str, reason: impl Into<String>) -> Self {
        ParseWarning::InvalidArgument {
            keyword,
            reason: reason.into(),
        }
    }
}

/// A message reported back to the caller of a run, tied to the line that
/// produced it when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: Option<PathBuf>,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: Option<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self {
            path,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}: {}", path.display(), self.line, self.message),
            None => f.write_str(&self.message),
        }
    }
}
