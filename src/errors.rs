//! Typed error definitions for dirswap.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirswapError {
    /// No journal on disk, or a journal holding zero records.
    #[error("Nothing to undo: no move journal at {0}")]
    MissingJournal(PathBuf),

    #[error("Move journal {path} is corrupt: {reason}")]
    CorruptJournal { path: PathBuf, reason: String },

    #[error("Move journal {path} has unsupported format version {version}")]
    UnsupportedJournalVersion { path: PathBuf, version: u16 },

    #[error("Source root does not exist or is not a directory: {0}")]
    SourceMissing(PathBuf),

    #[error("Another relocation is in progress (lock held on {0})")]
    Busy(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl DirswapError {
    /// Stable numeric code for structured logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            DirswapError::MissingJournal(_) => 10,
            DirswapError::CorruptJournal { .. } => 11,
            DirswapError::UnsupportedJournalVersion { .. } => 12,
            DirswapError::SourceMissing(_) => 20,
            DirswapError::Busy(_) => 30,
            DirswapError::Interrupted => 130,
            DirswapError::Io { .. } => 74,
        }
    }

    /// Build an `Io` variant from a context string.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        DirswapError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type DirswapResult<T> = Result<T, DirswapError>;
