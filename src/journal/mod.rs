//! Persisted move journal (undo log).
//!
//! The journal is a last-write-wins snapshot of the most recent forward
//! relocation: `write` replaces the whole file, `read` returns the stored
//! records (or `None` when there is nothing to undo), `clear` writes an empty
//! journal. Writes go through a temp sibling and an atomic rename.

pub mod format;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{DirswapError, DirswapResult};
use crate::platform::write_file_atomic_0600;

pub use format::FormatError;

/// One top-level entry moved as a unit from `original` to `relocated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    original: PathBuf,
    relocated: PathBuf,
}

impl MoveRecord {
    /// Build a record; both paths must be valid UTF-8 so they round-trip exactly.
    pub fn try_new(original: &Path, relocated: &Path) -> Option<Self> {
        original.to_str()?;
        relocated.to_str()?;
        Some(Self {
            original: original.to_path_buf(),
            relocated: relocated.to_path_buf(),
        })
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn relocated(&self) -> &Path {
        &self.relocated
    }
}

/// Handle to the journal file at a fixed location.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the journal contents with `records`.
    pub fn write(&self, records: &[MoveRecord]) -> DirswapResult<()> {
        let pairs = records
            .iter()
            .map(|r| Ok((path_str(&r.original)?, path_str(&r.relocated)?)))
            .collect::<DirswapResult<Vec<_>>>()?;
        let bytes = format::encode(pairs).map_err(|e| {
            DirswapError::io(
                format!("encode journal '{}'", self.path.display()),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        write_file_atomic_0600(&self.path, &bytes).map_err(|e| {
            DirswapError::io(format!("write journal '{}'", self.path.display()), e)
        })?;
        info!(path = %self.path.display(), records = records.len(), "journal written");
        Ok(())
    }

    /// Stored records, or `None` if no journal exists or it holds zero records.
    pub fn read(&self) -> DirswapResult<Option<Vec<MoveRecord>>> {
        let data = match fs::read(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no journal file");
                return Ok(None);
            }
            Err(e) => {
                return Err(DirswapError::io(
                    format!("read journal '{}'", self.path.display()),
                    e,
                ));
            }
        };

        let pairs = match format::decode(&data) {
            Ok(p) => p,
            Err(FormatError::UnsupportedVersion(version)) => {
                return Err(DirswapError::UnsupportedJournalVersion {
                    path: self.path.clone(),
                    version,
                });
            }
            Err(e) => {
                return Err(DirswapError::CorruptJournal {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if pairs.is_empty() {
            debug!(path = %self.path.display(), "journal is empty");
            return Ok(None);
        }
        Ok(Some(
            pairs
                .into_iter()
                .map(|(o, r)| MoveRecord {
                    original: PathBuf::from(o),
                    relocated: PathBuf::from(r),
                })
                .collect(),
        ))
    }

    /// Persist an empty journal.
    pub fn clear(&self) -> DirswapResult<()> {
        self.write(&[])
    }
}

fn path_str(p: &Path) -> DirswapResult<&str> {
    p.to_str().ok_or_else(|| {
        DirswapError::io(
            format!("journal path '{}'", p.display()),
            io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        )
    })
}
