//! Operation lock.
//!
//! Serializes the "mutate tree + persist journal" region across processes by
//! holding an exclusive advisory lock (fs2) on a sidecar file next to the
//! journal: `<journal file name>.lock`.
//!
//! Notes:
//! - Acquisition never blocks; a held lock is reported as `DirswapError::Busy`.
//! - The lock is released when the guard drops. The lock file itself is left
//!   in place; removing it while another process has it open would let two
//!   holders lock different inodes.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::{DirswapError, DirswapResult};
use crate::fs_ops::helpers::io_error_with_help;

/// RAII guard held while a relocation runs.
#[derive(Debug)]
pub struct OperationLock {
    file: File,
    path: PathBuf,
}

impl OperationLock {
    /// Take the lock guarding `journal_path`, creating the lock file if needed.
    pub fn acquire(journal_path: &Path) -> DirswapResult<Self> {
        let path = lock_path_for(journal_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error_with_help("create lock directory", parent))?;
        }

        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let file = opts
            .open(&path)
            .map_err(io_error_with_help("open lock file", &path))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                trace!(path = %path.display(), "operation lock acquired");
                Ok(Self { file, path })
            }
            Err(e) if is_contended(&e) => {
                debug!(path = %path.display(), "operation lock is held elsewhere");
                Err(DirswapError::Busy(path))
            }
            Err(e) => Err(io_error_with_help("lock", &path)(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        trace!(path = %self.path.display(), "operation lock released");
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || (e.raw_os_error().is_some()
            && e.raw_os_error() == fs2::lock_contended_error().raw_os_error())
}

/// `<dir>/<journal name>.lock`
pub fn lock_path_for(journal_path: &Path) -> PathBuf {
    let mut name: OsString = journal_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("dirswap"));
    name.push(".lock");
    journal_path.with_file_name(name)
}
