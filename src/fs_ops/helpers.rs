//! I/O helper utilities.
//!
//! Provides small adapters to enrich io::Error with actionable context/hints.
//!
//! Usage:
//!   // per-entry failures that are logged, not propagated
//!   warn!("{}", describe_io("remove source file", path, &e));
//!
//!   // in functions returning DirswapResult<_>
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create target root", dir))?;

use std::io;
use std::path::Path;

use crate::errors::DirswapError;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" (permission denied; check ownership and write permissions)");
                }
                libc::EXDEV => {
                    msg.push_str(" (cross-filesystem; rename not possible)");
                }
                libc::EBUSY => {
                    msg.push_str(" (resource busy; ensure no other process is using it)");
                }
                libc::ENOENT => {
                    msg.push_str(" (path not found; it may have been removed concurrently)");
                }
                libc::ENOTEMPTY => {
                    msg.push_str(" (directory not empty; some entries were left behind)");
                }
                libc::ENOSPC => {
                    msg.push_str(" (insufficient space on device)");
                }
                libc::EROFS => {
                    msg.push_str(" (read-only filesystem)");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" (filename or path too long)");
                }
                libc::EMFILE | libc::ENFILE => {
                    msg.push_str(" (too many open files)");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" (access denied; check permissions)"),
                17 => msg.push_str(" (not same device; cross-filesystem move)"),
                32 => msg.push_str(" (sharing violation; file is in use)"),
                2 | 3 => msg.push_str(" (path not found)"),
                112 => msg.push_str(" (insufficient disk space)"),
                145 => msg.push_str(" (directory not empty)"),
                206 => msg.push_str(" (filename or path too long)"),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => msg.push_str(" (permission denied)"),
            io::ErrorKind::NotFound => msg.push_str(" (path not found)"),
            io::ErrorKind::AlreadyExists => msg.push_str(" (already exists)"),
            _ => {}
        }
    }

    msg
}

/// Adapter for `.map_err(...)` in code returning `DirswapResult`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> DirswapError + 'a {
    move |e: io::Error| DirswapError::io(format!("{} '{}'", op, path.display()), e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_op_and_path() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        let msg = describe_io("open", Path::new("/x/y"), &e);
        assert!(msg.starts_with("open '/x/y': gone"));
        assert!(msg.contains("path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn describe_adds_os_hint() {
        let e = io::Error::from_raw_os_error(libc::ENOSPC);
        let msg = describe_io("write", Path::new("/t"), &e);
        assert!(msg.contains("insufficient space"));
        assert!(msg.contains(&format!("[os code: {}]", libc::ENOSPC)));
    }

    #[test]
    fn adapter_keeps_source() {
        let err = io_error_with_help("create", Path::new("/r"))(io::Error::other("boom"));
        assert!(err.to_string().contains("create '/r': boom"));
        assert_eq!(err.code(), 74);
    }
}
