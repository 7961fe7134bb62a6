//! Recursive move primitive: merge `src` into `dst`.
//!
//! - Directory: ensure `dst` exists, move every child, then remove the
//!   now-empty `src`. Any child failure marks the directory failed and leaves
//!   both trees in place; siblings are still attempted.
//! - File: an existing `dst` wins and `src` is left untouched (reported as
//!   success). Otherwise rename when possible, else copy through a hidden temp
//!   sibling, rename into place, and delete `src` only after that.
//! - Symlinks and special files are never moved.
//!
//! Traversal uses an explicit work stack so arbitrarily deep trees cannot
//! exhaust the thread stack. Children are visited in directory listing order.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::helpers::describe_io;
use super::io_copy::copy_streaming;
use super::util::{is_cross_device, unique_temp_path};

/// Tunables for the move primitive.
#[derive(Debug, Clone, Copy)]
pub struct MoveOptions {
    /// Transfer chunk size for copies.
    pub buffer_size: usize,
    /// Try a same-filesystem rename before copying.
    pub allow_rename: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            buffer_size: crate::config::COPY_BUFFER_DEFAULT,
            allow_rename: true,
        }
    }
}

enum Step {
    Visit {
        src: PathBuf,
        dst: PathBuf,
        parent: Option<usize>,
    },
    Finish(usize),
}

struct DirFrame {
    src: PathBuf,
    parent: Option<usize>,
    ok: bool,
}

/// Move `src` into `dst`, merging directories. Returns true iff every leaf
/// succeeded and every source directory was removed.
pub fn move_tree(src: &Path, dst: &Path, opts: &MoveOptions) -> bool {
    let mut dirs: Vec<DirFrame> = Vec::new();
    let mut root_ok = true;
    let mut stack = vec![Step::Visit {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        parent: None,
    }];

    fn fail(dirs: &mut [DirFrame], root_ok: &mut bool, parent: Option<usize>) {
        match parent {
            Some(i) => dirs[i].ok = false,
            None => *root_ok = false,
        }
    }

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit { src, dst, parent } => {
                let ftype = match fs::symlink_metadata(&src) {
                    Ok(m) => m.file_type(),
                    Err(e) => {
                        warn!("{}", describe_io("stat source", &src, &e));
                        fail(&mut dirs, &mut root_ok, parent);
                        continue;
                    }
                };

                if ftype.is_dir() {
                    if let Err(e) = fs::create_dir_all(&dst) {
                        warn!("{}", describe_io("create directory", &dst, &e));
                        fail(&mut dirs, &mut root_ok, parent);
                        continue;
                    }
                    let (children, listed_all) = list_children(&src);
                    let idx = dirs.len();
                    dirs.push(DirFrame {
                        src: src.clone(),
                        parent,
                        ok: listed_all,
                    });
                    stack.push(Step::Finish(idx));
                    // Reverse so the first listed child is popped first.
                    for name in children.into_iter().rev() {
                        stack.push(Step::Visit {
                            src: src.join(&name),
                            dst: dst.join(&name),
                            parent: Some(idx),
                        });
                    }
                } else if ftype.is_file() {
                    if !move_file(&src, &dst, opts) {
                        fail(&mut dirs, &mut root_ok, parent);
                    }
                } else {
                    warn!(path = %src.display(), "Refusing to move symlink or special file");
                    fail(&mut dirs, &mut root_ok, parent);
                }
            }
            Step::Finish(idx) => {
                let mut ok = dirs[idx].ok;
                if ok {
                    match fs::remove_dir(&dirs[idx].src) {
                        Ok(()) => trace!(path = %dirs[idx].src.display(), "removed emptied directory"),
                        Err(e) => {
                            warn!("{}", describe_io("remove source directory", &dirs[idx].src, &e));
                            ok = false;
                        }
                    }
                } else {
                    debug!(path = %dirs[idx].src.display(), "keeping directory; not all children moved");
                }
                if !ok {
                    let parent = dirs[idx].parent;
                    fail(&mut dirs, &mut root_ok, parent);
                }
            }
        }
    }

    root_ok
}

/// Child names in listing order; the flag is false if any entry was unreadable.
fn list_children(dir: &Path) -> (Vec<OsString>, bool) {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("{}", describe_io("list directory", dir, &e));
            return (Vec::new(), false);
        }
    };
    let mut names = Vec::new();
    let mut complete = true;
    for entry in rd {
        match entry {
            Ok(e) => names.push(e.file_name()),
            Err(e) => {
                warn!("{}", describe_io("read directory entry", dir, &e));
                complete = false;
            }
        }
    }
    (names, complete)
}

fn move_file(src: &Path, dst: &Path, opts: &MoveOptions) -> bool {
    match fs::symlink_metadata(dst) {
        Ok(_) => {
            debug!(src = %src.display(), dst = %dst.display(), "target exists; leaving source in place");
            return true;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!("{}", describe_io("stat target", dst, &e));
            return false;
        }
    }

    if opts.allow_rename {
        match fs::rename(src, dst) {
            Ok(()) => {
                trace!(src = %src.display(), dst = %dst.display(), "renamed");
                return true;
            }
            Err(e) if is_cross_device(&e) => {
                trace!(src = %src.display(), "cross-device; copying");
            }
            Err(e) => {
                debug!("{}; falling back to copy", describe_io("rename", src, &e));
            }
        }
    }

    copy_then_remove(src, dst, opts.buffer_size)
}

fn copy_then_remove(src: &Path, dst: &Path, buf_size: usize) -> bool {
    let dst_dir = dst.parent().unwrap_or_else(|| Path::new("."));
    let tmp = unique_temp_path(dst_dir);

    match copy_streaming(src, &tmp, buf_size) {
        Ok(res) => trace!(src = %src.display(), bytes = res.bytes, chunks = res.chunks, "copied"),
        Err(e) => {
            warn!("{}", describe_io("copy file", src, &e));
            let _ = fs::remove_file(&tmp);
            return false;
        }
    }
    if let Err(e) = fs::rename(&tmp, dst) {
        warn!("{}", describe_io("finalize copy", dst, &e));
        let _ = fs::remove_file(&tmp);
        return false;
    }
    match fs::remove_file(src) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", describe_io("remove source file", src, &e));
            false
        }
    }
}
