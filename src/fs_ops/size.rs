//! Recursive size accounting.
//!
//! The walk is iterative (walkdir keeps its own stack), never follows
//! symlinks, and treats any entry it cannot read as contributing 0 bytes.
//! A missing root, or a root that is not a directory, measures 0.

use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Sum the sizes of all regular files below `root`.
pub fn dir_size(root: &Path) -> u64 {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            debug!(path = %root.display(), "not a directory; size 0");
            return 0;
        }
        Err(e) => {
            debug!(path = %root.display(), error = %e, "root unreadable or absent; size 0");
            return 0;
        }
    }

    let mut total = 0u64;
    let mut skipped = 0u64;
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                skipped += 1;
                trace!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(m) => total = total.saturating_add(m.len()),
            Err(e) => {
                skipped += 1;
                trace!(path = %entry.path().display(), error = %e, "metadata failed; counting 0");
            }
        }
    }

    debug!(path = %root.display(), bytes = total, skipped, "measured");
    total
}
