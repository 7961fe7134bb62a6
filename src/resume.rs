//! Reconciliation pass.
//! Removes orphaned copy temp files left by an interrupted copy, so a crashed
//! run never leaves half-written data that looks like a real entry.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::fs_ops::util::is_copy_temp;

/// Remove stray copy temps below each root. Returns how many were removed.
pub fn reconcile(roots: &[&Path]) -> usize {
    let mut removed = 0;
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        for ent in WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !ent.file_type().is_file() {
                continue;
            }
            let Some(name) = ent.file_name().to_str() else {
                continue;
            };
            if !is_copy_temp(name) {
                continue;
            }
            match fs::remove_file(ent.path()) {
                Ok(()) => {
                    debug!(path = %ent.path().display(), "Removed orphan copy temp");
                    removed += 1;
                }
                Err(e) => {
                    warn!(error = %e, path = %ent.path().display(), "Failed to remove orphan copy temp")
                }
            }
        }
    }
    removed
}
