//! Relocation engine: forward (root -> root) and reverse (journal replay).
//!
//! Forward moves each top-level entry of the source root as a unit, skipping
//! the excluded folder name. Failures are per entry; the run carries on with
//! the next sibling. Reverse walks the journal records in stored order and
//! moves each relocated entry back to its original location.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{DirswapError, DirswapResult};
use crate::fs_ops::helpers::{describe_io, io_error_with_help};
use crate::fs_ops::merge::{MoveOptions, move_tree};
use crate::journal::MoveRecord;

/// What one forward pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelocationRun {
    /// Entries moved (in move order).
    pub records: Vec<MoveRecord>,
    /// Entries the move primitive could not fully move.
    pub failed: usize,
    /// Top-level files skipped because the target already had that name.
    pub already_present: usize,
    /// Stopped early on request; `records` covers the entries handled so far.
    pub interrupted: bool,
}

/// What one reverse pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReverseReport {
    /// Records moved back to their original location.
    pub restored: usize,
    /// Records whose reverse move failed or whose original file path is
    /// occupied again (data left at the relocated path), plus any not
    /// attempted because of an interruption.
    pub unrecovered: Vec<MoveRecord>,
    /// Records whose relocated path no longer exists.
    pub missing: usize,
    pub interrupted: bool,
}

/// Move every top-level entry of `source_root` except `exclude` into `target_root`.
///
/// `should_stop` is polled before each top-level entry.
pub fn relocate_tree(
    source_root: &Path,
    target_root: &Path,
    exclude: &str,
    opts: &MoveOptions,
    should_stop: impl Fn() -> bool,
) -> DirswapResult<RelocationRun> {
    match fs::metadata(source_root) {
        Ok(m) if m.is_dir() => {}
        _ => return Err(DirswapError::SourceMissing(source_root.to_path_buf())),
    }
    fs::create_dir_all(target_root).map_err(io_error_with_help("create target root", target_root))?;

    let listing =
        fs::read_dir(source_root).map_err(io_error_with_help("list source root", source_root))?;

    let mut run = RelocationRun::default();
    for entry in listing {
        if should_stop() {
            info!("stop requested; not starting further entries");
            run.interrupted = true;
            break;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("{}", describe_io("read entry of", source_root, &e));
                run.failed += 1;
                continue;
            }
        };
        let name = entry.file_name();
        if name == exclude {
            debug!(name = %name.to_string_lossy(), "excluded; left in place");
            continue;
        }

        let src = entry.path();
        let dst = target_root.join(&name);
        let Some(record) = MoveRecord::try_new(&src, &dst) else {
            warn!(path = %src.display(), "path is not valid UTF-8; left in place");
            run.failed += 1;
            continue;
        };

        let src_is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !src_is_dir && fs::symlink_metadata(&dst).is_ok() {
            debug!(path = %dst.display(), "target already has this entry; skipped");
            run.already_present += 1;
            continue;
        }

        if move_tree(&src, &dst, opts) {
            info!(src = %src.display(), dst = %dst.display(), "moved");
            run.records.push(record);
        } else {
            warn!(src = %src.display(), "entry not fully moved; remainder left in place");
            run.failed += 1;
        }
    }

    info!(
        moved = run.records.len(),
        failed = run.failed,
        already_present = run.already_present,
        interrupted = run.interrupted,
        "forward relocation pass finished"
    );
    Ok(run)
}

/// Move each record's relocated entry back to its original path.
pub fn restore(
    records: &[MoveRecord],
    opts: &MoveOptions,
    should_stop: impl Fn() -> bool,
) -> ReverseReport {
    let mut report = ReverseReport::default();

    for (i, record) in records.iter().enumerate() {
        if should_stop() {
            info!("stop requested; remaining records kept in the journal");
            report.interrupted = true;
            report.unrecovered.extend_from_slice(&records[i..]);
            break;
        }

        let from = record.relocated();
        let to = record.original();
        let from_is_dir = match fs::symlink_metadata(from) {
            Ok(m) => m.is_dir(),
            Err(_) => {
                warn!(path = %from.display(), "relocated entry no longer exists; skipped");
                report.missing += 1;
                continue;
            }
        };
        if !from_is_dir && fs::symlink_metadata(to).is_ok() {
            warn!(
                src = %from.display(),
                dst = %to.display(),
                "original path is occupied again; entry left at its relocated path"
            );
            report.unrecovered.push(record.clone());
            continue;
        }
        if let Some(parent) = to.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("{}", describe_io("create original parent", parent, &e));
            report.unrecovered.push(record.clone());
            continue;
        }

        if move_tree(from, to, opts) {
            info!(src = %from.display(), dst = %to.display(), "restored");
            report.restored += 1;
        } else {
            warn!(src = %from.display(), "entry not fully restored");
            report.unrecovered.push(record.clone());
        }
    }

    info!(
        restored = report.restored,
        unrecovered = report.unrecovered.len(),
        missing = report.missing,
        "reverse relocation pass finished"
    );
    report
}
