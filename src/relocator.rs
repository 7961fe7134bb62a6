//! Control-surface operations: measure, relocate forward, relocate backward.
//!
//! A `Relocator` owns a validated `Config` and runs each operation to
//! completion on the calling thread; `worker` moves these calls off the
//! control thread. Forward and backward hold the operation lock for the whole
//! "mutate tree + persist journal" region.

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{DirswapError, DirswapResult};
use crate::fs_ops::{
    Classification, MoveOptions, OperationLock, ReverseReport, classify, relocate_tree, restore,
};
use crate::journal::Journal;
use crate::resume;
use crate::shutdown;

/// Result of a completed forward relocation.
#[derive(Debug, Clone)]
pub struct ForwardReport {
    /// Classification that chose the source and target roots.
    pub classification: Classification,
    /// Records written to the journal.
    pub moved: usize,
    pub failed: usize,
    pub already_present: usize,
    /// Orphaned copy temps removed before the run.
    pub reconciled: usize,
}

#[derive(Debug, Clone)]
pub struct Relocator {
    config: Config,
    stop_check: fn() -> bool,
}

impl Relocator {
    /// Build a relocator that stops between entries when Ctrl-C was pressed.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stop_check: shutdown::is_requested,
        }
    }

    /// Replace the cancellation check (polled before each top-level entry).
    pub fn with_stop_check(mut self, stop_check: fn() -> bool) -> Self {
        self.stop_check = stop_check;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn journal(&self) -> Journal {
        Journal::new(&self.config.journal_path)
    }

    fn move_options(&self) -> MoveOptions {
        MoveOptions {
            buffer_size: self.config.copy_buffer_size,
            allow_rename: true,
        }
    }

    /// `measureSizes`: sizes of both roots and which one is active.
    pub fn measure_sizes(&self) -> Classification {
        classify(
            &self.config.root_a,
            &self.config.root_b,
            self.config.size_threshold,
        )
    }

    /// `relocateForward`: move the active root's entries into the inactive root
    /// and persist the journal (replacing any previous one).
    pub fn relocate_forward(&self) -> DirswapResult<ForwardReport> {
        let _lock = OperationLock::acquire(&self.config.journal_path)?;
        let reconciled = resume::reconcile(&[self.config.root_a.as_path(), self.config.root_b.as_path()]);

        let classification = self.measure_sizes();
        let source = classification.active_path();
        let target = classification.inactive_path();
        info!(
            source = %source.display(),
            target = %target.display(),
            "starting forward relocation"
        );

        let run = relocate_tree(
            source,
            target,
            &self.config.excluded_folder,
            &self.move_options(),
            self.stop_check,
        )?;
        self.journal().write(&run.records)?;

        if run.interrupted {
            warn!(moved = run.records.len(), "forward relocation interrupted");
            return Err(DirswapError::Interrupted);
        }
        Ok(ForwardReport {
            moved: run.records.len(),
            failed: run.failed,
            already_present: run.already_present,
            reconciled,
            classification,
        })
    }

    /// `relocateBackward`: replay the journal, moving every entry back.
    ///
    /// Fails with `MissingJournal` when there is nothing to undo. Records that
    /// could not be restored stay in the journal; otherwise it is cleared.
    pub fn relocate_backward(&self) -> DirswapResult<ReverseReport> {
        let _lock = OperationLock::acquire(&self.config.journal_path)?;
        let journal = self.journal();
        let records = journal
            .read()?
            .ok_or_else(|| DirswapError::MissingJournal(journal.path().to_path_buf()))?;
        info!(records = records.len(), "starting reverse relocation");

        let reconciled = resume::reconcile(&[self.config.root_a.as_path(), self.config.root_b.as_path()]);
        if reconciled > 0 {
            info!(reconciled, "removed orphaned copy temps");
        }

        let report = restore(&records, &self.move_options(), self.stop_check);
        if report.unrecovered.is_empty() {
            journal.clear()?;
        } else {
            warn!(
                unrecovered = report.unrecovered.len(),
                "some entries could not be restored; keeping them in the journal"
            );
            journal.write(&report.unrecovered)?;
        }
        Ok(report)
    }
}
