//! Background execution of relocator operations.
//!
//! The control surface never blocks on filesystem work: `spawn` runs one
//! operation on a named thread and the finished, immutable `Outcome` comes
//! back over a channel. Nothing is shared between the two sides besides the
//! message.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvError, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::debug;

use crate::errors::DirswapResult;
use crate::fs_ops::{Classification, ReverseReport};
use crate::relocator::{ForwardReport, Relocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Measure,
    Forward,
    Backward,
}

/// Completed result of one operation.
#[derive(Debug)]
pub enum Outcome {
    Measured(Classification),
    Forwarded(DirswapResult<ForwardReport>),
    Reversed(DirswapResult<ReverseReport>),
}

/// Handle to an operation running in the background.
#[derive(Debug)]
pub struct Task {
    rx: Receiver<Outcome>,
    handle: JoinHandle<()>,
}

impl Task {
    /// Block until the worker delivers its outcome.
    ///
    /// Errors only if the worker died without sending (it panicked).
    pub fn wait(self) -> Result<Outcome, RecvError> {
        let out = self.rx.recv();
        let _ = self.handle.join();
        out
    }

    /// Non-blocking poll; `None` while the operation is still running.
    pub fn try_outcome(&self) -> Option<Result<Outcome, RecvError>> {
        match self.rx.try_recv() {
            Ok(o) => Some(Ok(o)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RecvError)),
        }
    }
}

/// Run `op` on a fresh worker thread.
pub fn spawn(relocator: Relocator, op: Operation) -> io::Result<Task> {
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("dirswap-worker".to_string())
        .spawn(move || {
            debug!(?op, "worker started");
            let outcome = match op {
                Operation::Measure => Outcome::Measured(relocator.measure_sizes()),
                Operation::Forward => Outcome::Forwarded(relocator.relocate_forward()),
                Operation::Backward => Outcome::Reversed(relocator.relocate_backward()),
            };
            // The receiver may already be gone if the caller gave up; nothing to do then.
            let _ = tx.send(outcome);
        })?;
    Ok(Task { rx, handle })
}
