//! Core library for `dirswap`.
//!
//! Relocates the contents of one install root into another and keeps a
//! journal so the relocation can be undone:
//! - `fs_ops`: size accounting, active-root classification and the
//!   merge-move relocation engine.
//! - `journal`: versioned, checksummed persistence of move records.
//! - `relocator`: the three control-surface operations on top of both.
//! - `worker`: runs an operation on a background thread and returns its
//!   outcome as a message.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod journal;
pub mod output;
pub mod platform;
pub mod relocator;
pub mod resume;
pub mod shutdown;
pub mod worker;

pub use config::{
    CONFIG_ENV, Config, LoadResult, LogLevel, default_config_path, default_journal_path,
    default_log_path, load_config_from_xml_path, load_or_init, path_has_symlink_ancestor,
};
pub use errors::{DirswapError, DirswapResult};
pub use fs_ops::{
    ActiveRoot, Classification, MoveOptions, OperationLock, RelocationRun, ReverseReport,
    classify, dir_size, move_tree, relocate_tree, restore,
};
pub use journal::{Journal, MoveRecord};
pub use relocator::{ForwardReport, Relocator};
