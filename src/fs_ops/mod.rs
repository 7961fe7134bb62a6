//! Filesystem operations: size accounting, root classification, and the
//! relocation engine built on the recursive move primitive.

pub mod helpers;
mod io_copy;
pub mod locate;
pub mod lock;
pub mod merge;
pub mod relocate;
pub mod size;
pub(crate) mod util;

pub use locate::{ActiveRoot, Classification, classify, decide};
pub use lock::OperationLock;
pub use merge::{MoveOptions, move_tree};
pub use relocate::{RelocationRun, ReverseReport, relocate_tree, restore};
pub use size::dir_size;
