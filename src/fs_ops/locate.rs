//! Active-root classification.
//!
//! `root_a` is active iff its measured size is strictly above the threshold;
//! otherwise `root_b` is presumed active without checking its size. `root_b`'s
//! size only feeds the "both roots are over the threshold" warning, which
//! signals an un-migrated or inconsistent install.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::size::dir_size;

/// Which of the two configured roots is in live use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveRoot {
    A,
    B,
}

impl ActiveRoot {
    /// The other root.
    pub fn other(self) -> Self {
        match self {
            ActiveRoot::A => ActiveRoot::B,
            ActiveRoot::B => ActiveRoot::A,
        }
    }

    /// Pick the path corresponding to this root.
    pub fn select<'a>(self, root_a: &'a Path, root_b: &'a Path) -> &'a Path {
        match self {
            ActiveRoot::A => root_a,
            ActiveRoot::B => root_b,
        }
    }
}

impl fmt::Display for ActiveRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActiveRoot::A => "root A",
            ActiveRoot::B => "root B",
        })
    }
}

/// Immutable result of one size scan over both roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub root_a: PathBuf,
    pub root_b: PathBuf,
    pub size_a: u64,
    pub size_b: u64,
    pub threshold: u64,
    pub active: ActiveRoot,
    /// Both roots exceed the threshold at the same time.
    pub inconsistent: bool,
}

impl Classification {
    /// Path of the active root.
    pub fn active_path(&self) -> &Path {
        self.active.select(&self.root_a, &self.root_b)
    }

    /// Path of the inactive root.
    pub fn inactive_path(&self) -> &Path {
        self.active.other().select(&self.root_a, &self.root_b)
    }
}

/// Apply the threshold rule to already-measured sizes.
pub fn decide(size_a: u64, size_b: u64, threshold: u64) -> (ActiveRoot, bool) {
    let a_over = size_a > threshold;
    let active = if a_over { ActiveRoot::A } else { ActiveRoot::B };
    (active, a_over && size_b > threshold)
}

/// Measure both roots (concurrently) and classify which one is active.
pub fn classify(root_a: &Path, root_b: &Path, threshold: u64) -> Classification {
    let (size_a, size_b) = rayon::join(|| dir_size(root_a), || dir_size(root_b));
    let (active, inconsistent) = decide(size_a, size_b, threshold);

    if inconsistent {
        warn!(
            size_a,
            size_b,
            threshold,
            "both roots exceed the size threshold; data may not have been migrated cleanly"
        );
    }
    info!(size_a, size_b, threshold, active = %active, "classified roots");

    Classification {
        root_a: root_a.to_path_buf(),
        root_b: root_b.to_path_buf(),
        size_a,
        size_b,
        threshold,
        active,
        inconsistent,
    }
}
