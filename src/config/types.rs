//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;
use super::{
    COPY_BUFFER_DEFAULT, EXCLUDED_FOLDER_DEFAULT, ROOT_A_DEFAULT, ROOT_B_DEFAULT,
    SIZE_THRESHOLD_DEFAULT,
};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration used by the relocator.
#[derive(Debug, Clone)]
pub struct Config {
    /// First install root ("official")
    pub root_a: PathBuf,
    /// Second install root ("alternate")
    pub root_b: PathBuf,
    /// `root_a` is active iff its measured size is strictly above this
    pub size_threshold: u64,
    /// Top-level folder name never relocated (case-sensitive)
    pub excluded_folder: String,
    /// Where the move journal is persisted
    pub journal_path: PathBuf,
    /// Chunk size for streaming copies
    pub copy_buffer_size: usize,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_a: PathBuf::from(ROOT_A_DEFAULT),
            root_b: PathBuf::from(ROOT_B_DEFAULT),
            size_threshold: SIZE_THRESHOLD_DEFAULT,
            excluded_folder: EXCLUDED_FOLDER_DEFAULT.to_string(),
            journal_path: paths::default_journal_path()
                .unwrap_or_else(|_| PathBuf::from("move_journal.bin")),
            copy_buffer_size: COPY_BUFFER_DEFAULT,
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
        }
    }
}

impl Config {
    /// Construct a Config with explicit roots and journal; other fields use defaults.
    pub fn new(
        root_a: impl Into<PathBuf>,
        root_b: impl Into<PathBuf>,
        journal_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root_a: root_a.into(),
            root_b: root_b.into(),
            journal_path: journal_path.into(),
            ..Default::default()
        }
    }

    /// Builder-style threshold override.
    pub fn with_threshold(mut self, bytes: u64) -> Self {
        self.size_threshold = bytes;
        self
    }

    /// Builder-style excluded folder override.
    pub fn with_excluded(mut self, name: impl Into<String>) -> Self {
        self.excluded_folder = name.into();
        self
    }
}
