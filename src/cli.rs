//! CLI definition and parsing.
//! Defines Args (global flags plus one subcommand) and applies flag overrides
//! on top of the loaded Config.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - --print-config does not need a subcommand.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Relocate a directory tree between two install roots, with undo.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Swap a large directory tree between two install roots, reversibly"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override the first root (normally configured via XML).
    #[arg(long, global = true, value_hint = ValueHint::DirPath, help = "Override root A")]
    pub root_a: Option<PathBuf>,

    /// Override the second root (normally configured via XML).
    #[arg(long, global = true, value_hint = ValueHint::DirPath, help = "Override root B")]
    pub root_b: Option<PathBuf>,

    /// Root A is active when it holds more than this many bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    pub threshold: Option<u64>,

    /// Top-level folder name that is never relocated.
    #[arg(long, global = true, value_name = "NAME")]
    pub exclude: Option<String>,

    /// Location of the move journal.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub journal: Option<PathBuf>,

    /// Copy transfer chunk size in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Write logs to this file as well as the console.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print where dirswap will look for the config file (or DIRSWAP_CONFIG if set), then exit.
    #[arg(long, help = "Print the config file location used by dirswap and exit")]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Measure both roots and report which one is active
    Status,
    /// Move the active root's contents into the other root
    Forward,
    /// Undo the last forward relocation using the move journal
    Back,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.root_a {
            cfg.root_a = p.clone();
        }
        if let Some(p) = &self.root_b {
            cfg.root_b = p.clone();
        }
        if let Some(t) = self.threshold {
            cfg.size_threshold = t;
        }
        if let Some(name) = &self.exclude {
            cfg.excluded_folder = name.clone();
        }
        if let Some(j) = &self.journal {
            cfg.journal_path = j.clone();
        }
        if let Some(b) = self.buffer_size {
            cfg.copy_buffer_size = b;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
