//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log/journal paths and detects symlinked ancestors for safety.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file location: `$DIRSWAP_CONFIG` if set, else the per-user config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let p = PathBuf::from(p);
        if p.is_relative() {
            let cwd = env::current_dir()?;
            return Ok(cwd.join(p));
        }
        return Ok(p);
    }
    if let Some(base) = config_dir() {
        return Ok(base.join("dirswap").join("config.xml"));
    }
    env::var_os("HOME")
        .map(|h| PathBuf::from(h).join(".config").join("dirswap").join("config.xml"))
        .ok_or_else(|| anyhow!("cannot determine a config directory (no config dir or HOME)"))
}

/// Application private data dir (`<data_dir>/dirswap`).
fn app_data_dir() -> Result<PathBuf> {
    if let Some(base) = data_dir() {
        return Ok(base.join("dirswap"));
    }
    env::var_os("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("dirswap"))
        .ok_or_else(|| anyhow!("cannot determine a data directory (no data dir or HOME)"))
}

/// OS-appropriate default log file path.
pub fn default_log_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("dirswap.log"))
}

/// OS-appropriate default move journal path.
pub fn default_journal_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("move_journal.bin"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
