//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a secure template if missing (unless DIRSWAP_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; path validation happens elsewhere.
//! - Unknown XML fields are a hard error to surface misconfigurations early.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{
    default_config_path, default_journal_path, default_log_path, path_has_symlink_ancestor,
};
use super::types::{Config, LogLevel};
use super::{
    CONFIG_ENV, COPY_BUFFER_DEFAULT, EXCLUDED_FOLDER_DEFAULT, ROOT_A_DEFAULT, ROOT_B_DEFAULT,
    SIZE_THRESHOLD_DEFAULT,
};
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_file_atomic_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    root_a: Option<String>,
    root_b: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    size_threshold_bytes: Option<u64>,
    excluded_folder: Option<String>,
    journal_file: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    copy_buffer_bytes: Option<u64>,
    log_level: Option<String>,
    log_file: Option<String>,
}

/// Outcome of looking for the config file at startup.
#[derive(Debug)]
pub enum LoadResult {
    /// A config file was found and parsed.
    Loaded(Config, PathBuf),
    /// No file existed at the default location; a template was written there.
    CreatedTemplate(PathBuf),
}

// Trims surrounding whitespace for optional u64 values.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{s}': {e}"))),
    }
}

fn trimmed_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(PathBuf::from)
}

// Map XmlConfig -> Config; unset fields keep their defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(p) = trimmed_path(parsed.root_a.as_deref()) {
        cfg.root_a = p;
    }
    if let Some(p) = trimmed_path(parsed.root_b.as_deref()) {
        cfg.root_b = p;
    }
    if let Some(n) = parsed.size_threshold_bytes {
        cfg.size_threshold = n;
    }
    if let Some(name) = parsed.excluded_folder.as_deref().map(str::trim) {
        cfg.excluded_folder = name.to_string();
    }
    if let Some(p) = trimmed_path(parsed.journal_file.as_deref()) {
        cfg.journal_path = p;
    }
    if let Some(n) = parsed.copy_buffer_bytes {
        cfg.copy_buffer_size = usize::try_from(n)
            .with_context(|| format!("copy_buffer_bytes {n} does not fit this platform"))?;
    }
    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s
            .trim()
            .parse::<LogLevel>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    // An empty <log_file/> keeps the default log path.
    if let Some(p) = trimmed_path(parsed.log_file.as_deref()) {
        cfg.log_file = Some(p);
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed)
}

/// Locate and load the config file, creating a template at the default
/// location on first run.
///
/// - `DIRSWAP_CONFIG` set but file missing: error (never write to an explicit path).
/// - default location missing: template written, `CreatedTemplate` returned.
pub fn load_or_init() -> Result<LoadResult> {
    let explicit = env::var_os(CONFIG_ENV).is_some();
    let path = default_config_path()?;

    if !path.exists() {
        if explicit {
            bail!(
                "{CONFIG_ENV} points to '{}' which does not exist",
                path.display()
            );
        }
        create_template_config(&path)?;
        return Ok(LoadResult::CreatedTemplate(path));
    }

    let cfg = load_config_from_xml_path(&path)?;
    Ok(LoadResult::Loaded(cfg, path))
}

/// Create default template config file and parent directory (best-effort permissions).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/dirswap.log".into());
    let suggested_journal = default_journal_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/move_journal.bin".into());

    let content = format!(
        "<!--\n  dirswap configuration (XML)\n\n    root_a                -> first install root (judged active when larger than the threshold)\n    root_b                -> second install root\n    size_threshold_bytes  -> root_a is active iff its size is strictly above this\n    excluded_folder       -> top-level folder name that is never relocated\n    journal_file          -> where the reversible move journal is stored\n    copy_buffer_bytes     -> transfer chunk size for copies (4096 .. 67108864)\n    log_level             -> quiet | normal | info | debug\n    log_file              -> path to log file (empty keeps the default)\n\n  CLI flags override XML values.\n-->\n<config>\n  <root_a>{}</root_a>\n  <root_b>{}</root_b>\n  <size_threshold_bytes>{}</size_threshold_bytes>\n  <excluded_folder>{}</excluded_folder>\n  <journal_file>{}</journal_file>\n  <copy_buffer_bytes>{}</copy_buffer_bytes>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n</config>\n",
        ROOT_A_DEFAULT,
        ROOT_B_DEFAULT,
        SIZE_THRESHOLD_DEFAULT,
        EXCLUDED_FOLDER_DEFAULT,
        suggested_journal,
        COPY_BUFFER_DEFAULT,
        suggested_log,
    );

    write_file_atomic_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}
