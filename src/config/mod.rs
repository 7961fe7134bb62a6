//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    default_config_path, default_journal_path, default_log_path, path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel};
pub use xml::{LoadResult, create_template_config, load_config_from_xml_path, load_or_init};

/// Root whose data is judged "official" by default.
pub const ROOT_A_DEFAULT: &str = "/storage/emulated/0/Android/data/com.mihoyou.yuanshen/file";
/// Alternate install root.
pub const ROOT_B_DEFAULT: &str = "/storage/emulated/0/Android/data/com.mihoyou.ys.bilibili/file";
/// Shader cache folder that stays with its install.
pub const EXCLUDED_FOLDER_DEFAULT: &str = "unityvulkanpso";
/// A root larger than this is considered the active one.
pub const SIZE_THRESHOLD_DEFAULT: u64 = 20 * 1024 * 1024 * 1024;
/// Transfer chunk size for cross-device copies.
pub const COPY_BUFFER_DEFAULT: usize = 1024 * 1024;

/// Accepted range for `copy_buffer_size`.
pub const COPY_BUFFER_MIN: usize = 4 * 1024;
pub const COPY_BUFFER_MAX: usize = 64 * 1024 * 1024;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DIRSWAP_CONFIG";
