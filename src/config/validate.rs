//! Config validation logic.
//! Verifies roots are absolute and disjoint, the excluded name is a single
//! component, the copy buffer is sane, and the journal lives outside both roots.
//! Roots are not required to exist: an absent root simply measures 0 bytes.

use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error};

use super::types::Config;
use super::{COPY_BUFFER_MAX, COPY_BUFFER_MIN};

impl Config {
    /// Validate settings; returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        ensure_absolute(&self.root_a, "root_a")?;
        ensure_absolute(&self.root_b, "root_b")?;

        let a = resolve(&self.root_a);
        let b = resolve(&self.root_b);
        if a == b {
            error!("root_a and root_b resolve to the same path: {}", a.display());
            bail!(
                "root_a and root_b resolve to the same path: '{}'",
                a.display()
            );
        }
        if a.starts_with(&b) || b.starts_with(&a) {
            bail!(
                "root_a '{}' and root_b '{}' must not be nested in one another",
                a.display(),
                b.display()
            );
        }

        ensure_single_component(&self.excluded_folder)?;

        if !(COPY_BUFFER_MIN..=COPY_BUFFER_MAX).contains(&self.copy_buffer_size) {
            bail!(
                "copy_buffer_size {} is outside {}..={} bytes",
                self.copy_buffer_size,
                COPY_BUFFER_MIN,
                COPY_BUFFER_MAX
            );
        }

        let journal = resolve(&self.journal_path);
        if journal.starts_with(&a) || journal.starts_with(&b) {
            bail!(
                "journal file '{}' must not live inside a relocated root",
                journal.display()
            );
        }

        debug!(
            root_a = %self.root_a.display(),
            root_b = %self.root_b.display(),
            threshold = self.size_threshold,
            exclude = %self.excluded_folder,
            journal = %self.journal_path.display(),
            "config validated"
        );
        Ok(())
    }
}

fn ensure_absolute(path: &Path, name: &str) -> Result<()> {
    if !path.is_absolute() {
        error!("{name} must be an absolute path: {}", path.display());
        bail!("{name} must be an absolute path: '{}'", path.display());
    }
    Ok(())
}

/// Canonicalize the deepest existing ancestor (follows symlinks) and re-append
/// the components that do not exist yet. Falls back to the lexical path.
fn resolve(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(mut out) = dunce::canonicalize(existing) {
            out.extend(missing.iter().rev());
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn ensure_single_component(name: &str) -> Result<()> {
    let mut comps = Path::new(name).components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => bail!("excluded_folder must be a plain folder name, got '{name}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cfg_in(base: &Path) -> Config {
        Config::new(base.join("a"), base.join("b"), base.join("state/journal.bin"))
    }

    #[test]
    fn accepts_missing_roots() {
        let td = tempdir().unwrap();
        cfg_in(td.path()).validate().unwrap();
    }

    #[test]
    fn rejects_relative_root() {
        let td = tempdir().unwrap();
        let mut cfg = cfg_in(td.path());
        cfg.root_a = PathBuf::from("relative/a");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_same_and_nested_roots() {
        let td = tempdir().unwrap();
        let mut cfg = cfg_in(td.path());
        cfg.root_b = cfg.root_a.clone();
        assert!(cfg.validate().is_err());

        cfg.root_b = cfg.root_a.join("inner");
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("nested"), "{msg}");
    }

    #[test]
    fn rejects_bad_excluded_names() {
        let td = tempdir().unwrap();
        for bad in ["", "a/b", "..", "."] {
            let cfg = cfg_in(td.path()).with_excluded(bad);
            assert!(cfg.validate().is_err(), "accepted {bad:?}");
        }
        cfg_in(td.path()).with_excluded("unityvulkanpso").validate().unwrap();
    }

    #[test]
    fn rejects_buffer_out_of_range() {
        let td = tempdir().unwrap();
        let mut cfg = cfg_in(td.path());
        cfg.copy_buffer_size = 16;
        assert!(cfg.validate().is_err());
        cfg.copy_buffer_size = COPY_BUFFER_MAX + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_journal_inside_root() {
        let td = tempdir().unwrap();
        let mut cfg = cfg_in(td.path());
        cfg.journal_path = cfg.root_b.join("journal.bin");
        assert!(cfg.validate().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn journal_reached_through_symlink_is_still_inside_root() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        std::fs::create_dir_all(real.join("a")).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut cfg = Config::new(real.join("a"), td.path().join("b"), td.path().join("j.bin"));
        cfg.validate().unwrap();
        cfg.journal_path = link.join("a/state/journal.bin");
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("inside a relocated root"), "{msg}");
    }

    #[test]
    fn resolve_keeps_missing_tail() {
        let td = tempdir().unwrap();
        let base = dunce::canonicalize(td.path()).unwrap();
        assert_eq!(resolve(&td.path().join("x/y.bin")), base.join("x/y.bin"));
    }
}
