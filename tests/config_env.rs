use dirswap::{CONFIG_ENV, LoadResult, LogLevel, load_config_from_xml_path, load_or_init};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

struct EnvGuard;

impl EnvGuard {
    fn set(path: &std::path::Path) -> Self {
        unsafe { std::env::set_var(CONFIG_ENV, path) };
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe { std::env::remove_var(CONFIG_ENV) };
    }
}

#[test]
#[serial]
fn explicit_config_is_loaded_with_all_fields() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = base.join("dirswap.xml");
    fs::write(
        &cfg_path,
        format!(
            r#"<config>
  <root_a>{a}</root_a>
  <root_b>  {b}  </root_b>
  <size_threshold_bytes> 1024 </size_threshold_bytes>
  <excluded_folder>shaders</excluded_folder>
  <journal_file>{j}</journal_file>
  <copy_buffer_bytes>65536</copy_buffer_bytes>
  <log_level>debug</log_level>
  <log_file>{l}</log_file>
</config>"#,
            a = base.join("a").display(),
            b = base.join("b").display(),
            j = base.join("journal.bin").display(),
            l = base.join("run.log").display(),
        ),
    )
    .unwrap();

    let _env = EnvGuard::set(&cfg_path);
    let LoadResult::Loaded(cfg, path) = load_or_init().unwrap() else {
        panic!("expected the explicit config to load");
    };
    assert_eq!(path, cfg_path);
    assert_eq!(cfg.root_a, base.join("a"));
    assert_eq!(cfg.root_b, base.join("b"));
    assert_eq!(cfg.size_threshold, 1024);
    assert_eq!(cfg.excluded_folder, "shaders");
    assert_eq!(cfg.journal_path, base.join("journal.bin"));
    assert_eq!(cfg.copy_buffer_size, 65536);
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file, Some(base.join("run.log")));
    cfg.validate().unwrap();
}

#[test]
#[serial]
fn explicit_config_that_does_not_exist_is_an_error() {
    let td = tempdir().unwrap();
    let missing = td.path().join("nope.xml");
    let _env = EnvGuard::set(&missing);
    let err = load_or_init().unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err:#}");
    assert!(!missing.exists(), "no template may be written to an explicit path");
}

#[test]
fn missing_fields_keep_defaults() {
    let td = tempdir().unwrap();
    let p = td.path().join("c.xml");
    fs::write(&p, "<config><root_a>/x/a</root_a></config>").unwrap();
    let cfg = load_config_from_xml_path(&p).unwrap();
    assert_eq!(cfg.root_a, PathBuf::from("/x/a"));
    assert_eq!(cfg.root_b, PathBuf::from(dirswap::config::ROOT_B_DEFAULT));
    assert_eq!(cfg.excluded_folder, "unityvulkanpso");
    assert_eq!(cfg.size_threshold, 20 * 1024 * 1024 * 1024);
    assert_eq!(cfg.copy_buffer_size, 1024 * 1024);
}

#[test]
fn malformed_xml_is_rejected() {
    let td = tempdir().unwrap();
    let p = td.path().join("c.xml");
    // Missing closing tag for root_b
    let xml = "<config>\n  <root_a>/x/a</root_a>\n  <root_b>/x/b\n</config>";
    fs::write(&p, xml).unwrap();
    let err = load_config_from_xml_path(&p).unwrap_err();
    assert!(format!("{err}").contains("parse config xml"));
}

#[test]
fn invalid_values_fail_validation() {
    let td = tempdir().unwrap();
    let p = td.path().join("c.xml");
    fs::write(
        &p,
        "<config><root_a>/x/a</root_a><root_b>/x/a/inner</root_b></config>",
    )
    .unwrap();
    let cfg = load_config_from_xml_path(&p).unwrap();
    assert!(cfg.validate().is_err(), "nested roots must be rejected");

    fs::write(&p, "<config><excluded_folder>a/b</excluded_folder></config>").unwrap();
    let cfg = load_config_from_xml_path(&p).unwrap();
    assert!(cfg.validate().is_err(), "multi-component exclusion must be rejected");
}
