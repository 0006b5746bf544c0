use std::fs;

use jobdash::config::{Config, LoggingConfig};
use jobdash::logging::resolve_level;

#[test]
fn test_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "server:\n  base_url: https://jobs.example.org\ndisplay:\n  timezone: America/New_York\ntable:\n  sort: season\n  ascending: false\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.server.base_url, "https://jobs.example.org");
    assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);
    assert!(config.display.superscript_gm);
    assert_eq!(config.logging.level, "info");

    let sort = config.sort_state().unwrap();
    assert_eq!(sort.column, "Season");
    assert!(!sort.ascending);
}

#[test]
fn test_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[logging]\nlevel = \"debug\"\nformat = \"json\"\n\n[display]\nsuperscript_gm = false\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert!(!config.display.superscript_gm);
    assert_eq!(config.server.base_url, common::DEFAULT_BASE_URL);
    assert_eq!(config.sort_state().unwrap(), common::SortState::default());
}

#[test]
fn test_merge_overlays_only_set_fields() {
    let dir = tempfile::tempdir().unwrap();
    let base_path = dir.path().join("base.yaml");
    fs::write(
        &base_path,
        "logging:\n  output: /var/log/jobdash.log\ndisplay:\n  timezone: Europe/Berlin\ntable:\n  sort: Number\n",
    )
    .unwrap();
    let overlay_path = dir.path().join("overlay.toml");
    fs::write(&overlay_path, "[logging]\nlevel = \"debug\"\n\n[table]\nascending = false\n").unwrap();

    let mut config = Config::from_file(&base_path).unwrap();
    config.merge(Config::from_file(&overlay_path).unwrap());

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.output.as_deref(), Some(std::path::Path::new("/var/log/jobdash.log")));
    assert_eq!(config.display.timezone, "Europe/Berlin");
    assert_eq!(config.table.sort, "Number");
    assert!(!config.table.ascending);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ini");
    fs::write(&path, "level=debug\n").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(Some(&dir.path().join("absent.yaml"))).is_err());
}

#[test]
fn test_bad_values_are_reported() {
    let mut config = Config::default();
    config.display.timezone = "Mars/Olympus".to_string();
    assert!(config.timezone().is_err());

    config.table.sort = "Dice".to_string();
    let err = config.sort_state().unwrap_err();
    assert!(err.to_string().contains("Dice"));
}

#[test]
fn test_log_level_override_wins() {
    let config = LoggingConfig::default();
    assert_eq!(resolve_level(&config, Some("trace")).unwrap(), log::LevelFilter::Trace);
    assert!(resolve_level(&config, Some("loud")).is_err());
}
