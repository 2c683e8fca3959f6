//! Integration tests for Settings layered loading.
//!
//! Note: These tests only use explicit config files in temp directories and
//! assume no CFGBIND_* variables are set in the test environment.

use std::fs;

use tempfile::TempDir;

use cfgbind::application::ApplicationError;
use cfgbind::config::{RawSettings, Settings};
use cfgbind::infrastructure::codec::DocumentFormat;

#[test]
fn given_explicit_file_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfgbind.toml");
    fs::write(&path, "format = \"toml\"\nstrict_scalars = true\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.format, DocumentFormat::Toml);
    assert!(settings.strict_scalars);
}

#[test]
fn given_partial_file_when_load_then_other_fields_inherit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfgbind.toml");
    fs::write(&path, "strict_scalars = true\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert!(settings.strict_scalars);
    assert_eq!(settings.format, Settings::default().format);
}

#[test]
fn given_malformed_file_when_load_then_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfgbind.toml");
    fs::write(&path, "format = [").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Configuration { .. }));
    assert!(err.to_string().contains("cfgbind.toml"));
}

#[test]
fn given_unknown_format_in_file_when_load_then_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfgbind.toml");
    fs::write(&path, "format = \"xml\"\n").unwrap();

    assert!(matches!(
        Settings::load(Some(&path)),
        Err(ApplicationError::Configuration { .. })
    ));
}

#[test]
fn given_missing_explicit_file_when_load_then_configuration_error() {
    let dir = TempDir::new().unwrap();

    let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ApplicationError::Configuration { .. }));
}

#[test]
fn given_settings_when_shown_as_toml_then_parses_back() {
    let settings = Settings {
        format: DocumentFormat::Toml,
        strict_scalars: true,
    };

    let text = settings.to_toml().expect("to_toml");
    let raw: RawSettings = toml::from_str(&text).expect("parse");

    assert_eq!(Settings::default().merge_with(&raw), settings);
}
