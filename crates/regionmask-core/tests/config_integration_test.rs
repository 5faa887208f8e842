//! Integration tests for layered mask configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! overrides > Environment variables > Config file > Defaults

use regionmask_core::config::{ConfigOverrides, ConfigSource, MaskConfig};
use regionmask_core::error::RegionmaskError;
use regionmask_core::models::{ValidityMode, WrapLon};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    env::remove_var("REGIONMASK_WRAP_LON");
    env::remove_var("REGIONMASK_DROP_EMPTY");
    env::remove_var("REGIONMASK_VALIDITY");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
wrap_lon = "To180"
drop_empty = false
"#
    )
    .unwrap();

    env::set_var("REGIONMASK_WRAP_LON", "360");
    env::set_var("REGIONMASK_DROP_EMPTY", "true");

    let config = MaskConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.wrap_lon.value, WrapLon::To360);
    assert_eq!(config.wrap_lon.source, ConfigSource::Environment);
    assert!(config.drop_empty.value);
    assert_eq!(config.drop_empty.source, ConfigSource::Environment);
    assert_eq!(config.validity.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();

    env::set_var("REGIONMASK_WRAP_LON", "sideways");
    env::set_var("REGIONMASK_VALIDITY", "sometimes");

    let config = MaskConfig::with_defaults().load_from_env();

    assert_eq!(config.wrap_lon.value, WrapLon::Auto);
    assert_eq!(config.wrap_lon.source, ConfigSource::Default);
    assert_eq!(config.validity.value, ValidityMode::Lenient);

    clear_env();
}

#[test]
#[serial]
fn test_overrides_beat_environment() {
    clear_env();

    env::set_var("REGIONMASK_VALIDITY", "lenient");

    let mut config = MaskConfig::with_defaults().load_from_env();
    config.update_from_overrides(ConfigOverrides {
        validity: Some(ValidityMode::Strict),
        ..Default::default()
    });

    assert_eq!(config.validity.value, ValidityMode::Strict);
    assert_eq!(config.validity.source, ConfigSource::Cli);

    let options = config.to_options();
    assert_eq!(options.validity, ValidityMode::Strict);
    assert_eq!(options.wrap_lon, WrapLon::Auto);

    clear_env();
}

#[test]
fn test_missing_file_is_config_error() {
    let result = MaskConfig::with_defaults().load_from_file("/nonexistent/regionmask.toml");
    assert!(matches!(result, Err(RegionmaskError::Io(_))));
}
