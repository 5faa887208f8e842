use crate::error::{RegionmaskError, Result};
use crate::models::geometry::{ValidityMode, WrapLon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided by the caller, e.g. from command-line arguments
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Options consumed by the mask engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskOptions {
    /// How grid longitudes are reconciled with region longitudes
    pub wrap_lon: WrapLon,
    /// Leave regions without any grid cell out of 3D masks
    pub drop_empty: bool,
    /// Whether invalid outlines abort the mask computation
    pub validity: ValidityMode,
}

impl MaskOptions {
    pub fn wrap_lon(mut self, wrap_lon: WrapLon) -> Self {
        self.wrap_lon = wrap_lon;
        self
    }

    pub fn drop_empty(mut self, drop_empty: bool) -> Self {
        self.drop_empty = drop_empty;
        self
    }

    pub fn validity(mut self, validity: ValidityMode) -> Self {
        self.validity = validity;
        self
    }
}

/// Layered configuration for mask computations
#[derive(Debug, Clone)]
pub struct MaskConfig {
    pub wrap_lon: ConfigValue<WrapLon>,
    pub drop_empty: ConfigValue<bool>,
    pub validity: ConfigValue<ValidityMode>,
}

impl MaskConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            wrap_lon: ConfigValue::new(WrapLon::Auto, ConfigSource::Default),
            drop_empty: ConfigValue::new(false, ConfigSource::Default),
            validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| RegionmaskError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(wrap_lon) = file_config.wrap_lon {
            self.wrap_lon.update(wrap_lon, ConfigSource::File);
        }

        if let Some(drop_empty) = file_config.drop_empty {
            self.drop_empty.update(drop_empty, ConfigSource::File);
        }

        if let Some(validity) = file_config.validity {
            self.validity.update(validity, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // REGIONMASK_WRAP_LON
        if let Ok(wrap_str) = env::var("REGIONMASK_WRAP_LON") {
            match parse_wrap_lon(&wrap_str) {
                Ok(wrap_lon) => self.wrap_lon.update(wrap_lon, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid REGIONMASK_WRAP_LON value '{}': expected auto, none, 180, or 360",
                    wrap_str
                ),
            }
        }

        // REGIONMASK_DROP_EMPTY
        if let Ok(drop_str) = env::var("REGIONMASK_DROP_EMPTY") {
            match parse_bool("drop_empty", &drop_str) {
                Ok(drop_empty) => self.drop_empty.update(drop_empty, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid REGIONMASK_DROP_EMPTY value '{}': expected true or false",
                    drop_str
                ),
            }
        }

        // REGIONMASK_VALIDITY
        if let Ok(validity_str) = env::var("REGIONMASK_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid REGIONMASK_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        self
    }

    /// Update configuration from caller-supplied overrides
    pub fn update_from_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(wrap_lon) = overrides.wrap_lon {
            self.wrap_lon.update(wrap_lon, ConfigSource::Cli);
        }

        if let Some(drop_empty) = overrides.drop_empty {
            self.drop_empty.update(drop_empty, ConfigSource::Cli);
        }

        if let Some(validity) = overrides.validity {
            self.validity.update(validity, ConfigSource::Cli);
        }
    }

    /// Resolve into the plain options used by the mask engine
    pub fn to_options(&self) -> MaskOptions {
        MaskOptions {
            wrap_lon: self.wrap_lon.value,
            drop_empty: self.drop_empty.value,
            validity: self.validity.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "wrap_lon".to_string(),
            (format!("{:?}", self.wrap_lon.value), self.wrap_lon.source),
        );

        map.insert(
            "drop_empty".to_string(),
            (self.drop_empty.value.to_string(), self.drop_empty.source),
        );

        map.insert(
            "validity".to_string(),
            (format!("{:?}", self.validity.value), self.validity.source),
        );

        map
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    wrap_lon: Option<WrapLon>,
    drop_empty: Option<bool>,
    validity: Option<ValidityMode>,
}

/// Caller-supplied configuration overrides
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub wrap_lon: Option<WrapLon>,
    pub drop_empty: Option<bool>,
    pub validity: Option<ValidityMode>,
}

/// Parse longitude wrapping from string
pub fn parse_wrap_lon(s: &str) -> Result<WrapLon> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(WrapLon::Auto),
        "none" | "off" | "false" => Ok(WrapLon::Disabled),
        "180" => Ok(WrapLon::To180),
        "360" => Ok(WrapLon::To360),
        _ => Err(RegionmaskError::ConfigInvalid {
            key: "wrap_lon".to_string(),
            reason: format!("Invalid longitude wrapping: {}. Use auto, none, 180, or 360", s),
        }),
    }
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(RegionmaskError::ConfigInvalid {
            key: "validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}

/// Parse a boolean flag from string
pub fn parse_bool(key: &str, s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(RegionmaskError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}
