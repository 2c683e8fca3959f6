//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cfgbind/cfgbind.toml`
//! 3. Explicit config file passed by the caller
//! 4. Environment variables: `CFGBIND_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::infrastructure::codec::DocumentFormat;

/// Unified configuration for cfgbind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Document format used when a file extension does not decide it
    pub format: DocumentFormat,
    /// Scalars must match natively; no parsing of their text form
    pub strict_scalars: bool,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<DocumentFormat>,
    pub strict_scalars: Option<bool>,
}

/// Get the XDG config directory for cfgbind.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cfgbind").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cfgbind.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Configuration {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Configuration {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Configuration {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            strict_scalars: overlay.strict_scalars.unwrap_or(self.strict_scalars),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional explicit config file; it must exist if given
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply CFGBIND_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CFGBIND").try_parsing(true))
            .build()
            .map_err(config_err)?;
        Self::apply_overrides(settings, &config)
    }

    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        if let Ok(val) = config.get_string("format") {
            settings.format = val.parse().map_err(|_| ApplicationError::Configuration {
                message: format!("CFGBIND_FORMAT: unknown document format '{val}'"),
            })?;
        }
        if let Ok(val) = config.get_bool("strict_scalars") {
            settings.strict_scalars = val;
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Configuration {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cfgbind configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cfgbind/cfgbind.toml
#   Local:  file given with --config
#   Env:    CFGBIND_* environment variables

# Document format when the file extension does not decide it: "yaml" | "toml"
# format = "yaml"

# Only accept natively typed scalars (no "42" for an integer field)
# strict_scalars = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let base = Settings {
            format: DocumentFormat::Toml,
            strict_scalars: false,
        };
        let overlay = RawSettings {
            format: None,
            strict_scalars: Some(true),
        };

        let merged = base.merge_with(&overlay);
        assert_eq!(merged.format, DocumentFormat::Toml);
        assert!(merged.strict_scalars);
    }

    #[test]
    fn given_override_source_when_applied_then_replaces_values() {
        let config = Config::builder()
            .add_source(File::from_str(
                "format = \"toml\"\nstrict_scalars = true",
                FileFormat::Toml,
            ))
            .build()
            .expect("config");

        let settings = Settings::apply_overrides(Settings::default(), &config).expect("apply");
        assert_eq!(settings.format, DocumentFormat::Toml);
        assert!(settings.strict_scalars);
    }

    #[test]
    fn given_unknown_format_when_applied_then_configuration_error() {
        let config = Config::builder()
            .add_source(File::from_str("format = \"xml\"", FileFormat::Toml))
            .build()
            .expect("config");

        let err = Settings::apply_overrides(Settings::default(), &config).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration { .. }));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template");
        assert!(raw.format.is_none());
    }
}
