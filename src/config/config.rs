//! Config file handling

use crate::codegen::Style;
use crate::errors::CurlgenieError;
use std::path::PathBuf;

/// Overrides the config directory, mainly for tests
pub const CONFIG_DIR_ENV: &str = "CURLGENIE_CONFIG_DIR";

/// curlgenie configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Flags prepended to every invocation
    pub default_options: Vec<String>,
    /// Style used when `--style` is not given
    pub default_style: Option<Style>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            default_options: Vec::new(),
            default_style: None,
        }
    }
}

impl Config {
    /// Load configuration from the config file (TOML format)
    pub fn load() -> Result<Self, CurlgenieError> {
        Self::load_from(Self::default_config_dir())
    }

    pub fn load_from(config_dir: PathBuf) -> Result<Self, CurlgenieError> {
        let config_file = config_dir.join("config.toml");

        if !config_file.exists() {
            return Ok(Self { config_dir, ..Self::default() });
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| CurlgenieError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content, config_dir)
    }

    fn parse(content: &str, config_dir: PathBuf) -> Result<Self, CurlgenieError> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| CurlgenieError::Config(format!("Invalid config TOML: {}", e)))?;

        let defaults = toml_value.get("defaults");

        let default_options = defaults
            .and_then(|d| d.get("options"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let default_style = match defaults.and_then(|d| d.get("style")) {
            None => None,
            Some(value) => {
                let name = value.as_str().ok_or_else(|| {
                    CurlgenieError::Config("defaults.style must be a string".to_string())
                })?;
                let style = name
                    .parse::<Style>()
                    .map_err(|e| CurlgenieError::Config(e.to_string()))?;
                Some(style)
            }
        };

        Ok(Self {
            config_dir,
            default_options,
            default_style,
        })
    }

    /// `$CURLGENIE_CONFIG_DIR`, else the platform config dir
    pub fn default_config_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        dirs::config_dir()
            .map(|d| d.join("curlgenie"))
            .unwrap_or_else(|| PathBuf::from(".curlgenie"))
    }
}
