//! Configuration for command managers
//!
//! Settings and message catalogs are plain serde structs stored as TOML.
//! Any such type gets load/save/reload through [`TomlConfig`].
//!
//! # Example
//!
//! ```ignore
//! use acf_core::config::{messages_path, ManagerConfig, TomlConfig};
//! use acf_core::messages::Messages;
//!
//! let config = ManagerConfig::load(&path)?;
//! let messages = Messages::load(&messages_path(&base, "my_plugin"))?;
//! ```

mod loader;

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use loader::{manager_config_path, messages_path, plugin_config_dir};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write a config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A setting or combination of settings is not allowed
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// TOML persistence for settings types.
///
/// Requires `Default` so a missing file can be generated.
pub trait TomlConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// Load from `path`, writing the defaults there first if the file is missing
    fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(path)?;
            tracing::info!("Created default config at {:?}", path);
            Ok(default)
        }
    }

    /// Save to `path`, creating parent directories
    fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Replace `self` with the current contents of `path`
    fn reload(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded config from {:?}", path);
        Ok(())
    }
}

/// Manager-wide behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Marker that introduces a flag token (`--verbose`, `--count=3`).
    /// Empty disables flag extraction.
    pub flag_prefix: String,

    /// Entries per help page
    pub help_per_page: usize,

    /// Log handler errors no exception handler claimed
    pub log_unhandled_exceptions: bool,

    /// Accept `/tag add` as well as `tag add`
    pub strip_leading_slash: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            flag_prefix: "--".to_string(),
            help_per_page: 10,
            log_unhandled_exceptions: true,
            strip_leading_slash: true,
        }
    }
}

impl ManagerConfig {
    /// Check settings that would break dispatch
    pub fn validate(&self) -> ConfigResult<()> {
        if self.help_per_page == 0 {
            return Err(ConfigError::InvalidSetting(
                "help_per_page must be at least 1".to_string(),
            ));
        }
        if self.flag_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidSetting(
                "flag_prefix may not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

impl TomlConfig for ManagerConfig {}
