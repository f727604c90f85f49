//! Layered configuration.
//!
//! Precedence, lowest to highest: built-in defaults, global config file,
//! workspace file (`./histree.toml`), HISTREE__-prefixed environment
//! variables. CLI flags override whatever was loaded.

use crate::logging::LoggingConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistreeConfig {
    /// Root directory for cached clones.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Request commit hash and subject in the extraction header.
    #[serde(default)]
    pub details: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("repos-cache")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl Default for HistreeConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            output_dir: default_output_dir(),
            details: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from standard sources.
    pub fn load() -> Result<HistreeConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(global) = Self::global_config_path() {
            builder = builder.add_source(File::from(global).required(false));
        }
        builder
            .add_source(File::with_name("histree").required(false))
            .add_source(
                Environment::with_prefix("HISTREE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a specific file, with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<HistreeConfig, ConfigError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(
                Environment::with_prefix("HISTREE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Global config file path (platform config dir, histree/config.toml).
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "histree", "histree")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
