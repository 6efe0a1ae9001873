//! Operator configuration for the relay CLI.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use relay_core::RelayConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from an optional TOML file and `RELAY_*` environment variables.
///
/// Nested relay limits use a double underscore in the environment, e.g.
/// `RELAY_RELAY__MAX_MESSAGE_LEN=140`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of the sled database holding the relay snapshot.
    pub state_path: PathBuf,
    pub log_level: String,
    /// `pretty` or `plain`.
    pub log_format: String,
    pub relay: RelayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("./data/relay"),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            relay: RelayConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(config_path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(env);

        let config: AppConfig = builder
            .build()?
            .try_deserialize()
            .context("invalid relay configuration")?;
        config.relay.validate()?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RELAY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
