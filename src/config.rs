//! TOML configuration shared by the binaries.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::resolver::ResolverOptions;
use crate::store::DataPaths;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataPaths,
    #[serde(default)]
    pub resolver: ResolverOptions,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config
            .resolver
            .validate()
            .context("Invalid [resolver] section")?;
        Ok(config)
    }
}
