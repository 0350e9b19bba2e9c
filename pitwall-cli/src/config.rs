use std::env;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: Gateway,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Gateway {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
}

impl Config {
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let buf = fs::read(path)?;

        Ok(toml::from_slice(&buf)?)
    }

    /// Environment variables take precedence over the file.
    pub fn with_environment(mut self) -> Self {
        if let Ok(url) = env::var("PITWALL_GATEWAY_URL") {
            self.gateway.url = url;
        }

        if let Ok(key) = env::var("PITWALL_GATEWAY_KEY") {
            self.gateway.key = key;
        }

        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
