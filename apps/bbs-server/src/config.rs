//! Layered server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file given
//! with `--config`, `BBS__*` environment variables (`__` separates nesting,
//! e.g. `BBS__SERVER__PORT`), then command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use user_profile::UserProfileConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub user_profile: UserProfileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bbs.db?mode=rwc".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails when a source cannot be read or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("BBS__").split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Applies `--port` and `-v` on top of the loaded sources.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) {
        if let Some(port) = port {
            self.server.port = port;
        }
        match verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// # Errors
    ///
    /// Only if serialization fails, which the plain config types never do.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }
}
