//! Configuration for the topoctl CLI.
//!
//! One TOML file plus `TOPOCTL_*` environment overrides, resolved with
//! figment and translated into `topoctl_core` types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use topoctl_core::RouteLimits;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Topology snapshot used when `--topology` is not given.
    pub topology: Option<PathBuf>,

    /// Policy file used when `--policies` is not given.
    pub policy_file: Option<PathBuf>,

    #[serde(default)]
    pub routing: Routing,

    #[serde(default)]
    pub queue: Queue,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Routing {
    #[serde(default = "default_limit")]
    pub max_alternates: usize,

    #[serde(default = "default_limit")]
    pub max_routes: usize,
}

impl Default for Routing {
    fn default() -> Self {
        Self {
            max_alternates: default_limit(),
            max_routes: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    3
}

/// Execution queue endpoint. Without a URL, command lines go to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Queue {
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Queue {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

impl Config {
    /// Routing limits, rejecting zero caps.
    pub fn route_limits(&self) -> Result<RouteLimits, ConfigError> {
        for (field, value) in [
            ("routing.max_alternates", self.routing.max_alternates),
            ("routing.max_routes", self.routing.max_routes),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        Ok(RouteLimits {
            max_alternates: self.routing.max_alternates,
            max_routes: self.routing.max_routes,
        })
    }

    /// Parsed queue URL, if one is configured.
    pub fn queue_url(&self) -> Result<Option<Url>, ConfigError> {
        self.queue
            .url
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|_| ConfigError::Validation {
                    field: "queue.url".into(),
                    reason: format!("invalid URL: {raw}"),
                })
            })
            .transpose()
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_secs(self.queue.timeout)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "topoctl", "topoctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("topoctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TOPOCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
