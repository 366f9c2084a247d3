//! CLI configuration: thin wrapper around `topoctl_config`.
//!
//! Resolves file paths, limits, and the queue endpoint with `GlobalOpts`
//! flags taking priority over the config file and environment.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use topoctl_core::{PolicyStore, RoutePlanner, Topology, TopologySnapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::queue::{QueueClient, Sink};

pub use topoctl_config::{Config, config_path, load_config_from};

/// Everything a command needs, resolved once per invocation.
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
}

impl Context {
    pub fn load(global: GlobalOpts) -> Result<Self, CliError> {
        let path = active_config_path(&global);
        let config = load_config_from(&path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(Self { global, config })
    }

    pub fn planner(&self) -> Result<RoutePlanner, CliError> {
        Ok(RoutePlanner::new(self.config.route_limits()?))
    }

    /// Read and validate the topology snapshot.
    pub fn topology(&self) -> Result<Topology, CliError> {
        let path = self
            .global
            .topology
            .clone()
            .or_else(|| self.config.topology.clone())
            .ok_or_else(|| CliError::NoTopology {
                config_path: active_config_path(&self.global).display().to_string(),
            })?;
        let text = read(&path)?;
        let snapshot: TopologySnapshot =
            serde_json::from_str(&text).map_err(|e| CliError::InvalidTopology {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Topology::try_from(snapshot).map_err(|e| CliError::InvalidTopology {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn policy_path(&self) -> Option<PathBuf> {
        self.global
            .policies
            .clone()
            .or_else(|| self.config.policy_file.clone())
    }

    /// Load the policy file; no file configured or present means no policies.
    pub fn policies(&self) -> Result<PolicyStore, CliError> {
        let Some(path) = self.policy_path() else {
            return Ok(PolicyStore::new());
        };
        if !path.exists() {
            debug!(path = %path.display(), "policy file absent, starting empty");
            return Ok(PolicyStore::new());
        }
        let (store, skipped) = PolicyStore::parse(&read(&path)?);
        if !skipped.is_empty() {
            tracing::warn!(
                path = %path.display(),
                skipped = skipped.len(),
                "ignored unparsable policy lines"
            );
        }
        Ok(store)
    }

    /// The policy file `--save` writes to. Checked before anything is emitted.
    pub fn policy_file(&self) -> Result<PathBuf, CliError> {
        self.policy_path().ok_or_else(|| CliError::Validation {
            field: "--save".into(),
            reason: "no policy file configured; pass --policies <FILE>".into(),
        })
    }

    /// Write `store` back to the policy file.
    pub fn save_policies(&self, store: &PolicyStore) -> Result<(), CliError> {
        let path = self.policy_file()?;
        std::fs::write(&path, store.to_file_string())?;
        debug!(path = %path.display(), policies = store.len(), "saved policy file");
        Ok(())
    }

    /// Where emitted command lines go.
    pub fn sink(&self) -> Result<Sink, CliError> {
        let url = match &self.global.queue_url {
            Some(raw) => Some(raw.parse::<Url>().map_err(|_| CliError::Validation {
                field: "--queue-url".into(),
                reason: format!("invalid URL: {raw}"),
            })?),
            None => self.config.queue_url()?,
        };
        match url {
            Some(url) => Ok(Sink::Queue(QueueClient::new(
                url,
                self.config.queue_timeout(),
            )?)),
            None => Ok(Sink::Stdout),
        }
    }
}

fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}
