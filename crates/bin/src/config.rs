//! Application configuration.
//!
//! Values come from an optional JSON file; command-line flags override them.

use incomeclass::{ServiceConfig, UnknownLabelPolicy};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid bind address '{0}'")]
    BindAddr(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Model artifact path.
    pub(crate) model_path: PathBuf,

    /// Encoding schema path; built-in tables when unset.
    pub(crate) schema_path: Option<PathBuf>,

    /// Handling of unknown categorical labels.
    pub(crate) unknown_labels: UnknownLabelPolicy,

    /// Address the web form listens on.
    pub(crate) bind_addr: String,

    /// Largest accepted request body.
    pub(crate) max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            model_path: service.model_path,
            schema_path: service.schema_path,
            unknown_labels: service.unknown_labels,
            bind_addr: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Read the config file, or use defaults when none is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command-line overrides.
    pub(crate) fn with_overrides(
        mut self,
        model: Option<PathBuf>,
        schema: Option<PathBuf>,
        unknown_labels: Option<UnknownLabelPolicy>,
    ) -> Self {
        if let Some(model) = model {
            self.model_path = model;
        }
        if schema.is_some() {
            self.schema_path = schema;
        }
        if let Some(policy) = unknown_labels {
            self.unknown_labels = policy;
        }
        self
    }

    pub(crate) fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::BindAddr(self.bind_addr.clone()))
    }

    pub(crate) fn service(&self) -> ServiceConfig {
        ServiceConfig {
            model_path: self.model_path.clone(),
            schema_path: self.schema_path.clone(),
            unknown_labels: self.unknown_labels,
        }
    }
}
