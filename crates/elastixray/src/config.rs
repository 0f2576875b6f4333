//! Run configuration loaded from YAML.
//!
//! Keeps cluster coordinates and tuning knobs in a file next to the project
//! instead of retyping them on every invocation. CLI flags override file
//! values.
//!
//! # File format
//!
//! ```yaml
//! # elastixray.yaml
//! cluster: https://localhost:9200
//!
//! # Root CA of the cluster (PEM). Enables relaxed certificate checks.
//! ca: /etc/elasticsearch/certs/http_ca.crt
//!
//! # Per-request timeout.
//! timeout_secs: 30
//!
//! # Maximum number of `_analyze` calls in flight.
//! concurrency: 1
//!
//! # Text analyzed for fields without a sample value.
//! placeholder_text: "Lorem ipsum dolor sit amet"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use elastixray_core::PLACEHOLDER_TEXT;

use crate::error::{Error, Result};

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// ElastiXray run configuration.
///
/// Loaded from a YAML file via [`XrayConfig::load`], then applied to
/// [`RunOptions`](crate::RunOptions) and [`ClientOptions`](crate::ClientOptions).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XrayConfig {
    /// Base URL of the cluster (e.g., `https://localhost:9200`).
    pub cluster: Option<String>,

    /// Path to the root CA certificate of the cluster (PEM).
    pub ca: Option<PathBuf>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of concurrent `_analyze` calls.
    pub concurrency: usize,

    /// Text analyzed in place of a blank sample value.
    pub placeholder_text: String,
}

impl Default for XrayConfig {
    fn default() -> Self {
        Self {
            cluster: None,
            ca: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: 1,
            placeholder_text: PLACEHOLDER_TEXT.to_string(),
        }
    }
}

impl XrayConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// The configured cluster URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no cluster is configured.
    pub fn require_cluster(&self) -> Result<&str> {
        self.cluster.as_deref().ok_or(Error::Config {
            parameter: "cluster",
            hint: "make sure to specify a host using the -c switch",
        })
    }
}
