use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use servicearea_core::ServiceAreaConfig;

/// Server configuration read from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Street graph in node-link JSON
    pub graph_path: Option<PathBuf>,
    pub service_area: ServiceAreaConfig,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            graph_path: None,
            service_area: ServiceAreaConfig::default(),
            request_timeout_secs: 30,
            max_concurrency: 64,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("invalid server configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.service_area.validate()?;
        anyhow::ensure!(self.max_concurrency > 0, "max_concurrency must be positive");
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        Ok(())
    }
}
