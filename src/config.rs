// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::registry::FailedNewsPolicy;

pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_BASE_URL: &str = "STOCK_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "STOCK_API_TIMEOUT_MS";
pub const ENV_BIND_ADDR: &str = "DASHBOARD_BIND_ADDR";
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Root of the stock data service (no trailing slash needed).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on every service request. `None` waits forever.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub failed_news_policy: FailedNewsPolicy,
    /// Where the binary serves the browser-facing API.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
            failed_news_policy: FailedNewsPolicy::default(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        let cfg: DashboardConfig =
            toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        cfg.validated()
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $DASHBOARD_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = env::var(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_MS) {
            let raw = raw.trim();
            self.timeout_ms = if raw.is_empty() || raw == "0" {
                None
            } else {
                Some(
                    raw.parse()
                        .with_context(|| format!("{ENV_TIMEOUT_MS} must be milliseconds"))?,
                )
            };
        }
        if let Ok(addr) = env::var(ENV_BIND_ADDR) {
            self.bind_addr = addr;
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(anyhow!("base_url must be http(s), got {:?}", self.base_url));
        }
        // 0 means "no timeout", same as leaving it out
        if self.timeout_ms == Some(0) {
            self.timeout_ms = None;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
