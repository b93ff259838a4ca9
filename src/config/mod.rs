use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analytics::default_department_mapping;
use crate::client::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub api_server: ServerConfig,
    /// cpu model -> department, used by `aggregate=department`
    pub department_mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the emissions tracking service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Bearer credential; `None` means demo data only
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "UpstreamConfig::default_base_url")]
    pub base_url: String,
    /// Serve demo data even when a credential is configured
    #[serde(default)]
    pub prefer_mock: bool,
    /// Delay demo responses like a network round trip would
    #[serde(default = "UpstreamConfig::default_mock_latency")]
    pub mock_latency: bool,
    #[serde(default = "UpstreamConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    const fn default_mock_latency() -> bool {
        true
    }

    const fn default_timeout_secs() -> u64 {
        10
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            prefer_mock: false,
            mock_latency: Self::default_mock_latency(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("CODECARBON_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let base_url = std::env::var("CODECARBON_BASE_URL")
            .unwrap_or_else(|_| UpstreamConfig::default_base_url());

        let prefer_mock = env_flag("CODECARBON_PREFER_MOCK").unwrap_or(false);
        let mock_latency = env_flag("CODECARBON_MOCK_LATENCY")
            .unwrap_or_else(UpstreamConfig::default_mock_latency);

        let timeout_secs = std::env::var("CODECARBON_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(UpstreamConfig::default_timeout_secs);

        let department_mapping = match std::env::var("CODECARBON_DEPARTMENT_MAPPING") {
            Ok(raw) => serde_json::from_str::<HashMap<String, String>>(&raw)
                .context("CODECARBON_DEPARTMENT_MAPPING must be a JSON object of cpu model to department")?,
            Err(_) => default_department_mapping(),
        };

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        if api_key.is_none() {
            tracing::info!("CODECARBON_API_KEY is not set, serving demo data only");
        }

        Ok(Config {
            upstream: UpstreamConfig {
                api_key,
                base_url,
                prefer_mock,
                mock_latency,
                timeout_secs,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            department_mapping,
        })
    }
}
