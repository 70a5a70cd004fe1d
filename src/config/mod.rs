//! Configuration module

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub dot: DotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Dot. cloud API access
#[derive(Debug, Clone, Deserialize)]
pub struct DotConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            scan_interval_secs: default_scan_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://dot.mindreset.tech";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_scan_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("DOTQUOTE").separator("__"))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the poller cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dot.api_key.trim().is_empty() {
            anyhow::bail!("dot.api_key is required (set DOTQUOTE__DOT__API_KEY)");
        }
        if self.dot.scan_interval_secs == 0 {
            anyhow::bail!("dot.scan_interval_secs must be at least 1");
        }
        if self.dot.request_timeout_secs == 0 {
            anyhow::bail!("dot.request_timeout_secs must be at least 1");
        }
        url::Url::parse(&self.dot.base_url)
            .map_err(|e| anyhow::anyhow!("dot.base_url is not a valid URL: {}", e))?;
        Ok(())
    }
}
