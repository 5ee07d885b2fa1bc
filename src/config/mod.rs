use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tokens::TokenId;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub prediction: PredictionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub coingecko_api_key_header: String,
    pub request_timeout_secs: u64,
    pub warmup_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            coingecko_api_key: None,
            coingecko_api_key_header: "x-cg-demo-api-key".to_string(),
            request_timeout_secs: 25,
            warmup_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_secs(self.warmup_timeout_secs)
    }
}

/// Retry policy shared by every upstream call. Attempts and delay are fixed;
/// no status code is treated specially.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub snapshot_ttl_secs: u64,
    pub metadata_ttl_secs: u64,
    pub history_ttl_secs: u64,
    pub prediction_ttl_secs: u64,
    pub model_info_ttl_secs: u64,
    /// Memoize failed fetches for the category TTL as well.
    pub cache_failures: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_ttl_secs: 300,
            metadata_ttl_secs: 600,
            history_ttl_secs: 600,
            prediction_ttl_secs: 900,
            model_info_ttl_secs: 1800,
            cache_failures: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PredictionConfig {
    pub ethereum_url: String,
    pub solana_url: String,
    pub xrp_url: String,
    pub bitcoin_url: String,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            ethereum_url: "https://fastapiethereum.onrender.com".to_string(),
            solana_url: "https://predict-solana-api.onrender.com".to_string(),
            xrp_url: "https://at3-24669044-fastapi-1.onrender.com".to_string(),
            bitcoin_url: "https://at3-g-1-25142441-api.onrender.com".to_string(),
        }
    }
}

impl PredictionConfig {
    pub fn base_url(&self, token: TokenId) -> &str {
        let url = match token {
            TokenId::Ethereum => &self.ethereum_url,
            TokenId::Solana => &self.solana_url,
            TokenId::Xrp => &self.xrp_url,
            TokenId::Bitcoin => &self.bitcoin_url,
        };
        url.trim_end_matches('/')
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Where the base configuration came from, before environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Loads the file when present, falls back to defaults otherwise, then
    /// applies environment overrides (including a `.env` file). Nothing is
    /// logged here: the logger is configured from the result, so the caller
    /// reports the [`ConfigSource`] once logging is up.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource)> {
        dotenv::dotenv().ok();
        let (mut config, source) = if path.exists() {
            (Self::load(path)?, ConfigSource::File(path.to_path_buf()))
        } else {
            (Config::default(), ConfigSource::Defaults)
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok((config, source))
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("COINGECKO_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api.coingecko_api_key = Some(key);
        }
        if let Some(url) = lookup("COINGECKO_BASE_URL") {
            self.api.coingecko_base_url = url;
        }
        if let Some(url) = lookup("PREDICT_ETHEREUM_URL") {
            self.prediction.ethereum_url = url;
        }
        if let Some(url) = lookup("PREDICT_SOLANA_URL") {
            self.prediction.solana_url = url;
        }
        if let Some(url) = lookup("PREDICT_XRP_URL") {
            self.prediction.xrp_url = url;
        }
        if let Some(url) = lookup("PREDICT_BITCOIN_URL") {
            self.prediction.bitcoin_url = url;
        }
        if let Some(host) = lookup("PORTAL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORTAL_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORTAL_PORT is not a valid port: {}", port))?;
        }
        Ok(())
    }
}
