use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tokens::TokenId;
use crate::utils::cache::{CacheKey, TtlCache};

pub mod coingecko;
pub mod fetcher;
pub mod prediction;

pub use coingecko::CoinGeckoClient;
pub use fetcher::{CachedFetcher, DataCategory, Fetcher};
pub use prediction::{DataSourceHint, PredictionClient, PredictionQuery};

/// One upstream GET: endpoint, query parameters and per-call options.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Headers are deliberately left out: they carry credentials, not identity.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.url, &self.params)
    }
}

/// A single HTTP attempt returning parsed JSON. Retrying and caching are
/// layered on top in [`Fetcher`] and [`CachedFetcher`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, request: &FetchRequest) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(default_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(default_timeout)
            .user_agent(concat!("forecast-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, request: &FetchRequest) -> Result<Value> {
        let mut builder = self.client.get(&request.url).query(&request.params);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!("GET {}", request.cache_key());
        let response = builder
            .send()
            .await
            .map_err(|e| Error::ApiConnectionFailed(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::ApiInvalidFormat(format!("{}: {}", request.url, e)))
    }
}

/// Every upstream client the pages need, sharing one transport and one cache.
#[derive(Clone)]
pub struct DataServices {
    market: CoinGeckoClient,
    predictions: HashMap<TokenId, PredictionClient>,
}

impl DataServices {
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let fetcher = Fetcher::new(transport, &config.fetch);
        let cached = CachedFetcher::new(fetcher, TtlCache::new(), config.cache.clone());

        let market = CoinGeckoClient::new(
            config.api.coingecko_base_url.clone(),
            config
                .api
                .coingecko_api_key
                .clone()
                .map(|key| (config.api.coingecko_api_key_header.clone(), key)),
            cached.clone(),
        );
        let predictions = TokenId::ALL
            .into_iter()
            .map(|token| {
                let client = PredictionClient::new(
                    token,
                    config.prediction.base_url(token).to_string(),
                    cached.clone(),
                    config.api.warmup_timeout(),
                );
                (token, client)
            })
            .collect();

        Self { market, predictions }
    }

    pub fn market(&self) -> &CoinGeckoClient {
        &self.market
    }

    pub fn prediction(&self, token: TokenId) -> &PredictionClient {
        // from_config fills every TokenId
        &self.predictions[&token]
    }

    pub fn cache(&self) -> &TtlCache<Option<Value>> {
        self.market.fetcher().cache()
    }
}
