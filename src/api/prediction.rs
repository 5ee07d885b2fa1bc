use chrono::{NaiveDate, Utc};
use log::debug;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{CachedFetcher, DataCategory, FetchRequest};
use crate::metrics::WARMUPS_SENT;
use crate::models::{ModelInfo, PredictionResult};
use crate::tokens::TokenId;

/// Optional upstream hint for where the service should pull its features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSourceHint {
    #[default]
    Auto,
    CoinGecko,
    Kraken,
}

impl DataSourceHint {
    pub const ALL: [DataSourceHint; 3] = [DataSourceHint::Auto, DataSourceHint::CoinGecko, DataSourceHint::Kraken];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(DataSourceHint::Auto),
            "coingecko" => Some(DataSourceHint::CoinGecko),
            "kraken" => Some(DataSourceHint::Kraken),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataSourceHint::Auto => "auto",
            DataSourceHint::CoinGecko => "coingecko",
            DataSourceHint::Kraken => "kraken",
        }
    }

    /// `auto` leaves the choice to the service, so nothing is sent.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            DataSourceHint::Auto => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for DataSourceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date and source a visitor asked a prediction for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionQuery {
    pub date: NaiveDate,
    pub source: DataSourceHint,
}

impl Default for PredictionQuery {
    fn default() -> Self {
        Self {
            date: Utc::now().date_naive(),
            source: DataSourceHint::Auto,
        }
    }
}

impl PredictionQuery {
    /// Unparseable values fall back to today and `auto` without complaint.
    pub fn from_params(date: Option<&str>, source: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            date: date
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
                .unwrap_or(defaults.date),
            source: source.and_then(DataSourceHint::parse).unwrap_or(defaults.source),
        }
    }
}

/// Client for one token's prediction service.
#[derive(Clone)]
pub struct PredictionClient {
    token: TokenId,
    base_url: String,
    fetcher: CachedFetcher,
    warmup_timeout: Duration,
}

impl PredictionClient {
    pub fn new(token: TokenId, base_url: String, fetcher: CachedFetcher, warmup_timeout: Duration) -> Self {
        Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
            warmup_timeout,
        }
    }

    pub fn token(&self) -> TokenId {
        self.token
    }

    pub fn predict_url(&self) -> String {
        format!("{}{}", self.base_url, self.token.profile().predict_path)
    }

    pub fn predict_request(&self, query: &PredictionQuery) -> FetchRequest {
        let request = FetchRequest::new(self.predict_url()).param("date", query.date.format("%Y-%m-%d"));
        match query.source.as_param() {
            Some(source) => request.param("source", source),
            None => request,
        }
    }

    pub async fn predict(&self, query: &PredictionQuery) -> Option<PredictionResult> {
        let request = self.predict_request(query);
        let payload = self.fetcher.fetch(DataCategory::Prediction, &request).await?;
        Some(PredictionResult::from_value(self.token.profile().coin_id, &payload))
    }

    pub async fn model_info(&self) -> Option<ModelInfo> {
        let request = FetchRequest::new(format!("{}/model_info", self.base_url));
        let payload = self.fetcher.fetch(DataCategory::ModelInfo, &request).await?;
        ModelInfo::from_value(&payload)
    }

    /// Wakes a sleeping service: one attempt, short timeout, result dropped.
    /// Bypasses retry and cache. The returned handle may be dropped; the
    /// task keeps running detached.
    pub fn warm_up(&self, query: &PredictionQuery) -> JoinHandle<()> {
        let transport = self.fetcher.fetcher().transport();
        let request = self.predict_request(query).timeout(self.warmup_timeout);
        let token = self.token;

        WARMUPS_SENT.inc();
        tokio::spawn(async move {
            match transport.get_json(&request).await {
                Ok(_) => debug!("Warm-up for {} answered", token),
                Err(e) => debug!("Warm-up for {} failed: {}", token, e),
            }
        })
    }
}
