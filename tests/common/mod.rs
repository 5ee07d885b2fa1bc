#![allow(dead_code)]
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use forecast_portal::api::{DataServices, FetchRequest, Transport};
use forecast_portal::config::Config;
use forecast_portal::error::{Error, Result};

pub const COINGECKO_URL: &str = "http://coingecko.test/api/v3";
pub const ETH_PREDICT_URL: &str = "http://eth.predict.test";

type CallLog = Arc<Mutex<Vec<FetchRequest>>>;

/// Canned upstream: URL suffix -> payload, anything else times out.
#[derive(Clone, Default)]
pub struct FakeUpstream {
    routes: Vec<(String, Value)>,
    calls: CallLog,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url_suffix: &str, payload: Value) -> Self {
        self.routes.push((url_suffix.to_string(), payload));
        self
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Transport for FakeUpstream {
    async fn get_json(&self, request: &FetchRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        self.routes
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| Error::ApiConnectionFailed(format!("{}: operation timed out", request.url)))
    }
}

/// Calls to `url_suffix` that went through the retrying fetcher (warm-ups
/// carry their own timeout and are excluded).
pub fn fetch_calls(calls: &CallLog, url_suffix: &str) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|request| request.url.ends_with(url_suffix) && request.timeout.is_none())
        .count()
}

pub fn warmup_calls(calls: &CallLog, url_suffix: &str) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|request| request.url.ends_with(url_suffix) && request.timeout.is_some())
        .count()
}

// Helper to create a default test config
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.api.coingecko_base_url = COINGECKO_URL.to_string();
    config.prediction.ethereum_url = ETH_PREDICT_URL.to_string();
    config.prediction.solana_url = "http://sol.predict.test".to_string();
    config.prediction.xrp_url = "http://xrp.predict.test".to_string();
    config.prediction.bitcoin_url = "http://btc.predict.test".to_string();
    config
}

pub fn services(upstream: FakeUpstream) -> DataServices {
    DataServices::from_config(&create_test_config(), Arc::new(upstream))
}

pub fn ethereum_market() -> FakeUpstream {
    FakeUpstream::new()
        .route(
            "/simple/price",
            json!({
                "ethereum": {
                    "usd": 3120.45,
                    "usd_market_cap": 375_000_000_000.0,
                    "usd_24h_vol": 18_500_000_000.0,
                    "usd_24h_change": 2.3456
                }
            }),
        )
        .route(
            "/coins/ethereum/ohlc",
            json!([
                [1_729_900_000_000i64, 3000.0, 3150.0, 2980.0, 3100.0],
                [1_729_914_400_000i64, 3100.0, 3180.0, 3050.0, 3120.0]
            ]),
        )
        .route(
            "/coins/ethereum/market_chart",
            json!({
                "prices": [[1_729_900_000_000i64, 3000.0]],
                "market_caps": [[1_729_900_000_000i64, 360_000_000_000.0]],
                "total_volumes": [[1_729_900_000_000i64, 17_000_000_000.0]]
            }),
        )
        .route(
            "/coins/ethereum",
            json!({
                "name": "Ethereum",
                "symbol": "eth",
                "hashing_algorithm": "Ethash",
                "categories": ["Smart Contract Platform"],
                "links": { "homepage": ["https://www.ethereum.org/"], "blockchain_site": ["https://etherscan.io/"] }
            }),
        )
}
