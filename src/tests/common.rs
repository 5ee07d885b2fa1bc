#![cfg(test)]
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::api::{DataServices, FetchRequest, Transport};
use crate::config::Config;
use crate::error::{Error, Result};

pub const COINGECKO_URL: &str = "http://coingecko.test/api/v3";

/// Answers requests whose URL ends with a registered suffix; everything
/// else fails like a timed-out upstream. Every call is recorded.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    routes: Vec<(String, Value)>,
    calls: Arc<Mutex<Vec<FetchRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// No route answers.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn route(mut self, url_suffix: &str, payload: Value) -> Self {
        self.routes.push((url_suffix.to_string(), payload));
        self
    }

    /// Shared handle on the recorded calls; stays valid after the transport
    /// is moved into the services.
    pub fn calls(&self) -> Arc<Mutex<Vec<FetchRequest>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, request: &FetchRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        self.routes
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| Error::ApiConnectionFailed(format!("{}: operation timed out", request.url)))
    }
}

pub fn count_calls(calls: &Arc<Mutex<Vec<FetchRequest>>>, url_suffix: &str) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|request| request.url.ends_with(url_suffix))
        .count()
}

// Helper to create a default test config
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.api.coingecko_base_url = COINGECKO_URL.to_string();
    config.prediction.ethereum_url = "http://eth.predict.test".to_string();
    config.prediction.solana_url = "http://sol.predict.test".to_string();
    config.prediction.xrp_url = "http://xrp.predict.test".to_string();
    config.prediction.bitcoin_url = "http://btc.predict.test".to_string();
    config
}

pub fn sample_services(transport: ScriptedTransport) -> DataServices {
    DataServices::from_config(&create_test_config(), Arc::new(transport))
}

pub fn simple_price_payload(coin_id: &str) -> Value {
    json!({
        coin_id: {
            "usd": 3120.45,
            "usd_market_cap": 375_000_000_000.0,
            "usd_24h_vol": 18_500_000_000.0,
            "usd_24h_change": 2.3456,
            "last_updated_at": 1_730_000_000
        }
    })
}

pub fn ohlc_payload() -> Value {
    json!([
        [1_729_900_000_000i64, 3000.0, 3150.0, 2980.0, 3100.0],
        [1_729_914_400_000i64, 3100.0, 3180.0, 3050.0, 3120.0]
    ])
}

pub fn market_chart_payload() -> Value {
    json!({
        "prices": [[1_729_900_000_000i64, 3000.0], [1_729_986_400_000i64, 3120.0]],
        "market_caps": [[1_729_900_000_000i64, 360_000_000_000.0], [1_729_986_400_000i64, 375_000_000_000.0]],
        "total_volumes": [[1_729_900_000_000i64, 17_000_000_000.0], [1_729_986_400_000i64, 18_500_000_000.0]]
    })
}

pub fn prediction_payload() -> Value {
    json!({
        "token": "ethereum",
        "predicted_high": 3350.75,
        "predicted_time_of_high": "14:00 UTC",
        "generated_at": "2025-11-02T09:58:00Z"
    })
}
