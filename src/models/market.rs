use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{as_number, as_text};

/// Live quote for one coin from the simple-price endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub coin_id: String,
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub observed_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Reads the `<coin_id>` sub-object. Missing fields inside it count as 0;
    /// a payload without the sub-object is no snapshot at all.
    pub fn from_simple_price(coin_id: &str, payload: &Value) -> Option<Self> {
        let quote = payload.get(coin_id)?.as_object()?;
        let field = |key: &str| quote.get(key).and_then(as_number).unwrap_or(0.0);

        let observed_at = quote
            .get("last_updated_at")
            .and_then(as_number)
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .unwrap_or_else(Utc::now);

        Some(Self {
            coin_id: coin_id.to_string(),
            price: field("usd"),
            change_24h: field("usd_24h_change"),
            market_cap: field("usd_market_cap"),
            volume_24h: field("usd_24h_vol"),
            observed_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcPoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcPoint {
    /// Parses `[[ms, open, high, low, close], ...]`. Malformed rows are
    /// skipped, so gaps shorten the series rather than failing it.
    pub fn series_from(payload: &Value) -> Vec<OhlcPoint> {
        let Some(rows) = payload.as_array() else {
            return Vec::new();
        };
        rows.iter()
            .filter_map(|row| {
                let row = row.as_array()?;
                if row.len() < 5 {
                    return None;
                }
                let timestamp = millis_to_datetime(&row[0])?;
                Some(OhlcPoint {
                    timestamp,
                    open: as_number(&row[1])?,
                    high: as_number(&row[2])?,
                    low: as_number(&row[3])?,
                    close: as_number(&row[4])?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Parses `[[ms, value], ...]`, skipping malformed rows.
    pub fn series_from(payload: &Value) -> Vec<TimeSeriesPoint> {
        let Some(rows) = payload.as_array() else {
            return Vec::new();
        };
        rows.iter()
            .filter_map(|row| {
                let row = row.as_array()?;
                Some(TimeSeriesPoint {
                    timestamp: millis_to_datetime(row.first()?)?,
                    value: as_number(row.get(1)?)?,
                })
            })
            .collect()
    }
}

/// Price, market-cap and volume trend lines from the market-chart endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<TimeSeriesPoint>,
    pub market_caps: Vec<TimeSeriesPoint>,
    pub total_volumes: Vec<TimeSeriesPoint>,
}

impl MarketChart {
    pub fn from_value(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        let series = |key: &str| object.get(key).map(TimeSeriesPoint::series_from).unwrap_or_default();
        Some(Self {
            prices: series("prices"),
            market_caps: series("market_caps"),
            total_volumes: series("total_volumes"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty() && self.market_caps.is_empty() && self.total_volumes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub name: String,
    pub symbol: String,
    pub logo: Option<String>,
    pub hashing_algorithm: Option<String>,
    pub categories: Vec<String>,
    pub homepage: Option<String>,
    pub explorer: Option<String>,
}

impl CoinMetadata {
    /// `fallback_name`/`fallback_symbol` fill in when the payload omits them.
    pub fn from_value(payload: &Value, fallback_name: &str, fallback_symbol: &str) -> Option<Self> {
        let object = payload.as_object()?;
        let first_link = |key: &str| {
            payload
                .pointer(&format!("/links/{}", key))
                .and_then(Value::as_array)
                .and_then(|links| links.first())
                .and_then(as_text)
        };

        Some(Self {
            name: object.get("name").and_then(as_text).unwrap_or_else(|| fallback_name.to_string()),
            symbol: object
                .get("symbol")
                .and_then(as_text)
                .unwrap_or_else(|| fallback_symbol.to_string())
                .to_uppercase(),
            logo: payload.pointer("/image/large").and_then(as_text),
            hashing_algorithm: object.get("hashing_algorithm").and_then(as_text),
            categories: object
                .get("categories")
                .and_then(Value::as_array)
                .map(|cats| cats.iter().filter_map(as_text).collect())
                .unwrap_or_default(),
            homepage: first_link("homepage"),
            explorer: first_link("blockchain_site"),
        })
    }
}

fn millis_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let millis = as_number(value)? as i64;
    DateTime::from_timestamp_millis(millis)
}
