//! Dashboard data model. Every type is parsed defensively from the raw JSON
//! payloads: malformed fields degrade to defaults or placeholders instead of
//! failing the view.

use serde_json::Value;

pub mod market;
pub mod prediction;

pub use market::{CoinMetadata, MarketChart, MarketSnapshot, OhlcPoint, TimeSeriesPoint};
pub use prediction::{ModelInfo, PredictionResult};

/// Reads a number, accepting numeric strings as well.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").trim_start_matches('$').parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Reads a scalar as display text.
pub(crate) fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
