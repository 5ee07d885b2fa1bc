use serde::Serialize;
use serde_json::Value;

use super::{as_number, as_text};

const HIGH_KEYS: &[&str] = &[
    "predicted_high",
    "predicted_next_day_high",
    "predicted_high_usd",
    "Predicted Next-Day HIGH (USD)",
    "prediction",
];
const TIME_KEYS: &[&str] = &[
    "predicted_time_of_high",
    "predicted_time",
    "Predicted Time of HIGH",
];
const GENERATED_KEYS: &[&str] = &[
    "generated_at",
    "prediction_generated_on",
    "Prediction Generated On",
    "timestamp",
];
const SOURCE_KEYS: &[&str] = &["source", "data_source", "Data Source"];
const TOKEN_KEYS: &[&str] = &["token", "coin", "symbol"];
const NESTED_KEYS: &[&str] = &["prediction", "result", "data"];

pub const DEFAULT_SOURCE: &str = "CoinGecko";

/// Output of a remote prediction service. The payload is opaque; known
/// fields are picked out where present and the raw document is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub token: String,
    pub predicted_high: Option<f64>,
    pub predicted_time: Option<String>,
    pub generated_at: Option<String>,
    pub source: String,
    pub raw: Value,
}

impl PredictionResult {
    pub fn from_value(default_token: &str, payload: &Value) -> Self {
        Self {
            token: lookup(payload, TOKEN_KEYS)
                .and_then(as_text)
                .unwrap_or_else(|| default_token.to_string()),
            predicted_high: lookup_with(payload, HIGH_KEYS, as_number),
            predicted_time: lookup(payload, TIME_KEYS).and_then(as_text),
            generated_at: lookup(payload, GENERATED_KEYS).and_then(as_text),
            source: lookup(payload, SOURCE_KEYS)
                .and_then(as_text)
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            raw: payload.clone(),
        }
    }
}

/// Model description from the service's model-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub algorithm: Option<String>,
    pub trained_token: Option<String>,
    pub training_period: Option<String>,
    pub feature_count: Option<String>,
    pub features: Vec<String>,
}

impl ModelInfo {
    pub fn from_value(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        let text = |key: &str| object.get(key).and_then(as_text);
        let features: Vec<String> = object
            .get("features_used")
            .or_else(|| object.get("features"))
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(as_text).collect())
            .unwrap_or_default();

        Some(Self {
            algorithm: text("algorithm"),
            trained_token: text("trained_token"),
            training_period: text("training_period"),
            feature_count: text("feature_count").or_else(|| {
                (!features.is_empty()).then(|| features.len().to_string())
            }),
            features,
        })
    }
}

/// First match for any alias, at the top level or one nested object down.
fn lookup<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = payload.as_object()?;
    let direct = keys
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null() && !value.is_object());
    direct.or_else(|| {
        NESTED_KEYS
            .iter()
            .filter_map(|nested| object.get(*nested))
            .filter(|value| value.is_object())
            .find_map(|inner| lookup(inner, keys))
    })
}

fn lookup_with<T>(payload: &Value, keys: &[&str], parse: fn(&Value) -> Option<T>) -> Option<T> {
    let object = payload.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(parse)
        .or_else(|| {
            NESTED_KEYS
                .iter()
                .filter_map(|nested| object.get(*nested))
                .find_map(|inner| lookup_with(inner, keys, parse))
        })
}
