//! Token page. Data for every section is loaded concurrently; each section
//! then renders on its own, swapping in a notice when its data is missing.

use log::info;
use std::fmt::Write as _;

use crate::api::{DataServices, DataSourceHint, PredictionQuery};
use crate::models::{CoinMetadata, MarketChart, MarketSnapshot, ModelInfo, OhlcPoint, PredictionResult};
use crate::tokens::{SnapshotLayout, TokenId, TokenProfile};
use crate::utils::format::{
    escape_html, format_billions, format_percent, format_price, format_usd, PLACEHOLDER,
};
use crate::views::charts::{self, ChartSpec};
use crate::views::landing::SELECTOR_PARAM;
use crate::views::layout::{divider, document, notice, section, token_css};

pub const PREDICTION_UNAVAILABLE: &str =
    "Prediction unavailable: the forecasting service did not respond. It may be waking up, please retry in a moment.";
pub const MODEL_INFO_UNAVAILABLE: &str = "Model information unavailable (the prediction service might be offline).";
pub const SNAPSHOT_UNAVAILABLE: &str =
    "Live market data temporarily unavailable, possibly rate-limited. Please retry in a moment.";
pub const OHLC_UNAVAILABLE: &str = "Price history unavailable right now (the market-data API may be rate-limited).";
pub const CHART_UNAVAILABLE: &str = "Market history unavailable right now (the market-data API may be rate-limited).";
pub const METADATA_UNAVAILABLE: &str = "Project fundamentals unavailable, please refresh later.";

/// Everything a token page shows; any field may be missing.
#[derive(Debug, Clone, Default)]
pub struct TokenPageData {
    pub query: PredictionQuery,
    pub snapshot: Option<MarketSnapshot>,
    pub ohlc: Option<Vec<OhlcPoint>>,
    pub chart: Option<MarketChart>,
    pub metadata: Option<CoinMetadata>,
    pub prediction: Option<PredictionResult>,
    pub model_info: Option<ModelInfo>,
}

pub async fn load(services: &DataServices, token: TokenId, query: PredictionQuery) -> TokenPageData {
    let profile = token.profile();
    let market = services.market();
    let predictor = services.prediction(token);

    let model_info = async {
        if profile.model_info {
            predictor.model_info().await
        } else {
            None
        }
    };

    let (snapshot, ohlc, chart, metadata, prediction, model_info) = tokio::join!(
        market.simple_price(profile.coin_id),
        market.ohlc(profile.coin_id, profile.ohlc_days),
        market.market_chart(profile.coin_id, profile.chart_days),
        market.metadata(profile.coin_id, profile.name, profile.ticker),
        predictor.predict(&query),
        model_info,
    );

    TokenPageData {
        query,
        snapshot,
        ohlc,
        chart,
        metadata,
        prediction,
        model_info,
    }
}

pub fn render(profile: &TokenProfile, data: &TokenPageData) -> String {
    let mut body = String::from("<main>");
    body.push_str(r#"<a class="back" href="/">&larr; All tokens</a>"#);
    let _ = write!(
        body,
        r#"<h1 class="heading">{}</h1><p class="sub">{}</p>"#,
        escape_html(profile.headline),
        escape_html(profile.tagline)
    );
    body.push_str(divider());

    body.push_str(&prediction_section(profile, data));
    if profile.model_info {
        body.push_str(&model_info_section(data.model_info.as_ref()));
    }
    body.push_str(&snapshot_section(profile, data.snapshot.as_ref()));
    body.push_str(&history_section(profile, data));
    body.push_str(&fundamentals_section(profile, data.metadata.as_ref()));
    body.push_str(divider());
    body.push_str(&summary_section(profile));
    body.push_str("</main>");

    let missing = [
        data.snapshot.is_none(),
        data.ohlc.is_none(),
        data.chart.is_none(),
        data.metadata.is_none(),
        data.prediction.is_none(),
    ]
    .iter()
    .filter(|missing| **missing)
    .count();
    info!("Rendered {} page ({} sections degraded)", profile.name, missing);

    let title = format!("{} ({}) Forecast", profile.name, profile.ticker);
    document(&title, &token_css(&profile.theme), &body)
}

fn query_form(profile: &TokenProfile, query: &PredictionQuery) -> String {
    let options: String = DataSourceHint::ALL
        .iter()
        .map(|source| {
            let selected = if *source == query.source { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, source.as_str(), selected)
        })
        .collect();

    format!(
        r#"<form class="query-form" method="get" action="/">
<input type="hidden" name="{param}" value="{selector}">
<label>Prediction date (UTC)<input type="date" name="date" value="{date}"></label>
<label>Data source<select name="source">{options}</select></label>
<button type="submit">Get Prediction</button>
</form>"#,
        param = SELECTOR_PARAM,
        selector = escape_html(profile.selector),
        date = query.date.format("%Y-%m-%d"),
        options = options,
    )
}

fn text_or_placeholder(value: Option<&str>) -> String {
    escape_html(value.unwrap_or(PLACEHOLDER))
}

fn prediction_section(profile: &TokenProfile, data: &TokenPageData) -> String {
    let mut inner = query_form(profile, &data.query);
    match &data.prediction {
        Some(prediction) => {
            let high = prediction
                .predicted_high
                .map(format_price)
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            let _ = write!(
                inner,
                r#"<div class="metric-label">Predicted Next-Day HIGH (USD)</div>
<div class="prediction-value">{high}</div>
<div class="metric-caption">Predicted time of high: {time}</div>
<div class="metric-caption">Generated on {generated} | Source: {source}</div>"#,
                high = high,
                time = text_or_placeholder(prediction.predicted_time.as_deref()),
                generated = text_or_placeholder(prediction.generated_at.as_deref()),
                source = escape_html(&prediction.source),
            );
            let raw = serde_json::to_string_pretty(&prediction.raw).unwrap_or_default();
            let _ = write!(
                inner,
                "<details><summary>Raw response</summary><pre>{}</pre></details>",
                escape_html(&raw)
            );
        }
        None => inner.push_str(&notice(PREDICTION_UNAVAILABLE)),
    }
    section("Next-Day High Prediction", &inner)
}

fn model_info_section(info: Option<&ModelInfo>) -> String {
    let Some(info) = info else {
        return section("Model Configuration & Training Info", &notice(MODEL_INFO_UNAVAILABLE));
    };

    let mut inner = String::new();
    for (label, value) in [
        ("Algorithm Used", info.algorithm.as_deref()),
        ("Trained Token", info.trained_token.as_deref()),
        ("Training Period", info.training_period.as_deref()),
        ("Feature Count", info.feature_count.as_deref()),
    ] {
        let _ = write!(inner, "<p><b>{}:</b> {}</p>", label, text_or_placeholder(value));
    }

    let features = if info.features.is_empty() {
        "<p>No feature list available.</p>".to_string()
    } else {
        let items: String = info
            .features
            .iter()
            .map(|feature| format!("<li>{}</li>", escape_html(feature)))
            .collect();
        format!(r#"<ul class="feature-columns">{}</ul>"#, items)
    };
    let _ = write!(
        inner,
        "<details><summary>View All Features Used</summary>{}</details>",
        features
    );
    section("Model Configuration & Training Info", &inner)
}

fn snapshot_section(profile: &TokenProfile, snapshot: Option<&MarketSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return section("Live Market Snapshot", &notice(SNAPSHOT_UNAVAILABLE));
    };

    let price = format_price(snapshot.price);
    let change = format_percent(snapshot.change_24h);
    let inner = match profile.snapshot_layout {
        SnapshotLayout::Grid => {
            let metrics: String = [
                ("Price (USD)", price),
                ("24h Change (%)", change),
                ("Market Cap (USD)", format_usd(snapshot.market_cap, 0)),
                ("24h Volume (USD)", format_usd(snapshot.volume_24h, 0)),
            ]
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div class="metric"><div class="metric-label">{}</div><div class="metric-value">{}</div></div>"#,
                    label, value
                )
            })
            .collect();
            format!(r#"<div class="white-panel"><div class="metrics-grid">{}</div></div>"#, metrics)
        }
        SnapshotLayout::Stacked => {
            let rows: String = [
                ("Price (USD):", price),
                ("24h Change:", change),
                ("Market Cap (USD):", format_usd(snapshot.market_cap, 0)),
                ("24h Volume (USD):", format_usd(snapshot.volume_24h, 0)),
            ]
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div class="metric-label">{}</div><div class="metric-value">{}</div>"#,
                    label, value
                )
            })
            .collect();
            format!(r#"<div class="white-panel">{}</div>"#, rows)
        }
        SnapshotLayout::Compact => format!(
            r#"<p><b>Price (USD):</b> {price}</p>
<p><b>24h Change:</b> {change}</p>
<p><b>Market Cap:</b> {cap}</p>
<p><b>24h Volume:</b> {volume}</p>
<p class="metric-caption">Price shows the latest USD value. 24h Change tracks daily percentage movement. Market Cap is roughly circulating supply times price, and 24h Volume measures trading liquidity in the last day.</p>"#,
            price = price,
            change = change,
            cap = format_billions(snapshot.market_cap),
            volume = format_billions(snapshot.volume_24h),
        ),
    };

    let observed = format!(
        r#"<p class="metric-caption">As of {}</p>"#,
        snapshot.observed_at.format("%Y-%m-%d %H:%M UTC")
    );
    section("Live Market Snapshot", &(inner + &observed))
}

fn history_section(profile: &TokenProfile, data: &TokenPageData) -> String {
    let mut inner = String::new();

    match data.ohlc.as_deref().and_then(|points| charts::candlestick(profile, points)) {
        Some(chart) => inner.push_str(&chart.to_html()),
        None => inner.push_str(&notice(OHLC_UNAVAILABLE)),
    }

    let lines: Vec<ChartSpec> = match &data.chart {
        Some(chart) => [
            profile
                .price_trend
                .then(|| charts::line(profile, "prices", "Price (USD)", &chart.prices))
                .flatten(),
            charts::line(profile, "market-caps", "Market Cap (USD)", &chart.market_caps),
            charts::line(profile, "volumes", "Trading Volume (USD)", &chart.total_volumes),
        ]
        .into_iter()
        .flatten()
        .collect(),
        None => Vec::new(),
    };
    if lines.is_empty() {
        inner.push_str(&notice(CHART_UNAVAILABLE));
    }
    for chart in &lines {
        inner.push_str(&chart.to_html());
    }

    section("Historical Market Performance", &inner)
}

fn fundamentals_section(profile: &TokenProfile, metadata: Option<&CoinMetadata>) -> String {
    let title = format!("{} Fundamentals", profile.name);
    let Some(meta) = metadata else {
        return section(&title, &notice(METADATA_UNAVAILABLE));
    };

    let mut inner = String::new();
    if let Some(logo) = meta.logo.as_deref().filter(|url| is_web_url(url)) {
        let _ = write!(
            inner,
            r#"<img src="{}" width="80" alt="{} logo">"#,
            escape_html(logo),
            escape_html(&meta.name)
        );
    }
    let categories = if meta.categories.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        meta.categories.join(", ")
    };
    let _ = write!(
        inner,
        "<p><b>Name:</b> {} | <b>Symbol:</b> {}</p><p><b>Algorithm:</b> {}</p><p><b>Category:</b> {}</p>",
        escape_html(&meta.name),
        escape_html(&meta.symbol),
        text_or_placeholder(meta.hashing_algorithm.as_deref()),
        escape_html(&categories),
    );

    let links: Vec<String> = [("Website", meta.homepage.as_deref()), ("Explorer", meta.explorer.as_deref())]
        .into_iter()
        .filter_map(|(label, url)| {
            url.filter(|url| is_web_url(url)).map(|url| {
                format!(
                    r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                    escape_html(url),
                    label
                )
            })
        })
        .collect();
    if !links.is_empty() {
        let _ = write!(inner, "<p>{}</p>", links.join(" | "));
    }
    if let Some(about) = profile.about {
        let _ = write!(inner, r#"<div class="coin-info">{}</div>"#, escape_html(about));
    }

    section(&title, &inner)
}

/// Upstream links are rendered only with an http(s) scheme.
fn is_web_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("https://") || url.starts_with("http://")
}

fn summary_section(profile: &TokenProfile) -> String {
    let items: String = profile
        .summary
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!(
        r#"<h3>Summary</h3><p>This dashboard delivers:</p><ul>{}</ul><p class="metric-caption">{}</p>"#,
        items,
        escape_html(profile.credit)
    )
}
