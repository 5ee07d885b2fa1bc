//! The fixed set of token pages and how each one is presented.
//!
//! Pages are a closed enumeration; the router maps a selector string onto
//! one of them and dispatches directly, no runtime capability probing.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenId {
    Ethereum,
    Solana,
    Xrp,
    Bitcoin,
}

impl TokenId {
    /// Landing page order.
    pub const ALL: [TokenId; 4] = [TokenId::Ethereum, TokenId::Solana, TokenId::Xrp, TokenId::Bitcoin];

    pub fn profile(self) -> &'static TokenProfile {
        match self {
            TokenId::Ethereum => &ETHEREUM,
            TokenId::Solana => &SOLANA,
            TokenId::Xrp => &XRP,
            TokenId::Bitcoin => &BITCOIN,
        }
    }

    pub fn selector(self) -> &'static str {
        self.profile().selector
    }

    pub fn from_selector(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        TokenId::ALL.into_iter().find(|token| token.selector() == selector)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Token(TokenId),
}

impl Page {
    pub fn label(&self) -> &'static str {
        match self {
            Page::Landing => "landing",
            Page::Token(token) => token.selector(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotLayout {
    /// Four metrics side by side on a light panel.
    Grid,
    /// Label/value pairs stacked vertically.
    Stacked,
    /// Cap and volume in billions with an explanatory caption.
    Compact,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: &'static str,
    pub heading: &'static str,
    pub panel: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub candle_height: u32,
    pub line_height: u32,
    pub candle_title: Option<&'static str>,
    pub line_color: Option<&'static str>,
    pub increasing_color: Option<&'static str>,
    pub decreasing_color: Option<&'static str>,
    pub hide_rangeslider: bool,
    /// Keep only the trailing N points of each trend line.
    pub trend_tail: Option<usize>,
}

#[derive(Debug)]
pub struct TokenProfile {
    pub id: TokenId,
    pub selector: &'static str,
    pub coin_id: &'static str,
    pub name: &'static str,
    pub ticker: &'static str,
    pub headline: &'static str,
    pub tagline: &'static str,
    pub landing_blurb: &'static str,
    pub predict_path: &'static str,
    pub ohlc_days: u32,
    pub chart_days: u32,
    pub price_trend: bool,
    pub model_info: bool,
    pub about: Option<&'static str>,
    pub snapshot_layout: SnapshotLayout,
    pub theme: Theme,
    pub charts: ChartStyle,
    pub summary: &'static [&'static str],
    pub credit: &'static str,
}

const DEFAULT_CHARTS: ChartStyle = ChartStyle {
    candle_height: 420,
    line_height: 280,
    candle_title: None,
    line_color: None,
    increasing_color: None,
    decreasing_color: None,
    hide_rangeslider: false,
    trend_tail: None,
};

static ETHEREUM: TokenProfile = TokenProfile {
    id: TokenId::Ethereum,
    selector: "student_twinkle",
    coin_id: "ethereum",
    name: "Ethereum",
    ticker: "ETH",
    headline: "Ethereum Next-Day High Price Prediction",
    tagline: "Powered by CoinGecko & FastAPI · AT3 Group 1, UTS 2025",
    landing_blurb: "Ethereum forecasting using an Optuna-tuned XGBoost model with live FastAPI integration.",
    predict_path: "/predict/ethereum",
    ohlc_days: 90,
    chart_days: 90,
    price_trend: false,
    model_info: false,
    about: None,
    snapshot_layout: SnapshotLayout::Grid,
    theme: Theme {
        accent: "#F0B90B",
        heading: "#a97904",
        panel: "#0E1116",
        border: "rgba(240,185,11,0.15)",
    },
    charts: DEFAULT_CHARTS,
    summary: &[
        "Real-time Ethereum market data via CoinGecko (cached for 5-10 mins)",
        "Interactive candlestick and historical charts",
        "Next-day high price prediction via FastAPI ML model",
        "Automatic retry and warm-up for stable performance",
    ],
    credit: "Developed by Twinkle · AT3 Group 1 · University of Technology Sydney (2025)",
};

static SOLANA: TokenProfile = TokenProfile {
    id: TokenId::Solana,
    selector: "student_nidhi",
    coin_id: "solana",
    name: "Solana",
    ticker: "SOL",
    headline: "Solana (SOL) Next-Day High Prediction",
    tagline: "Powered by CoinGecko API · FastAPI (Render) · AT3 Group 1",
    landing_blurb: "Feature-engineered forecasting model for trend stability and pattern recognition.",
    predict_path: "/predict/solana",
    ohlc_days: 30,
    chart_days: 90,
    price_trend: true,
    model_info: true,
    about: Some(
        "Solana (SOL) is a high-performance Layer-1 blockchain designed for low-latency, \
         low-cost transactions. It combines Proof of Stake with Proof of History to reach high \
         throughput, supporting DeFi, payments, and consumer apps at scale. Mainnet launched in \
         2020 and the network is widely used for NFTs, on-chain order books, and real-time apps.",
    ),
    snapshot_layout: SnapshotLayout::Compact,
    theme: Theme {
        accent: "#F0B90B",
        heading: "#F0B90B",
        panel: "#101316",
        border: "rgba(255,255,255,0.07)",
    },
    charts: ChartStyle {
        candle_height: 360,
        line_height: 260,
        candle_title: Some("30-Day Price Structure (Candlestick)"),
        line_color: Some("#00BFFF"),
        increasing_color: Some("#26A69A"),
        decreasing_color: Some("#EF5350"),
        hide_rangeslider: true,
        trend_tail: Some(90),
    },
    summary: &[
        "Prediction Model: Linear Regression forecasting Solana's next-day high based on engineered OHLCV features.",
        "Candlestick View: Highlights intraday market volatility and trend reversals for short-term traders.",
        "Market Summary: Live 24-hour metrics retrieved from CoinGecko, cached to prevent rate-limit issues.",
        "Technical Edge: Integrated FastAPI backend ensures reliable and low-latency inference.",
    ],
    credit: "Dashboard developed by Nidhi Upadhyay · AT3 Group 1 · University of Technology Sydney (2025)",
};

static XRP: TokenProfile = TokenProfile {
    id: TokenId::Xrp,
    selector: "student_rohan",
    coin_id: "ripple",
    name: "XRP",
    ticker: "XRP",
    headline: "XRP Next-Day High Price Prediction",
    tagline: "Powered by CoinGecko & FastAPI · AT3 Group 1 · UTS 2025",
    landing_blurb: "FastAPI-powered endpoint with real-time API integration and validation pipeline.",
    predict_path: "/predict/",
    ohlc_days: 90,
    chart_days: 90,
    price_trend: false,
    model_info: false,
    about: None,
    snapshot_layout: SnapshotLayout::Stacked,
    theme: Theme {
        accent: "#F0B90B",
        heading: "#F0B90B",
        panel: "#0E1116",
        border: "rgba(240,185,11,0.25)",
    },
    charts: ChartStyle {
        candle_height: 350,
        line_height: 250,
        ..DEFAULT_CHARTS
    },
    summary: &[
        "Live XRP market metrics from CoinGecko",
        "Interactive candlestick and historical charts",
        "Next-day high price prediction (FastAPI + LightGBM)",
        "Date picker to query any valid past date",
    ],
    credit: "Developed by Rohan Yadav · AT3 Group 1 · UTS 2025",
};

static BITCOIN: TokenProfile = TokenProfile {
    id: TokenId::Bitcoin,
    selector: "student_paul",
    coin_id: "bitcoin",
    name: "Bitcoin",
    ticker: "BTC",
    headline: "Bitcoin Next-Day High Price Prediction",
    tagline: "Powered by FastAPI + CoinGecko · AT3 Group 1, UTS 2025",
    landing_blurb: "Predict next-day highs using optimized ML regression models for consistent accuracy.",
    predict_path: "/predict/bitcoin",
    ohlc_days: 90,
    chart_days: 90,
    price_trend: false,
    model_info: false,
    about: None,
    snapshot_layout: SnapshotLayout::Grid,
    theme: Theme {
        accent: "#22C55E",
        heading: "#22C55E",
        panel: "#111318",
        border: "rgba(34,197,94,0.25)",
    },
    charts: DEFAULT_CHARTS,
    summary: &[
        "Live Bitcoin market metrics from CoinGecko",
        "90-day candlestick, market cap and volume history",
        "Next-day high prediction with an optional data-source hint",
    ],
    credit: "Built by Paul Benjamin Samuel (25142441) · AT3 Group 1 · AML · UTS 2025",
};
