//! Chart specifications. Each chart is a Plotly figure (`data` + `layout`)
//! serialized to JSON and handed to `Plotly.newPlot` in the page.

use log::error;
use serde::Serialize;

use crate::models::{OhlcPoint, TimeSeriesPoint};
use crate::tokens::TokenProfile;
use crate::utils::format::escape_html;

const FONT_COLOR: &str = "#E5E7EB";
const TRANSPARENT: &str = "rgba(0,0,0,0)";
const X_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    #[serde(skip)]
    pub id: String,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        name: String,
        showlegend: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        increasing: Option<CandleSide>,
        #[serde(skip_serializing_if = "Option::is_none")]
        decreasing: Option<CandleSide>,
    },
    Scatter {
        x: Vec<String>,
        y: Vec<f64>,
        mode: &'static str,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<Line>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CandleSide {
    pub line: Line,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub height: u32,
    pub margin: Margin,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

impl Layout {
    fn dark(height: u32) -> Self {
        Self {
            height,
            margin: Margin { l: 20, r: 20, t: 30, b: 20 },
            paper_bgcolor: TRANSPARENT,
            plot_bgcolor: TRANSPARENT,
            font: Font { color: FONT_COLOR },
            title: None,
            xaxis: Axis::default(),
            yaxis: Axis::default(),
        }
    }
}

fn titled(text: &str) -> Option<Text> {
    Some(Text { text: text.to_string() })
}

/// OHLC points map straight onto candles; gaps just shorten the series.
pub fn candlestick(profile: &TokenProfile, points: &[OhlcPoint]) -> Option<ChartSpec> {
    if points.is_empty() {
        return None;
    }
    let style = &profile.charts;
    let side = |color: Option<&str>| {
        color.map(|c| CandleSide {
            line: Line { color: c.to_string(), width: None },
        })
    };

    let trace = Trace::Candlestick {
        x: points.iter().map(|p| p.timestamp.format(X_FORMAT).to_string()).collect(),
        open: points.iter().map(|p| p.open).collect(),
        high: points.iter().map(|p| p.high).collect(),
        low: points.iter().map(|p| p.low).collect(),
        close: points.iter().map(|p| p.close).collect(),
        name: profile.ticker.to_string(),
        showlegend: false,
        increasing: side(style.increasing_color),
        decreasing: side(style.decreasing_color),
    };

    let mut layout = Layout::dark(style.candle_height);
    layout.title = style.candle_title.and_then(titled);
    layout.xaxis.title = titled("Date");
    layout.yaxis.title = titled("Price (USD)");
    if style.hide_rangeslider {
        layout.xaxis.rangeslider = Some(RangeSlider { visible: false });
    }

    Some(ChartSpec {
        id: format!("{}-candles", profile.coin_id),
        data: vec![trace],
        layout,
    })
}

/// Single trend line, optionally cut to the profile's trailing window.
pub fn line(profile: &TokenProfile, id: &str, label: &str, points: &[TimeSeriesPoint]) -> Option<ChartSpec> {
    let style = &profile.charts;
    let start = style
        .trend_tail
        .map(|tail| points.len().saturating_sub(tail))
        .unwrap_or(0);
    let points = &points[start..];
    if points.is_empty() {
        return None;
    }

    let trace = Trace::Scatter {
        x: points.iter().map(|p| p.timestamp.format(X_FORMAT).to_string()).collect(),
        y: points.iter().map(|p| p.value).collect(),
        mode: "lines",
        name: label.to_string(),
        line: style.line_color.map(|color| Line {
            color: color.to_string(),
            width: Some(2.4),
        }),
    };

    let mut layout = Layout::dark(style.line_height);
    layout.yaxis.title = titled(label);

    Some(ChartSpec {
        id: format!("{}-{}", profile.coin_id, id),
        data: vec![trace],
        layout,
    })
}

impl ChartSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_html(&self) -> String {
        let figure = match self.to_json() {
            Ok(json) => json.replace("</", "<\\/"),
            Err(e) => {
                error!("Failed to serialize chart {}: {}", self.id, e);
                return String::new();
            }
        };
        let id = escape_html(&self.id);
        format!(
            r#"<div class="chart-wrapper"><div id="{id}" class="chart"></div>
<script>(function() {{ const fig = {figure}; Plotly.newPlot("{id}", fig.data, fig.layout, {{"responsive": true, "displayModeBar": false}}); }})();</script></div>"#,
            id = id,
            figure = figure,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenId;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::Value;

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(n)
    }

    fn series(len: usize) -> Vec<TimeSeriesPoint> {
        (0..len)
            .map(|i| TimeSeriesPoint { timestamp: day(i as i64), value: i as f64 })
            .collect()
    }

    #[test]
    fn test_candlestick_maps_points_directly() {
        let points = vec![
            OhlcPoint { timestamp: day(0), open: 1.0, high: 2.0, low: 0.5, close: 1.5 },
            OhlcPoint { timestamp: day(2), open: 1.5, high: 1.8, low: 1.1, close: 1.2 },
        ];
        let chart = candlestick(TokenId::Ethereum.profile(), &points).unwrap();
        let json: Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(json["data"][0]["type"], "candlestick");
        assert_eq!(json["data"][0]["close"], serde_json::json!([1.5, 1.2]));
        assert_eq!(json["layout"]["height"], 420);
        assert!(json["layout"]["xaxis"].get("rangeslider").is_none());

        assert!(candlestick(TokenId::Ethereum.profile(), &[]).is_none());
    }

    #[test]
    fn test_solana_candle_styling() {
        let points = vec![OhlcPoint { timestamp: day(0), open: 1.0, high: 2.0, low: 0.5, close: 1.5 }];
        let chart = candlestick(TokenId::Solana.profile(), &points).unwrap();
        let json: Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(json["data"][0]["increasing"]["line"]["color"], "#26A69A");
        assert_eq!(json["layout"]["xaxis"]["rangeslider"]["visible"], false);
        assert_eq!(json["layout"]["title"]["text"], "30-Day Price Structure (Candlestick)");
    }

    #[test]
    fn test_line_keeps_trailing_window() {
        let chart = line(TokenId::Solana.profile(), "price", "Price (USD)", &series(120)).unwrap();
        match &chart.data[0] {
            Trace::Scatter { y, .. } => {
                assert_eq!(y.len(), 90);
                assert_eq!(y[0], 30.0);
            }
            other => panic!("unexpected trace {:?}", other),
        }

        let full = line(TokenId::Bitcoin.profile(), "caps", "Market Cap (USD)", &series(120)).unwrap();
        assert!(matches!(&full.data[0], Trace::Scatter { y, line: None, .. } if y.len() == 120));
        assert!(line(TokenId::Bitcoin.profile(), "caps", "Market Cap (USD)", &[]).is_none());
    }

    #[test]
    fn test_html_embeds_figure_safely() {
        let mut chart = line(TokenId::Xrp.profile(), "volume", "Volume", &series(3)).unwrap();
        chart.layout.title = titled("</script><b>");
        let html = chart.to_html();
        assert!(html.contains(r#"id="ripple-volume""#));
        assert!(html.contains("Plotly.newPlot"));
        assert!(!html.contains("</script><b>"));
    }
}
