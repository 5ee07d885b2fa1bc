use crate::tokens::Theme;
use crate::utils::format::escape_html;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const BASE_CSS: &str = r#"
:root {
  --bg: #0B0E11;
  --text: #E5E7EB;
  --muted: #9CA3AF;
  --gold: #F0B90B;
}
html, body {
  margin: 0;
  background-color: var(--bg);
  color: var(--text);
  font-family: 'Inter', system-ui, sans-serif;
}
main { max-width: 1180px; margin: 0 auto; padding: 24px 28px 48px 28px; }
a { color: var(--gold); text-decoration: none; }
.divider { height: 1px; background: #1F2937; margin: 2rem 0; }
.notice {
  background: rgba(59,130,246,0.12);
  border-left: 4px solid #3B82F6;
  border-radius: 6px;
  padding: 10px 14px;
  margin: 8px 0 16px 0;
}
.notice.error { background: rgba(239,68,68,0.12); border-left-color: #EF4444; }
.chart-wrapper {
  background: #101316;
  border-radius: 10px;
  padding: 12px 16px;
  margin: 10px 0 20px 0;
  border: 1px solid rgba(255,255,255,0.05);
}
"#;

/// Complete HTML document with the shared stylesheet and Plotly loaded.
pub fn document(title: &str, extra_css: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="{plotly}" charset="utf-8"></script>
<style>{base}{extra}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        plotly = PLOTLY_CDN,
        base = BASE_CSS,
        extra = extra_css,
        body = body,
    )
}

/// One-line advisory shown in place of a section whose data is missing.
pub fn notice(message: &str) -> String {
    format!(r#"<div class="notice" role="status">{}</div>"#, escape_html(message))
}

pub fn error_banner(message: &str) -> String {
    format!(r#"<div class="notice error" role="alert">{}</div>"#, escape_html(message))
}

pub fn divider() -> &'static str {
    r#"<div class="divider"></div>"#
}

/// Boxed section with a heading; `inner` is already-rendered HTML.
pub fn section(title: &str, inner: &str) -> String {
    format!(
        r#"<section class="section-box"><h3>{}</h3>{}</section>"#,
        escape_html(title),
        inner
    )
}

/// Per-token palette on top of the shared stylesheet.
pub fn token_css(theme: &Theme) -> String {
    format!(
        r#"
:root {{ --accent: {accent}; --heading: {heading}; --panel: {panel}; --border: {border}; }}
.heading {{ color: var(--heading); font-size: 1.8rem; font-weight: 700; margin: 0 0 6px 0; }}
.sub {{ color: #ffffff; font-weight: 500; margin: 0; }}
.back {{ display: inline-block; margin-bottom: 16px; font-size: 0.9rem; }}
.section-box {{
  background: linear-gradient(180deg, var(--panel) 0%, #0C0E12 100%);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 26px 28px;
  margin-bottom: 35px;
}}
.section-box h3 {{
  color: var(--accent);
  font-size: 1.3rem;
  margin: 0 0 12px 0;
  padding-bottom: 6px;
  border-bottom: 1px solid var(--border);
  display: inline-block;
}}
.white-panel {{
  background: #ffffff;
  border: 1px solid #e5e7eb;
  border-radius: 12px;
  padding: 14px 16px;
  margin-bottom: 20px;
}}
.white-panel * {{ color: #111; }}
.metrics-grid {{ display: grid; grid-template-columns: repeat(4, minmax(0, 1fr)); gap: 8px; }}
.metric {{ padding: 4px 6px; line-height: 1.15; }}
.metric-label {{ font-size: 0.78rem; color: #6b7280; font-weight: 600; margin: 0 0 2px 0; }}
.white-panel .metric-label {{ color: #6b7280; }}
.metric-value {{ font-size: 1.15rem; font-weight: 800; margin: 0 0 6px 0; }}
.metric-caption {{ color: var(--muted); font-size: 0.85rem; }}
.prediction-value {{ color: var(--accent); font-size: 2rem; font-weight: 800; }}
.query-form {{ display: flex; gap: 14px; align-items: flex-end; flex-wrap: wrap; margin-bottom: 16px; }}
.query-form label {{ display: flex; flex-direction: column; font-size: 0.85rem; color: var(--muted); gap: 4px; }}
.query-form input, .query-form select {{
  background: #161a20; color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: 6px 8px;
}}
.query-form button {{
  background: var(--accent); color: #000; font-weight: 700; border: 0; border-radius: 6px; padding: 8px 18px; cursor: pointer;
}}
.feature-columns {{ columns: 2; }}
.coin-info {{ color: var(--muted); line-height: 1.6; margin-top: 10px; }}
details pre {{ background: #0B0E11; padding: 12px; border-radius: 8px; overflow-x: auto; }}
"#,
        accent = theme.accent,
        heading = theme.heading,
        panel = theme.panel,
        border = theme.border,
    )
}
