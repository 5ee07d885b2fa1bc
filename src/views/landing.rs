use crate::tokens::TokenId;
use crate::utils::format::escape_html;
use crate::views::layout::{document, error_banner};

pub const SELECTOR_PARAM: &str = "student";

const HERO_TITLE: &str = "SECURE AND INTELLIGENT WAY TO FORECAST CRYPTOCURRENCY";
const HERO_LEAD: &str = "Machine Learning-Driven Forecasts for ETH, SOL, XRP, and BTC.";
const HERO_DESC: &str = "Our project integrates advanced machine-learning models to predict cryptocurrency \
    trends with precision. By leveraging real-time APIs and optimized XGBoost algorithms, we aim to make \
    digital-asset forecasting accessible, transparent, and data-driven for educational and analytical use.";
const LEARN_MORE_URL: &str = "https://coinmarketcap.com/alexandria/";

struct Member {
    token: TokenId,
    name: &'static str,
    role: &'static str,
    photo: Option<&'static str>,
}

const TEAM: [Member; 4] = [
    Member {
        token: TokenId::Ethereum,
        name: "Twinkle",
        role: "Developed and deployed an Optuna-tuned XGBoost model for Ethereum forecasting, integrated via FastAPI.",
        photo: Some("https://i.imgur.com/srRUQAu.jpeg"),
    },
    Member {
        token: TokenId::Solana,
        name: "Nidhi",
        role: "Solana Integration and Visualization",
        photo: None,
    },
    Member {
        token: TokenId::Xrp,
        name: "Rohan",
        role: "XRP Deployment & Validation",
        photo: None,
    },
    Member {
        token: TokenId::Bitcoin,
        name: "Paul",
        role: "Bitcoin Model & API Setup",
        photo: None,
    },
];

const LANDING_CSS: &str = r#"
body {
  background: url('/assets/background.jpg') center center / cover no-repeat fixed, #f3efe2;
}
body::after {
  content: "";
  position: fixed;
  inset: 0;
  background: rgba(255,255,255,0.18);
  z-index: -1;
}
.hero { text-align: center; padding: 34px 20px 0 20px; min-height: 41vh; }
.hero h1 { font-size: 2.5rem; font-weight: 800; color: #a97904; text-shadow: 1px 1px 3px rgba(0,0,0,0.5); margin-bottom: 10px; }
.hero p { color: #222; font-size: 1.1rem; font-weight: 600; margin-bottom: 8px; }
.hero-desc { color: #000; max-width: 760px; margin: 0 auto 10px auto; line-height: 1.6; padding: 10px 16px; }
.hero a.learn-btn {
  background: var(--gold); color: #000; padding: 10px 28px; font-weight: 700; border-radius: 6px;
  display: inline-block; margin: 8px 0 18px 0; box-shadow: 0 0 10px rgba(212,175,55,0.4);
}
.hero small { display: block; color: #7a5a00; margin-top: 48px; font-weight: 700; letter-spacing: 1px; font-size: 1.2rem; text-transform: uppercase; }
.token-bar {
  background: rgba(17,17,17,0.92); display: flex; justify-content: center; align-items: stretch;
  gap: 20px; padding: 18px 3%; border-top: 1px solid #1c1c1c; border-bottom: 1px solid #1c1c1c;
}
.token { flex: 1 1 20%; max-width: 280px; text-align: center; padding: 8px 6px; border-radius: 10px; }
.token:hover { background: rgba(212,175,55,0.08); box-shadow: 0 0 16px rgba(212,175,55,0.25); }
.token h3 { color: var(--gold); font-size: 1rem; margin-bottom: 3px; }
.token p { color: var(--muted); font-size: 0.84rem; line-height: 1.3; margin: 0; }
.team { background: rgba(10,10,10,0.92); text-align: center; padding: 18px 0 24px 0; border-top: 1px solid #1a1a1a; }
.team h3 { color: var(--gold); margin-bottom: 10px; }
.member-container { display: flex; justify-content: center; gap: 20px; padding: 0 3%; }
.member { flex: 1 1 20%; max-width: 250px; }
.member-img {
  width: 100px; height: 100px; border-radius: 50%; margin: 0 auto 3px auto;
  background: linear-gradient(145deg, #1a1a1a, #0d0d0d) center center / cover no-repeat;
  border: 2px solid rgba(212,175,55,0.6);
}
.member p { color: var(--muted); font-size: 0.82rem; margin: 0; line-height: 1.3; }
.landing-banner { max-width: 760px; margin: 16px auto 0 auto; }
"#;

/// Relative link selecting a token page.
pub fn token_href(token: TokenId) -> String {
    let query = serde_urlencoded::to_string(&[(SELECTOR_PARAM, token.selector())])
        .unwrap_or_else(|_| format!("{}={}", SELECTOR_PARAM, token.selector()));
    format!("?{}", query)
}

fn hero() -> String {
    format!(
        r#"<div class="hero">
<h1>{title}</h1>
<p>{lead}</p>
<div class="hero-desc">{desc}</div>
<a href="{learn}" target="_blank" rel="noopener" class="learn-btn">LEARN MORE</a>
<small>Explore Tokens</small>
</div>"#,
        title = HERO_TITLE,
        lead = HERO_LEAD,
        desc = HERO_DESC,
        learn = LEARN_MORE_URL,
    )
}

fn token_bar() -> String {
    let links: String = TokenId::ALL
        .iter()
        .map(|token| {
            let profile = token.profile();
            format!(
                r#"<a href="{href}" target="_self" class="token"><h3>{name} ({ticker})</h3><p>{blurb}</p></a>"#,
                href = escape_html(&token_href(*token)),
                name = escape_html(profile.name),
                ticker = escape_html(profile.ticker),
                blurb = escape_html(profile.landing_blurb),
            )
        })
        .collect();
    format!(r#"<nav class="token-bar">{}</nav>"#, links)
}

fn team() -> String {
    let members: String = TEAM
        .iter()
        .map(|member| {
            let photo = member
                .photo
                .map(|url| format!(r#" style="background-image: url('{}')""#, escape_html(url)))
                .unwrap_or_default();
            format!(
                r#"<div class="member" data-token="{token}"><div class="member-img"{photo}></div><p><b>{name}</b></p><p>{role}</p></div>"#,
                token = member.token.selector(),
                photo = photo,
                name = escape_html(member.name),
                role = escape_html(member.role),
            )
        })
        .collect();
    format!(
        r#"<section class="team"><h3>Our Team</h3><div class="member-container">{}</div></section>"#,
        members
    )
}

/// Token index. `unknown_selector` adds a "module not found" banner above it.
pub fn render(unknown_selector: Option<&str>) -> String {
    let banner = unknown_selector
        .map(|selector| {
            format!(
                r#"<div class="landing-banner">{}</div>"#,
                error_banner(&format!(
                    "Module '{}' not found. Pick one of the tokens below.",
                    selector
                ))
            )
        })
        .unwrap_or_default();

    let body = format!("{}{}{}{}", banner, hero(), token_bar(), team());
    document("Crypto Forecast Portal", LANDING_CSS, &body)
}
