use log::{debug, error, info, warn};
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::api::DataServices;
use crate::error::{Error, Result};
use crate::metrics;
use crate::views::layout::{document, notice};
use crate::web::router::{self, PageQuery};

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

pub struct WebServer {
    services: Arc<DataServices>,
    assets_dir: PathBuf,
}

impl WebServer {
    pub fn new(services: Arc<DataServices>, assets_dir: PathBuf) -> Self {
        Self { services, assets_dir }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let services = Arc::clone(&self.services);
        let with_services = warp::any().map(move || Arc::clone(&services));

        let index = warp::path::end()
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_services)
            .and_then(handle_page);

        let health = warp::path!("health").and(warp::get()).map(health_check);

        let metrics = warp::path!("metrics").and(warp::get()).and_then(get_metrics);

        let assets = warp::path("assets").and(warp::fs::dir(self.assets_dir.clone()));

        index.or(health).or(metrics).or(assets).recover(handle_rejection)
    }

    pub async fn start(&self, host: &str, port: u16) -> Result<()> {
        if !self.assets_dir.is_dir() {
            warn!("Assets directory {} not found, /assets will 404", self.assets_dir.display());
        }

        let addr = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| Error::ConfigError(format!("cannot resolve {}:{}", host, port)))?;

        let cache = self.services.cache().clone();
        tokio::spawn(async move {
            let mut ticker = interval(CACHE_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    debug!("Purged {} expired cache entries", removed);
                }
            }
        });

        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
            })
            .map_err(|e| Error::ConfigError(format!("cannot bind {}: {}", addr, e)))?;

        info!("Serving forecast portal on http://{}", bound);
        server.await;
        info!("Web server stopped");
        Ok(())
    }
}

async fn handle_page(
    params: HashMap<String, String>,
    services: Arc<DataServices>,
) -> std::result::Result<impl Reply, Infallible> {
    let query = PageQuery::from_params(&params);
    let html = router::render_page(&services, &query).await;
    Ok(warp::reply::html(html))
}

fn health_check() -> impl Reply {
    warp::reply::json(&json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_metrics() -> std::result::Result<impl Reply, Infallible> {
    let (body, status) = match metrics::gather() {
        Ok(body) => (body, StatusCode::OK),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            ("failed to gather metrics\n".to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    };
    Ok(warp::reply::with_status(
        warp::reply::with_header(body, "content-type", "text/plain; version=0.0.4"),
        status,
    ))
}

fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<main><h1 class="heading">{}</h1>{}<p><a href="/">Back to all tokens</a></p></main>"#,
        status,
        notice(message)
    );
    document(&status.to_string(), "", &body)
}

async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Nothing lives at this address.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Only GET requests are served here.")
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong, please retry.")
    };

    Ok(warp::reply::with_status(
        warp::reply::html(error_page(status, message)),
        status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{sample_services, ScriptedTransport};

    fn server(transport: ScriptedTransport) -> WebServer {
        WebServer::new(Arc::new(sample_services(transport)), PathBuf::from("does-not-exist"))
    }

    #[tokio::test]
    async fn test_landing_without_selector() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request().path("/").reply(&routes).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8_lossy(resp.body());
        assert_eq!(body.matches("?student=student_").count(), 4);
    }

    #[tokio::test]
    async fn test_unknown_selector_falls_back_to_landing() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request()
            .path("/?student=student_nobody")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8_lossy(resp.body());
        assert!(body.contains("Module &#39;student_nobody&#39; not found"));
        assert_eq!(body.matches("?student=student_").count(), 4);
    }

    #[tokio::test]
    async fn test_health() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request().path("/health").reply(&routes).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_metrics_text() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request().path("/metrics").reply(&routes).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/plain; version=0.0.4");
    }

    #[tokio::test]
    async fn test_unknown_path_is_html_404() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request().path("/admin").reply(&routes).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(String::from_utf8_lossy(resp.body()).contains(r#"href="/""#));

        let missing_asset = warp::test::request()
            .path("/assets/background.jpg")
            .reply(&routes)
            .await;
        assert_eq!(missing_asset.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_page_survives_dead_upstreams() {
        let routes = server(ScriptedTransport::offline()).routes();
        let resp = warp::test::request()
            .path("/?student=student_rohan&date=2025-01-15")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8_lossy(resp.body());
        assert!(body.contains("XRP Next-Day High Price Prediction"));
        assert!(body.contains("Prediction unavailable"));
        assert!(body.contains(r#"value="2025-01-15""#));
    }
}
