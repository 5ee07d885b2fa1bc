use log::info;

use super::{CachedFetcher, DataCategory, FetchRequest};
use crate::models::{CoinMetadata, MarketChart, MarketSnapshot, OhlcPoint};

pub const API_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const VS_CURRENCY: &str = "usd";

/// CoinGecko market-data client. Every call goes through the shared cache;
/// an unavailable or unusable payload comes back as `None`.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    api_key: Option<(String, String)>,
    fetcher: CachedFetcher,
}

impl CoinGeckoClient {
    /// `api_key` is a `(header name, key)` pair sent with every request.
    pub fn new(base_url: String, api_key: Option<(String, String)>, fetcher: CachedFetcher) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            fetcher,
        }
    }

    fn request(&self, endpoint: &str) -> FetchRequest {
        let request = FetchRequest::new(format!("{}/{}", self.base_url, endpoint));
        match &self.api_key {
            Some((header, key)) => request.header(header, key),
            None => request,
        }
    }

    pub async fn simple_price(&self, coin_id: &str) -> Option<MarketSnapshot> {
        let request = self
            .request("simple/price")
            .param("ids", coin_id)
            .param("vs_currencies", VS_CURRENCY)
            .param("include_market_cap", "true")
            .param("include_24hr_vol", "true")
            .param("include_24hr_change", "true")
            .param("include_last_updated_at", "true");

        let payload = self.fetcher.fetch(DataCategory::Snapshot, &request).await?;
        let snapshot = MarketSnapshot::from_simple_price(coin_id, &payload);
        if snapshot.is_none() {
            info!("Simple price payload has no entry for {}", coin_id);
        }
        snapshot
    }

    pub async fn ohlc(&self, coin_id: &str, days: u32) -> Option<Vec<OhlcPoint>> {
        let request = self
            .request(&format!("coins/{}/ohlc", coin_id))
            .param("vs_currency", VS_CURRENCY)
            .param("days", days);

        let payload = self.fetcher.fetch(DataCategory::History, &request).await?;
        let series = OhlcPoint::series_from(&payload);
        (!series.is_empty()).then_some(series)
    }

    pub async fn market_chart(&self, coin_id: &str, days: u32) -> Option<MarketChart> {
        let request = self
            .request(&format!("coins/{}/market_chart", coin_id))
            .param("vs_currency", VS_CURRENCY)
            .param("days", days);

        let payload = self.fetcher.fetch(DataCategory::History, &request).await?;
        MarketChart::from_value(&payload).filter(|chart| !chart.is_empty())
    }

    pub async fn metadata(&self, coin_id: &str, name: &str, symbol: &str) -> Option<CoinMetadata> {
        let request = self
            .request(&format!("coins/{}", coin_id))
            .param("localization", "false")
            .param("tickers", "false")
            .param("market_data", "false")
            .param("community_data", "false")
            .param("developer_data", "false");

        let payload = self.fetcher.fetch(DataCategory::Metadata, &request).await?;
        CoinMetadata::from_value(&payload, name, symbol)
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }
}
