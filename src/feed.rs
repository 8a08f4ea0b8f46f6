// CoinGecko spot-price feed, persisted alongside the parsed snapshots.
use crate::model::{FeedError, MarketSnapshot};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const API_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoClient {
    client: Client,
    api_url: String,
    /// Demo-tier key; the public endpoints work without one, just slower.
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    #[serde(default)]
    usd: Option<f64>,
    #[serde(default)]
    usd_market_cap: Option<f64>,
    #[serde(default)]
    usd_24h_vol: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
    #[serde(default)]
    last_updated_at: Option<i64>,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: API_URL.to_string(),
            api_key,
        }
    }

    /// Current USD quote with market cap, 24h volume and 24h change.
    pub async fn spot(&self, coin_id: &str) -> Result<MarketSnapshot, FeedError> {
        let mut request = self
            .client
            .get(format!("{}/simple/price", self.api_url))
            .query(&[
                ("ids", coin_id),
                ("vs_currencies", "usd"),
                ("include_market_cap", "true"),
                ("include_24hr_vol", "true"),
                ("include_24hr_change", "true"),
                ("include_last_updated_at", "true"),
                ("precision", "2"),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        let mut quotes: HashMap<String, SimplePriceEntry> =
            response.error_for_status()?.json().await?;
        let entry = quotes
            .remove(coin_id)
            .ok_or_else(|| FeedError::MissingQuote(coin_id.to_string()))?;

        debug!(coin_id, usd = ?entry.usd, "feed quote received");
        Ok(MarketSnapshot {
            usd: entry.usd.unwrap_or(0.0),
            usd_market_cap: entry.usd_market_cap.unwrap_or(0.0),
            usd_24h_vol: entry.usd_24h_vol.unwrap_or(0.0),
            usd_24h_change: entry.usd_24h_change.unwrap_or(0.0),
            last_updated_at: entry.last_updated_at.unwrap_or(0),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_price_shape() {
        let raw = r#"{
            "ethereum": {
                "usd": 4491.64,
                "usd_market_cap": 541932279347.21,
                "usd_24h_vol": 35694127412.52,
                "usd_24h_change": 0.26,
                "last_updated_at": 1756339200
            }
        }"#;
        let quotes: HashMap<String, SimplePriceEntry> = serde_json::from_str(raw).unwrap();
        let eth = &quotes["ethereum"];
        assert_eq!(eth.usd, Some(4491.64));
        assert_eq!(eth.last_updated_at, Some(1756339200));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let raw = r#"{"ethereum": {"usd": 4491.64}}"#;
        let quotes: HashMap<String, SimplePriceEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(quotes["ethereum"].usd_market_cap, None);
    }
}
