// Firecrawl-style scrape API client: URL in, rendered markdown out.
use crate::model::{ScrapeError, ScrapeResult};
use crate::scraper::traits::Scraper;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct FirecrawlClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ScrapeRequestBody<'a> {
    url: &'a str,
    formats: &'a [&'a str],
    /// Zero forces the API to re-render instead of serving a cached page.
    #[serde(rename = "maxAge", skip_serializing_if = "Option::is_none")]
    max_age: Option<u64>,
    /// Give client-side price widgets a moment to settle.
    #[serde(rename = "waitFor")]
    wait_for_ms: u64,
}

#[derive(Deserialize)]
struct ScrapeResponseBody {
    success: bool,
    #[serde(default)]
    data: Option<ScrapeDocument>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeDocument {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
struct ScrapeMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(default, rename = "sourceURL")]
    source_url: Option<String>,
}

impl FirecrawlClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) TaSniperBot/0.1")
            .build()
            .expect("default reqwest client");
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Appends a throwaway timestamp parameter so intermediate caches miss.
    fn cache_busted(url: &str) -> String {
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}t={}", Utc::now().timestamp_millis())
    }
}

#[async_trait::async_trait]
impl Scraper for FirecrawlClient {
    async fn scrape(&self, url: &str, bust_cache: bool) -> Result<ScrapeResult, ScrapeError> {
        let target = if bust_cache {
            Self::cache_busted(url)
        } else {
            url.to_string()
        };
        let body = ScrapeRequestBody {
            url: &target,
            formats: &["markdown", "html"],
            max_age: bust_cache.then_some(0),
            wait_for_ms: 1000,
        };

        debug!(url = %target, bust_cache, "scraping url");
        let response = self
            .client
            .post(format!("{}/v1/scrape", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::BadStatus(status.as_u16()));
        }

        let parsed: ScrapeResponseBody = response.json().await?;
        if !parsed.success {
            return Err(ScrapeError::Rejected(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let document = parsed.data.ok_or(ScrapeError::EmptyDocument)?;
        let metadata = document.metadata.unwrap_or(ScrapeMetadata {
            title: None,
            status_code: None,
            source_url: None,
        });

        let markdown = document.markdown.unwrap_or_default();
        debug!(chars = markdown.len(), "scrape succeeded");

        Ok(ScrapeResult {
            markdown,
            title: metadata.title.unwrap_or_default(),
            html: document.html,
            status_code: metadata.status_code,
            url: metadata.source_url.unwrap_or(target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_busting_picks_the_right_separator() {
        assert!(FirecrawlClient::cache_busted("https://x.test/page").starts_with("https://x.test/page?t="));
        assert!(FirecrawlClient::cache_busted("https://x.test/page?a=1").starts_with("https://x.test/page?a=1&t="));
    }

    #[test]
    fn response_body_shape() {
        let raw = r##"{
            "success": true,
            "data": {
                "markdown": "# Ethereum",
                "html": "<h1>Ethereum</h1>",
                "metadata": {
                    "title": "Ethereum Technical Analysis",
                    "statusCode": 200,
                    "sourceURL": "https://www.investing.com/crypto/ethereum/technical"
                }
            }
        }"##;
        let body: ScrapeResponseBody = serde_json::from_str(raw).unwrap();
        assert!(body.success);
        let doc = body.data.unwrap();
        assert_eq!(doc.markdown.as_deref(), Some("# Ethereum"));
        let meta = doc.metadata.unwrap();
        assert_eq!(meta.status_code, Some(200));
        assert_eq!(meta.title.as_deref(), Some("Ethereum Technical Analysis"));
    }

    #[test]
    fn error_body_shape() {
        let raw = r#"{"success": false, "error": "payment required"}"#;
        let body: ScrapeResponseBody = serde_json::from_str(raw).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("payment required"));
    }
}
