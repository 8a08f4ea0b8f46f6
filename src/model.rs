// Core structs: TechnicalAnalysisData and friends, plus per-subsystem errors
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One named oscillator/indicator reading from the indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicator {
    pub name: String,
    pub value: IndicatorValue,
    /// Recommendation label as free text from the source (Buy, Sell, Overbought, ...).
    pub action: String,
    /// Original source line, kept for audit.
    pub raw_value: String,
}

/// Indicator reading: numeric when the cell parses, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaReading {
    pub value: f64,
    pub action: String,
}

/// Simple/exponential readings for one moving-average period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAverage {
    pub period: u32,
    pub simple: MaReading,
    pub exponential: MaReading,
}

/// Support/resistance ladder for one pivot method.
/// `pivot` is always present when the entry exists; the levels around it may not be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotPoint {
    pub name: String,
    pub s3: Option<f64>,
    pub s2: Option<f64>,
    pub s1: Option<f64>,
    pub pivot: f64,
    pub r1: Option<f64>,
    pub r2: Option<f64>,
    pub r3: Option<f64>,
}

/// Aggregate recommendation counts from a summary table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysisSummary {
    pub recommendation: String,
    pub buy_count: u32,
    pub sell_count: u32,
    pub neutral_count: u32,
}

impl Default for TechnicalAnalysisSummary {
    fn default() -> Self {
        Self {
            recommendation: "Neutral".to_string(),
            buy_count: 0,
            sell_count: 0,
            neutral_count: 0,
        }
    }
}

/// The three independently extracted summary labels. They come from different
/// spots on the page and are allowed to disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLabels {
    pub overall: String,
    pub technical_indicators: String,
    pub moving_averages: String,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        Self {
            overall: "Neutral".to_string(),
            technical_indicators: "Neutral".to_string(),
            moving_averages: "Neutral".to_string(),
        }
    }
}

/// Full parsed snapshot of one technical-analysis page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysisData {
    pub symbol: String,
    pub price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub summary: SummaryLabels,
    pub technical_indicators_summary: TechnicalAnalysisSummary,
    pub moving_averages_summary: TechnicalAnalysisSummary,
    pub technical_indicators: Vec<TechnicalIndicator>,
    pub moving_averages: Vec<MovingAverage>,
    pub pivot_points: Vec<PivotPoint>,
    pub scraped_at: DateTime<Utc>,
    pub source_url: String,
}

/// Raw result of one scrape call, before parsing.
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub markdown: String,
    pub title: String,
    pub html: Option<String>,
    pub status_code: Option<u16>,
    pub url: String,
}

/// One spot-price row from the market data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub usd: f64,
    pub usd_market_cap: f64,
    pub usd_24h_vol: f64,
    pub usd_24h_change: f64,
    pub last_updated_at: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("scrape api returned status {0}")]
    BadStatus(u16),
    #[error("scrape api rejected the request: {0}")]
    Rejected(String),
    #[error("scrape api returned no document")]
    EmptyDocument,
}

#[derive(Debug, Error)]
pub enum ParserError {
    /// Hard failure of the whole parse. Individual pattern misses are not
    /// errors; they fall back to field defaults instead.
    #[error("internal parser fault: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("feed returned no quote for {0}")]
    MissingQuote(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
