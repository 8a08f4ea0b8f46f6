use serde::Deserialize;
use std::fs;

/// One page to poll. `coingecko_id` additionally records a live quote from
/// the market feed next to the parsed snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    #[serde(default)]
    pub coingecko_id: Option<String>,
    /// Bust the scrape cache on every poll.
    #[serde(default)]
    pub fresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_firecrawl_api_url")]
    pub firecrawl_api_url: String,
    pub firecrawl_api_key: String,
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    pub targets: Vec<TargetConfig>,
    pub check_interval_seconds: u64,
}

fn default_firecrawl_api_url() -> String {
    "https://api.firecrawl.dev".to_string()
}

fn default_database_path() -> String {
    "data.db".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
