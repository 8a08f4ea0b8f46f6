use crate::model::{ScrapeError, ScrapeResult};

#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// Fetches one URL through the scrape API and returns its rendered
    /// content. `bust_cache` forces a fresh render instead of a cached one.
    async fn scrape(&self, url: &str, bust_cache: bool) -> Result<ScrapeResult, ScrapeError>;
}
