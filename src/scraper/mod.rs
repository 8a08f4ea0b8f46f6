pub mod fetcher;
pub mod traits;

pub use fetcher::FirecrawlClient;
pub use traits::Scraper;
