use rand::Rng;
use std::sync::Arc;
use ta_sniper::config::{AppConfig, TargetConfig, load_config};
use ta_sniper::feed::CoinGeckoClient;
use ta_sniper::parser::{InvestingParser, Parser};
use ta_sniper::scraper::{FirecrawlClient, Scraper};
use ta_sniper::storage::SqliteStorage;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Log details about any panic instead of dying silently
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let scraper = FirecrawlClient::new(
        config.firecrawl_api_url.clone(),
        config.firecrawl_api_key.clone(),
    );
    let feed = CoinGeckoClient::new(config.coingecko_api_key.clone());
    let parser = InvestingParser::new();

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    info!("ta-sniper started, {} target(s)", config.targets.len());

    // Main processing loop
    loop {
        let tasks: Vec<_> = config
            .targets
            .iter()
            .map(|target| process_target(target, &scraper, &feed, &parser, storage.clone()))
            .collect();
        futures::future::join_all(tasks).await;

        // jitter keeps the polls from landing on a fixed cadence
        let jitter: u64 = rand::rng().random_range(0..=15);
        let pause = config.check_interval_seconds + jitter;
        info!("Round finished, sleeping {}s...", pause);
        sleep(Duration::from_secs(pause)).await;
    }
}

/// Scrapes one target, parses the snapshot and persists it, together with a
/// live feed quote when one is configured.
async fn process_target(
    target: &TargetConfig,
    scraper: &FirecrawlClient,
    feed: &CoinGeckoClient,
    parser: &InvestingParser,
    storage: Arc<Mutex<SqliteStorage>>,
) {
    info!("Scraping {}", target.url);
    let scraped = match scraper.scrape(&target.url, target.fresh).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Scrape error for {}: {}", target.url, e);
            return;
        }
    };

    let data = match parser.parse(&scraped.markdown, &target.url) {
        Ok(data) => data,
        Err(e) => {
            // hard failure: the whole round for this target is discarded
            warn!("Parse failed entirely for {}: {}", target.url, e);
            return;
        }
    };
    info!(
        symbol = %data.symbol,
        price = data.price,
        indicators = data.technical_indicators.len(),
        moving_averages = data.moving_averages.len(),
        pivot_points = data.pivot_points.len(),
        "parsed technical snapshot"
    );

    {
        let storage = storage.lock().await;
        if let Ok(Some(previous)) = storage.latest_analysis(&data.symbol) {
            info!(
                "Previous snapshot: {:.2} at {}",
                previous.price, previous.scraped_at
            );
        }
        if let Err(e) = storage.save_analysis(&data) {
            warn!("DB save error: {}", e);
        }
    }

    if let Some(coin_id) = &target.coingecko_id {
        match feed.spot(coin_id).await {
            Ok(snapshot) => {
                if let Err(e) = storage.lock().await.save_snapshot(&data.symbol, &snapshot) {
                    warn!("DB save error: {}", e);
                }
            }
            Err(e) => warn!("Feed error for {}: {}", coin_id, e),
        }
    }
}
