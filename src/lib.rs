pub mod config;
pub mod feed;
pub mod model;
pub mod parser;
pub mod scraper;
pub mod storage;
