// SQLite persistence for parsed snapshots and feed quotes. The indicator,
// moving-average and pivot sequences go in as opaque JSON text columns; the
// storage layer never interprets them.
use crate::model::{MarketSnapshot, StorageError, SummaryLabels, TechnicalAnalysisData};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and runs the schema. `":memory:"` works for tests.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS technical_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                price REAL NOT NULL,
                price_change REAL NOT NULL,
                price_change_percent REAL NOT NULL,
                overall_summary TEXT NOT NULL,
                technical_indicators_summary TEXT NOT NULL,
                moving_averages_summary TEXT NOT NULL,
                indicators_counts TEXT NOT NULL,
                moving_averages_counts TEXT NOT NULL,
                technical_indicators TEXT NOT NULL,
                moving_averages TEXT NOT NULL,
                pivot_points TEXT NOT NULL,
                source_url TEXT NOT NULL,
                scraped_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS market_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                usd REAL NOT NULL,
                usd_market_cap REAL NOT NULL,
                usd_24h_vol REAL NOT NULL,
                usd_24h_change REAL NOT NULL,
                last_updated_at INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analysis_symbol_time
                ON technical_analysis (symbol, scraped_at);
            ",
        )?;

        Ok(Self { conn })
    }

    pub fn save_analysis(&self, data: &TechnicalAnalysisData) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO technical_analysis (
                symbol, price, price_change, price_change_percent,
                overall_summary, technical_indicators_summary, moving_averages_summary,
                indicators_counts, moving_averages_counts,
                technical_indicators, moving_averages, pivot_points,
                source_url, scraped_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                data.symbol,
                data.price,
                data.price_change,
                data.price_change_percent,
                data.summary.overall,
                data.summary.technical_indicators,
                data.summary.moving_averages,
                serde_json::to_string(&data.technical_indicators_summary)?,
                serde_json::to_string(&data.moving_averages_summary)?,
                serde_json::to_string(&data.technical_indicators)?,
                serde_json::to_string(&data.moving_averages)?,
                serde_json::to_string(&data.pivot_points)?,
                data.source_url,
                data.scraped_at,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// Most recent snapshot for a symbol, if any was stored.
    pub fn latest_analysis(
        &self,
        symbol: &str,
    ) -> Result<Option<TechnicalAnalysisData>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT symbol, price, price_change, price_change_percent,
                        overall_summary, technical_indicators_summary, moving_averages_summary,
                        indicators_counts, moving_averages_counts,
                        technical_indicators, moving_averages, pivot_points,
                        source_url, scraped_at
                 FROM technical_analysis
                 WHERE symbol = ?1
                 ORDER BY scraped_at DESC
                 LIMIT 1",
                params![symbol],
                |row| {
                    Ok(StoredAnalysis {
                        symbol: row.get(0)?,
                        price: row.get(1)?,
                        price_change: row.get(2)?,
                        price_change_percent: row.get(3)?,
                        overall_summary: row.get(4)?,
                        technical_indicators_summary: row.get(5)?,
                        moving_averages_summary: row.get(6)?,
                        indicators_counts: row.get(7)?,
                        moving_averages_counts: row.get(8)?,
                        technical_indicators: row.get(9)?,
                        moving_averages: row.get(10)?,
                        pivot_points: row.get(11)?,
                        source_url: row.get(12)?,
                        scraped_at: row.get(13)?,
                    })
                },
            )
            .optional()?;
        row.map(StoredAnalysis::into_data).transpose()
    }

    pub fn save_snapshot(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO market_history (
                symbol, usd, usd_market_cap, usd_24h_vol, usd_24h_change,
                last_updated_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                symbol,
                snapshot.usd,
                snapshot.usd_market_cap,
                snapshot.usd_24h_vol,
                snapshot.usd_24h_change,
                snapshot.last_updated_at,
                snapshot.created_at,
            ],
        )?;
        Ok(())
    }
}

/// One row as it comes off the table, JSON columns still serialized.
struct StoredAnalysis {
    symbol: String,
    price: f64,
    price_change: f64,
    price_change_percent: f64,
    overall_summary: String,
    technical_indicators_summary: String,
    moving_averages_summary: String,
    indicators_counts: String,
    moving_averages_counts: String,
    technical_indicators: String,
    moving_averages: String,
    pivot_points: String,
    source_url: String,
    scraped_at: DateTime<Utc>,
}

impl StoredAnalysis {
    fn into_data(self) -> Result<TechnicalAnalysisData, StorageError> {
        Ok(TechnicalAnalysisData {
            symbol: self.symbol,
            price: self.price,
            price_change: self.price_change,
            price_change_percent: self.price_change_percent,
            summary: SummaryLabels {
                overall: self.overall_summary,
                technical_indicators: self.technical_indicators_summary,
                moving_averages: self.moving_averages_summary,
            },
            technical_indicators_summary: serde_json::from_str(&self.indicators_counts)?,
            moving_averages_summary: serde_json::from_str(&self.moving_averages_counts)?,
            technical_indicators: serde_json::from_str(&self.technical_indicators)?,
            moving_averages: serde_json::from_str(&self.moving_averages)?,
            pivot_points: serde_json::from_str(&self.pivot_points)?,
            scraped_at: self.scraped_at,
            source_url: self.source_url,
        })
    }
}
