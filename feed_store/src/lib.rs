//! File-backed feed persistence.
//!
//! Each run overwrites its feed files: a JSON array per row kind plus a
//! CSV export of the wallet stats for spreadsheet use. The trader feed
//! is also read back, because the wallet-selection phase runs against
//! the persisted output of the previous crawl phase rather than
//! whatever happens to be in memory.

use config_manager::FeedConfig;
use scrape_core::{AssetListing, RawRow, TraderActivity, WalletStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Feed serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Reads and writes the run's feed files under the configured output
/// directory
#[derive(Debug, Clone)]
pub struct FeedStore {
    feeds: FeedConfig,
}

impl FeedStore {
    pub fn new(feeds: FeedConfig) -> Self {
        Self { feeds }
    }

    pub async fn write_top_gainers(&self, listings: &[AssetListing]) -> Result<()> {
        write_feed(&self.feeds.top_gainers_path(), listings).await
    }

    pub async fn write_top_traders(&self, traders: &[TraderActivity]) -> Result<()> {
        write_feed(&self.feeds.top_traders_path(), traders).await
    }

    /// Load the trader feed back for the selection phase
    pub async fn read_top_traders(&self) -> Result<Vec<TraderActivity>> {
        read_feed(&self.feeds.top_traders_path()).await
    }

    /// Wallet stats go out twice: the JSON feed and a flat CSV export
    pub async fn write_wallet_stats(&self, stats: &[WalletStats]) -> Result<()> {
        write_feed(&self.feeds.wallet_stats_path(), stats).await?;
        export_csv(&self.feeds.wallet_stats_csv_path(), stats).await
    }
}

/// Load a batch of raw rows produced by the crawl collaborator
pub async fn read_raw_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    read_feed(path.as_ref()).await
}

async fn write_feed<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, json).await?;

    info!(path = %path.display(), records = records.len(), "feed written");
    Ok(())
}

async fn read_feed<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = tokio::fs::read(path).await?;
    let records: Vec<T> = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), records = records.len(), "feed loaded");
    Ok(records)
}

async fn export_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| FeedError::Io(e.into_error()))?;
    tokio::fs::write(path, bytes).await?;

    info!(path = %path.display(), records = records.len(), "CSV exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_manager::ScoutConfig;
    use std::path::PathBuf;

    fn test_store(name: &str) -> FeedStore {
        let mut feeds = ScoutConfig::default().feeds;
        feeds.output_dir = PathBuf::from(std::env::temp_dir())
            .join(format!("wallet_scout_{}_{}", name, std::process::id()));
        FeedStore::new(feeds)
    }

    fn trader(wallet: &str) -> TraderActivity {
        TraderActivity {
            asset_symbol: "WIF".to_string(),
            asset_url: "https://dexscreener.com/solana/abc123".to_string(),
            bought_usd: Some(100.0),
            bought_native: Some(5000.0),
            buy_txns: Some(3),
            sold_usd: Some(150.0),
            sold_native: Some(4900.0),
            sell_txns: Some(1),
            pnl_usd: Some(50.0),
            explorer_url: format!("https://solscan.io/account/{}", wallet),
            wallet_address: wallet.to_string(),
        }
    }

    #[tokio::test]
    async fn trader_feed_round_trips() {
        let store = test_store("traders");
        let traders = vec![trader("w1"), trader("w2")];

        store.write_top_traders(&traders).await.unwrap();
        let loaded = store.read_top_traders().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].wallet_address, "w1");
        assert_eq!(loaded[0].pnl_usd, Some(50.0));
        assert_eq!(loaded[1].wallet_address, "w2");
    }

    #[tokio::test]
    async fn wallet_stats_csv_has_header_and_rows() {
        let store = test_store("stats");
        let stats = vec![WalletStats {
            wallet_address: "w1".to_string(),
            tot_gross_profit: Some("$1.2M".to_string()),
            realized_gross_profit: None,
            unrealized_gross_profit: None,
            tot_roi: Some("34%".to_string()),
            realized_roi: None,
            unrealized_roi: None,
            win_rate: Some("62%".to_string()),
            num_wins: Some("31".to_string()),
            num_losses: Some("19".to_string()),
            trading_volume: Some("$3.4M".to_string()),
            num_trades: Some("50".to_string()),
            avg_trade_size: Some("$68K".to_string()),
        }];

        store.write_wallet_stats(&stats).await.unwrap();

        let csv_path = store.feeds.wallet_stats_csv_path();
        let contents = tokio::fs::read_to_string(csv_path).await.unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("wallet_address,"));
        assert_eq!(lines.count(), 1);
    }

    #[tokio::test]
    async fn raw_row_batches_load() {
        let dir = PathBuf::from(std::env::temp_dir())
            .join(format!("wallet_scout_raw_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("batch.json");

        let json = r#"[
            {"kind": "trader", "fields": {"asset_symbol": "WIF", "pnl_usd": null}}
        ]"#;
        tokio::fs::write(&path, json).await.unwrap();

        let rows = read_raw_rows(&path).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw("asset_symbol"), Some("WIF"));
        assert_eq!(rows[0].raw("pnl_usd"), None);
    }
}
