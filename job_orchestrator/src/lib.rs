//! Drives one scouting run over the collaborator's scraped rows.
//!
//! The flow mirrors the crawl itself: top-gainer listings first (and
//! from them the detail pages worth expanding), then the per-asset
//! trader rows, then ranking and wallet selection, then the wallet
//! analytics rows from the follow-up crawl. A malformed row is logged
//! and skipped; it never takes the batch down with it.

use chrono::{DateTime, Utc};
use config_manager::ScoutConfig;
use feed_store::{FeedError, FeedStore};
use scrape_core::{
    extract_listing, extract_trader, extract_wallet_stats, rank_traders, wallet_visit_list,
    AssetListing, CrawlTarget, RankedTrader, RawRow, RowKind, TraderActivity, WalletStats,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Configuration error: {0}")]
    Config(#[from] config_manager::ConfigurationError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Extraction counters for one phase of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseStats {
    pub rows_seen: usize,
    pub records_extracted: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
}

/// Everything one run produced, for logging and for the collaborator's
/// next crawl phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub listings: PhaseStats,
    pub traders: PhaseStats,
    pub wallet_stats: PhaseStats,
    /// Asset detail pages to crawl next, capped by `listing_limit`
    pub detail_targets: Vec<CrawlTarget>,
    /// Wallet analytics pages to crawl next
    pub wallet_targets: Vec<CrawlTarget>,
    /// Distinct wallet addresses behind `wallet_targets`
    pub wallets_selected: Vec<String>,
}

#[derive(Debug)]
pub struct ListingOutcome {
    pub listings: Vec<AssetListing>,
    pub detail_targets: Vec<CrawlTarget>,
    pub stats: PhaseStats,
}

#[derive(Debug)]
pub struct TraderOutcome {
    pub traders: Vec<TraderActivity>,
    pub stats: PhaseStats,
}

#[derive(Debug)]
pub struct SelectionOutcome {
    pub ranked: Vec<RankedTrader>,
    pub wallets: Vec<String>,
    pub wallet_targets: Vec<CrawlTarget>,
}

#[derive(Debug)]
pub struct WalletStatsOutcome {
    pub records: Vec<WalletStats>,
    pub stats: PhaseStats,
}

/// Orchestrates extraction, ranking, feed persistence and crawl-target
/// derivation for one run
pub struct ScoutOrchestrator {
    config: ScoutConfig,
    feed_store: FeedStore,
}

impl ScoutOrchestrator {
    pub fn new(config: ScoutConfig) -> Self {
        let feed_store = FeedStore::new(config.feeds.clone());
        Self { config, feed_store }
    }

    /// Top-gainer rows -> listing records + the detail pages to expand
    pub async fn process_listing_batch(&self, rows: &[RawRow]) -> Result<ListingOutcome> {
        let mut stats = PhaseStats::default();
        let listings = extract_tolerant(rows, "listing", extract_listing, &mut stats);

        self.feed_store.write_top_gainers(&listings).await?;

        let limit = self.config.crawl.listing_limit.unwrap_or(listings.len());
        let detail_targets: Vec<CrawlTarget> = listings
            .iter()
            .take(limit)
            .map(|l| CrawlTarget {
                label: l.symbol.clone(),
                url: l.url.clone(),
            })
            .collect();

        info!(
            listings = listings.len(),
            skipped = stats.rows_skipped,
            expanding = detail_targets.len(),
            "listing phase complete"
        );

        Ok(ListingOutcome {
            listings,
            detail_targets,
            stats,
        })
    }

    /// Per-asset trader rows -> trader records, persisted for the
    /// selection phase
    pub async fn process_trader_batch(&self, rows: &[RawRow]) -> Result<TraderOutcome> {
        let mut stats = PhaseStats::default();
        let traders = extract_tolerant(rows, "trader", extract_trader, &mut stats);

        self.feed_store.write_top_traders(&traders).await?;

        info!(
            traders = traders.len(),
            skipped = stats.rows_skipped,
            "trader phase complete"
        );

        Ok(TraderOutcome { traders, stats })
    }

    /// Rank the persisted trader feed and pick the wallets to visit.
    /// The feed is re-read here; the selection runs against what was
    /// actually written, as the follow-up crawl would see it.
    pub async fn select_wallets(&self) -> Result<SelectionOutcome> {
        let traders = self.feed_store.read_top_traders().await?;
        let ranked = rank_traders(&traders);
        let wallets = wallet_visit_list(
            &ranked,
            self.config.selection.top_n_cutoff,
            self.config.selection.max_wallets_to_visit,
        );

        let wallet_targets: Vec<CrawlTarget> = wallets
            .iter()
            .map(|wallet| CrawlTarget {
                label: wallet.clone(),
                url: self.config.crawl.wallet_analyzer_url(wallet),
            })
            .collect();

        info!(
            traders = traders.len(),
            ranked = ranked.len(),
            wallets = wallets.len(),
            "selected wallets to visit"
        );

        Ok(SelectionOutcome {
            ranked,
            wallets,
            wallet_targets,
        })
    }

    /// Wallet analytics rows -> stats records, JSON feed + CSV export
    pub async fn process_wallet_stats_batch(&self, rows: &[RawRow]) -> Result<WalletStatsOutcome> {
        let mut stats = PhaseStats::default();
        let records = extract_tolerant(rows, "wallet_stats", extract_wallet_stats, &mut stats);

        self.feed_store.write_wallet_stats(&records).await?;

        info!(
            wallets = records.len(),
            skipped = stats.rows_skipped,
            "wallet stats phase complete"
        );

        Ok(WalletStatsOutcome { records, stats })
    }

    /// Run every phase over one mixed batch of raw rows
    pub async fn run(&self, rows: Vec<RawRow>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, rows = rows.len(), "starting scout run");

        let mut listing_rows = Vec::new();
        let mut trader_rows = Vec::new();
        let mut wallet_rows = Vec::new();
        for row in rows {
            match row.kind {
                RowKind::Listing => listing_rows.push(row),
                RowKind::Trader => trader_rows.push(row),
                RowKind::WalletStats => wallet_rows.push(row),
            }
        }

        let listing_outcome = self.process_listing_batch(&listing_rows).await?;
        let trader_outcome = self.process_trader_batch(&trader_rows).await?;
        let selection = self.select_wallets().await?;
        let wallet_outcome = self.process_wallet_stats_batch(&wallet_rows).await?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            listings: listing_outcome.stats,
            traders: trader_outcome.stats,
            wallet_stats: wallet_outcome.stats,
            detail_targets: listing_outcome.detail_targets,
            wallet_targets: selection.wallet_targets,
            wallets_selected: selection.wallets,
        };

        info!(
            %run_id,
            listings = report.listings.records_extracted,
            traders = report.traders.records_extracted,
            wallets = report.wallets_selected.len(),
            "scout run complete"
        );

        Ok(report)
    }
}

// Per-row tolerance: a failed extraction is counted, logged and
// skipped; the rest of the batch goes through.
fn extract_tolerant<T>(
    rows: &[RawRow],
    phase: &str,
    extract: impl Fn(&RawRow) -> scrape_core::Result<T>,
    stats: &mut PhaseStats,
) -> Vec<T> {
    let mut records = Vec::with_capacity(rows.len());
    stats.rows_seen = rows.len();

    for (index, row) in rows.iter().enumerate() {
        match extract(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(phase, index, error = %e, "skipping malformed row");
                stats.rows_skipped += 1;
                stats.errors.push(format!("row {}: {}", index, e));
            }
        }
    }

    stats.records_extracted = records.len();
    records
}
