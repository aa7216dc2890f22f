pub mod extract;
pub mod normalize;
pub mod ranking;

// Re-export the operations callers reach for most often
pub use extract::{extract_listing, extract_trader, extract_wallet_stats, wallet_address_from_explorer_url};
pub use normalize::{normalize_market_scale, normalize_percent_scale, to_float_or_null, to_int_or_null, NullPolicy};
pub use ranking::{competition_rank_desc, compute_percentage_pnl, rank_traders, select_top, wallet_visit_list, RankKey};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    #[error("Unparseable numeric text: '{0}'")]
    Parse(String),
    #[error("Marker not found: {0}")]
    Extraction(String),
    #[error("Required field missing: {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Which page a raw row was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Listing,
    Trader,
    WalletStats,
}

/// One scraped row as delivered by the crawl collaborator: named text
/// fields, any of which may be null when the page omitted the cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub kind: RowKind,
    pub fields: HashMap<String, Option<String>>,
}

impl RawRow {
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: Option<&str>) -> Self {
        self.fields.insert(name.to_string(), value.map(str::to_string));
        self
    }

    /// Field lookup; an absent key and an explicit null read the same
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// One row of the top-gainers table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetListing {
    /// Base token symbol
    pub symbol: String,

    /// Display name text next to the symbol
    pub name_text: Option<String>,

    /// Detail-page URL; identity of the listing
    pub url: String,

    /// Position in the gainers table
    pub gain_rank: Option<i64>,

    /// Network/chain name
    pub network: Option<String>,

    /// Exchange the pair trades on
    pub dex: Option<String>,

    /// Latest price in USD
    pub price_usd: Option<f64>,

    /// Pair age as displayed (e.g. "3h", "2d")
    pub age: Option<String>,

    /// Transactions in the last 24 hours
    pub txns_24h: i64,

    /// 24h volume in millions of USD
    pub volume_24h_mil: Option<f64>,

    /// Distinct makers in the last 24 hours
    pub makers: i64,

    /// Price change percentages over trailing windows
    pub price_change_5m: Option<f64>,
    pub price_change_1h: Option<f64>,
    pub price_change_6h: Option<f64>,
    pub price_change_24h: Option<f64>,

    /// Liquidity in millions of USD
    pub liquidity_mil: Option<f64>,

    /// Market cap in millions of USD
    pub market_cap_mil: Option<f64>,
}

/// One row of a per-asset top-traders table. Identity is the wallet
/// address; the same wallet may appear under several assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderActivity {
    /// Symbol of the asset this activity belongs to
    pub asset_symbol: String,

    /// Detail-page URL of the owning asset
    pub asset_url: String,

    /// Amount bought in USD
    pub bought_usd: Option<f64>,

    /// Amount bought in native token units
    pub bought_native: Option<f64>,

    /// Number of buy transactions
    pub buy_txns: Option<i64>,

    /// Amount sold in USD
    pub sold_usd: Option<f64>,

    /// Amount sold in native token units
    pub sold_native: Option<f64>,

    /// Number of sell transactions
    pub sell_txns: Option<i64>,

    /// Realized profit and loss in USD; the site leaves this blank for
    /// positions that are still open
    pub pnl_usd: Option<f64>,

    /// Block-explorer URL for the trader
    pub explorer_url: String,

    /// Wallet address parsed out of the explorer URL
    pub wallet_address: String,
}

/// A trader row augmented with derived metrics and rank columns.
/// Recomputed whenever the full trader set changes; never persisted
/// independently of its source rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTrader {
    #[serde(flatten)]
    pub activity: TraderActivity,

    /// PnL as a percentage of the amount bought, rounded to 2 decimals
    pub pct_pnl: f64,

    /// Competition rank by absolute PnL (1 = highest)
    pub abs_pnl_rank: u32,

    /// Competition rank by percentage PnL (1 = highest)
    pub pct_pnl_rank: u32,
}

/// Aggregate statistics scraped from a wallet analytics page. All
/// values are kept exactly as extracted; downstream consumers decide
/// how to coerce them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStats {
    pub wallet_address: String,
    pub tot_gross_profit: Option<String>,
    pub realized_gross_profit: Option<String>,
    pub unrealized_gross_profit: Option<String>,
    pub tot_roi: Option<String>,
    pub realized_roi: Option<String>,
    pub unrealized_roi: Option<String>,
    pub win_rate: Option<String>,
    pub num_wins: Option<String>,
    pub num_losses: Option<String>,
    pub trading_volume: Option<String>,
    pub num_trades: Option<String>,
    pub avg_trade_size: Option<String>,
}

/// A page the collaborator should fetch next, derived from extracted
/// records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    /// What the page is about (asset symbol or wallet address)
    pub label: String,
    pub url: String,
}
