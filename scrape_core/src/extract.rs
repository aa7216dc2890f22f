//! Raw row -> typed record extraction.
//!
//! Each row kind has a fixed field schema: every named field is read
//! from the raw map and coerced to its declared type (text, int, float,
//! scaled volume, scaled percent). Construction is explicit, field by
//! field; there is no name-based dynamic lookup. Extraction performs no
//! I/O.

use regex::Regex;
use tracing::debug;

use crate::normalize::{normalize_market_scale, normalize_percent_scale, to_float_or_null, to_int_or_null, NullPolicy};
use crate::{AssetListing, RawRow, Result, ScrapeError, TraderActivity, WalletStats};

/// Extract one top-gainers row.
///
/// The symbol, URL, transaction count and maker count are required; the
/// site renders them for every row and downstream joins depend on them.
/// Everything else tolerates an empty cell.
pub fn extract_listing(row: &RawRow) -> Result<AssetListing> {
    let listing = AssetListing {
        symbol: text_required(row, "asset_symbol")?,
        name_text: text_opt(row, "asset_name_text"),
        url: text_required(row, "asset_url")?,
        gain_rank: to_int_or_null("asset_gain_rank", row.raw("asset_gain_rank"), NullPolicy::Tolerate)?,
        network: text_opt(row, "asset_network"),
        dex: text_opt(row, "dex"),
        price_usd: to_float_or_null("asset_price", row.raw("asset_price"), NullPolicy::Tolerate)?,
        age: text_opt(row, "asset_age"),
        txns_24h: require_int(row, "asset_24h_txns")?,
        volume_24h_mil: scaled_market_opt(row, "asset_24h_volume")?,
        makers: require_int(row, "num_makers")?,
        price_change_5m: scaled_percent_opt(row, "price_change_5m")?,
        price_change_1h: scaled_percent_opt(row, "price_change_1h")?,
        price_change_6h: scaled_percent_opt(row, "price_change_6h")?,
        price_change_24h: scaled_percent_opt(row, "price_change_24h")?,
        liquidity_mil: scaled_market_opt(row, "asset_liquidity")?,
        market_cap_mil: scaled_market_opt(row, "asset_market_cap")?,
    };
    debug!(symbol = %listing.symbol, "extracted listing row");
    Ok(listing)
}

/// Extract one top-traders row. The wallet address comes out of the
/// block-explorer URL; a URL without the account marker fails the row.
pub fn extract_trader(row: &RawRow) -> Result<TraderActivity> {
    let explorer_url = text_required(row, "explorer_url")?;
    let wallet_address = wallet_address_from_explorer_url(&explorer_url)?;

    Ok(TraderActivity {
        asset_symbol: text_required(row, "asset_symbol")?,
        asset_url: text_required(row, "asset_url")?,
        bought_usd: to_float_or_null("bought_usd", row.raw("bought_usd"), NullPolicy::Tolerate)?,
        bought_native: to_float_or_null("bought_native", row.raw("bought_native"), NullPolicy::Tolerate)?,
        buy_txns: to_int_or_null("buy_txns", row.raw("buy_txns"), NullPolicy::Tolerate)?,
        sold_usd: to_float_or_null("sold_usd", row.raw("sold_usd"), NullPolicy::Tolerate)?,
        sold_native: to_float_or_null("sold_native", row.raw("sold_native"), NullPolicy::Tolerate)?,
        sell_txns: to_int_or_null("sell_txns", row.raw("sell_txns"), NullPolicy::Tolerate)?,
        pnl_usd: to_float_or_null("pnl_usd", row.raw("pnl_usd"), NullPolicy::Tolerate)?,
        explorer_url,
        wallet_address,
    })
}

/// Extract one wallet analytics row. Values stay raw text.
pub fn extract_wallet_stats(row: &RawRow) -> Result<WalletStats> {
    Ok(WalletStats {
        wallet_address: text_required(row, "wallet_address")?,
        tot_gross_profit: text_opt(row, "tot_gross_profit"),
        realized_gross_profit: text_opt(row, "realized_gross_profit"),
        unrealized_gross_profit: text_opt(row, "unrealized_gross_profit"),
        tot_roi: text_opt(row, "tot_roi"),
        realized_roi: text_opt(row, "realized_roi"),
        unrealized_roi: text_opt(row, "unrealized_roi"),
        win_rate: text_opt(row, "win_rate"),
        num_wins: text_opt(row, "num_wins"),
        num_losses: text_opt(row, "num_losses"),
        trading_volume: text_opt(row, "trading_volume"),
        num_trades: text_opt(row, "num_trades"),
        avg_trade_size: text_opt(row, "avg_trade_size"),
    })
}

/// Pull the wallet address out of a block-explorer URL: everything
/// after the literal `account/` path marker.
pub fn wallet_address_from_explorer_url(url: &str) -> Result<String> {
    let re = Regex::new(r"account/(.+)$")
        .map_err(|e| ScrapeError::Extraction(format!("address pattern: {}", e)))?;

    let captures = re
        .captures(url)
        .ok_or_else(|| ScrapeError::Extraction(format!("'account/' in '{}'", url)))?;

    Ok(captures[1].to_string())
}

fn text_required(row: &RawRow, name: &str) -> Result<String> {
    row.raw(name)
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::MissingField(name.to_string()))
}

fn text_opt(row: &RawRow, name: &str) -> Option<String> {
    row.raw(name).map(str::to_string)
}

fn require_int(row: &RawRow, name: &str) -> Result<i64> {
    to_int_or_null(name, row.raw(name), NullPolicy::Require)?
        .ok_or_else(|| ScrapeError::MissingField(name.to_string()))
}

fn scaled_market_opt(row: &RawRow, name: &str) -> Result<Option<f64>> {
    row.raw(name).map(normalize_market_scale).transpose()
}

fn scaled_percent_opt(row: &RawRow, name: &str) -> Result<Option<f64>> {
    row.raw(name).map(normalize_percent_scale).transpose()
}
