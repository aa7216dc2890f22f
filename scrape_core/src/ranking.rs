//! Ranking and selection over extracted trader rows.
//!
//! The pipeline is: drop rows missing either trade side, treat a blank
//! PnL as zero, derive percentage PnL, assign competition ranks by
//! absolute and by percentage PnL, then pick the wallets worth a
//! follow-up crawl. Everything here is a deterministic function of the
//! input set; fetch completion order never changes the outcome.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::{RankedTrader, TraderActivity};

/// Which rank column drives a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    AbsolutePnl,
    PercentagePnl,
}

/// Percentage PnL for every row with both a bought and a sold side.
/// Rows missing either side are dropped from ranking entirely, not
/// carried with a null rank. A null PnL becomes 0 before the division.
pub fn compute_percentage_pnl(records: &[TraderActivity]) -> Vec<(TraderActivity, f64)> {
    let total = records.len();
    let survivors: Vec<(TraderActivity, f64)> = records
        .iter()
        .filter(|r| r.bought_usd.is_some() && r.sold_usd.is_some())
        .map(|r| {
            let bought = r.bought_usd.unwrap_or(0.0);
            let pct = round2(filled_pnl(r) / bought * 100.0);
            (r.clone(), pct)
        })
        .collect();

    debug!(
        kept = survivors.len(),
        dropped = total - survivors.len(),
        "computed percentage PnL"
    );
    survivors
}

/// Descending competition ranks: the highest value gets rank 1, tied
/// values share a rank, and the next distinct value's rank is one plus
/// the count of strictly greater values.
pub fn competition_rank_desc(values: &[f64]) -> Vec<u32> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|other| *other > v).count() as u32)
        .collect()
}

/// Full ranking pass: percentage PnL plus both rank columns, rows
/// ordered by absolute PnL descending (the order the selection step
/// deduplicates in).
pub fn rank_traders(records: &[TraderActivity]) -> Vec<RankedTrader> {
    let mut scored = compute_percentage_pnl(records);
    scored.sort_by(|a, b| {
        filled_pnl(&b.0)
            .partial_cmp(&filled_pnl(&a.0))
            .unwrap_or(Ordering::Equal)
    });

    let abs_values: Vec<f64> = scored.iter().map(|(r, _)| filled_pnl(r)).collect();
    let pct_values: Vec<f64> = scored.iter().map(|(_, pct)| *pct).collect();
    let abs_ranks = competition_rank_desc(&abs_values);
    let pct_ranks = competition_rank_desc(&pct_values);

    scored
        .into_iter()
        .zip(abs_ranks)
        .zip(pct_ranks)
        .map(|(((activity, pct_pnl), abs_pnl_rank), pct_pnl_rank)| RankedTrader {
            activity,
            pct_pnl,
            abs_pnl_rank,
            pct_pnl_rank,
        })
        .collect()
}

/// Rows whose rank under `key` is within `cutoff`, sorted descending by
/// the ranked value, deduplicated by wallet address keeping the first
/// occurrence, truncated to `max_count`. An empty result is a valid
/// outcome, not an error.
pub fn select_top(ranked: &[RankedTrader], key: RankKey, cutoff: u32, max_count: usize) -> Vec<RankedTrader> {
    let mut rows: Vec<RankedTrader> = ranked
        .iter()
        .filter(|r| rank_of(r, key) <= cutoff)
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        value_of(b, key)
            .partial_cmp(&value_of(a, key))
            .unwrap_or(Ordering::Equal)
    });

    let mut seen = HashSet::new();
    rows.retain(|r| seen.insert(r.activity.wallet_address.clone()));
    rows.truncate(max_count);
    rows
}

/// The distinct wallet addresses worth visiting: percentage-PnL rank
/// within `cutoff`, at most `max_count` wallets.
pub fn wallet_visit_list(ranked: &[RankedTrader], cutoff: u32, max_count: usize) -> Vec<String> {
    select_top(ranked, RankKey::PercentagePnl, cutoff, max_count)
        .into_iter()
        .map(|r| r.activity.wallet_address)
        .collect()
}

fn filled_pnl(record: &TraderActivity) -> f64 {
    record.pnl_usd.unwrap_or(0.0)
}

fn rank_of(record: &RankedTrader, key: RankKey) -> u32 {
    match key {
        RankKey::AbsolutePnl => record.abs_pnl_rank,
        RankKey::PercentagePnl => record.pct_pnl_rank,
    }
}

fn value_of(record: &RankedTrader, key: RankKey) -> f64 {
    match key {
        RankKey::AbsolutePnl => filled_pnl(&record.activity),
        RankKey::PercentagePnl => record.pct_pnl,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
