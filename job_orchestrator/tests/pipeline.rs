//! End-to-end pipeline tests over in-memory raw rows and a temp feed
//! directory.

use config_manager::ScoutConfig;
use job_orchestrator::ScoutOrchestrator;
use scrape_core::{RawRow, RowKind};
use std::path::PathBuf;

fn test_config(name: &str) -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.feeds.output_dir = PathBuf::from(std::env::temp_dir())
        .join(format!("scout_pipeline_{}_{}", name, std::process::id()));
    config
}

fn listing_row(symbol: &str, txns: Option<&str>) -> RawRow {
    RawRow::new(RowKind::Listing)
        .with_field("asset_symbol", Some(symbol))
        .with_field("asset_url", Some(&format!("https://dexscreener.com/solana/{}", symbol.to_lowercase())))
        .with_field("asset_gain_rank", Some("1"))
        .with_field("asset_price", Some("0.0042"))
        .with_field("asset_24h_txns", txns)
        .with_field("asset_24h_volume", Some("$1.2M"))
        .with_field("num_makers", Some("900"))
        .with_field("price_change_24h", Some("320%"))
        .with_field("asset_liquidity", Some("$450K"))
        .with_field("asset_market_cap", Some("$12M"))
}

fn trader_row(asset: &str, wallet: &str, bought: Option<&str>, sold: Option<&str>, pnl: Option<&str>) -> RawRow {
    RawRow::new(RowKind::Trader)
        .with_field("asset_symbol", Some(asset))
        .with_field("asset_url", Some(&format!("https://dexscreener.com/solana/{}", asset.to_lowercase())))
        .with_field("bought_usd", bought)
        .with_field("sold_usd", sold)
        .with_field("pnl_usd", pnl)
        .with_field("explorer_url", Some(&format!("https://solscan.io/account/{}", wallet)))
}

fn wallet_stats_row(wallet: &str) -> RawRow {
    RawRow::new(RowKind::WalletStats)
        .with_field("wallet_address", Some(wallet))
        .with_field("tot_gross_profit", Some("$1.2M"))
        .with_field("win_rate", Some("62%"))
}

#[tokio::test]
async fn full_run_over_a_mixed_batch() {
    let mut config = test_config("full_run");
    config.crawl.listing_limit = Some(2);
    let orchestrator = ScoutOrchestrator::new(config.clone());

    let rows = vec![
        listing_row("WIF", Some("12,345")),
        listing_row("BONK", Some("9,000")),
        // Malformed: required transaction count missing
        listing_row("BROKEN", None),
        listing_row("PONKE", Some("4,200")),
        trader_row("WIF", "w1", Some("100"), Some("150"), Some("50")),
        // Malformed explorer URL: no account marker, row is skipped and
        // the rows after it still go through
        trader_row("WIF", "ignored", Some("10"), Some("20"), Some("10"))
            .with_field("explorer_url", Some("https://solscan.io/tx/deadbeef")),
        trader_row("WIF", "w2", Some("200"), Some("180"), Some("-20")),
        // Same wallet again on another asset
        trader_row("BONK", "w1", Some("100"), Some("120"), Some("20")),
        // Open position: dropped from ranking but still a valid record
        trader_row("BONK", "w3", Some("50"), None, None),
        wallet_stats_row("w1"),
    ];

    let report = orchestrator.run(rows).await.unwrap();

    assert_eq!(report.listings.records_extracted, 3);
    assert_eq!(report.listings.rows_skipped, 1);
    assert_eq!(report.traders.records_extracted, 4);
    assert_eq!(report.traders.rows_skipped, 1);
    assert_eq!(report.wallet_stats.records_extracted, 1);

    // listing_limit caps the detail crawl, not the feed
    assert_eq!(report.detail_targets.len(), 2);
    assert_eq!(report.detail_targets[0].label, "WIF");

    // w1 deduplicated, w3 dropped (no sold side), best PnL first
    assert_eq!(report.wallets_selected, vec!["w1".to_string(), "w2".to_string()]);
    assert_eq!(
        report.wallet_targets[0].url,
        "https://dexcheck.ai/app/wallet-analyzer/w1"
    );

    // All three feeds landed on disk
    assert!(config.feeds.top_gainers_path().exists());
    assert!(config.feeds.top_traders_path().exists());
    assert!(config.feeds.wallet_stats_path().exists());
    assert!(config.feeds.wallet_stats_csv_path().exists());
}

#[tokio::test]
async fn selection_runs_from_the_persisted_feed() {
    let mut config = test_config("selection");
    config.selection.top_n_cutoff = 1;
    let orchestrator = ScoutOrchestrator::new(config);

    let rows = vec![
        trader_row("WIF", "w1", Some("100"), Some("150"), Some("50")),
        trader_row("WIF", "w2", Some("200"), Some("180"), Some("-20")),
    ];
    orchestrator.process_trader_batch(&rows).await.unwrap();

    let selection = orchestrator.select_wallets().await.unwrap();
    assert_eq!(selection.ranked.len(), 2);
    assert_eq!(selection.wallets, vec!["w1".to_string()]);
}

#[tokio::test]
async fn without_a_listing_limit_every_listing_expands() {
    let orchestrator = ScoutOrchestrator::new(test_config("no_limit"));

    let rows = vec![
        listing_row("WIF", Some("12,345")),
        listing_row("BONK", Some("9,000")),
        listing_row("PONKE", Some("4,200")),
    ];
    let outcome = orchestrator.process_listing_batch(&rows).await.unwrap();
    assert_eq!(outcome.detail_targets.len(), 3);
}

#[tokio::test]
async fn empty_batch_is_a_valid_run() {
    let orchestrator = ScoutOrchestrator::new(test_config("empty"));
    let report = orchestrator.run(Vec::new()).await.unwrap();

    assert_eq!(report.listings.records_extracted, 0);
    assert_eq!(report.traders.records_extracted, 0);
    assert!(report.wallets_selected.is_empty());
    assert!(report.detail_targets.is_empty());
}

#[tokio::test]
async fn raw_rows_deserialize_from_collaborator_json() {
    let json = r#"[
        {
            "kind": "listing",
            "fields": {
                "asset_symbol": "WIF",
                "asset_url": "https://dexscreener.com/solana/wif",
                "asset_24h_txns": "12,345",
                "num_makers": "900",
                "asset_price": null
            }
        },
        {
            "kind": "wallet_stats",
            "fields": {"wallet_address": "w1"}
        }
    ]"#;

    let rows: Vec<RawRow> = serde_json::from_str(json).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, RowKind::Listing);
    assert_eq!(rows[1].kind, RowKind::WalletStats);
    assert_eq!(rows[0].raw("asset_price"), None);
}
