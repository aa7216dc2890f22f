use anyhow::{Context, Result};
use config_manager::ScoutConfig;
use job_orchestrator::ScoutOrchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let rows_path = args
        .next()
        .context("usage: wallet_scout <raw_rows.json> [config.toml]")?;
    let config = match args.next() {
        Some(path) => ScoutConfig::load_from_path(path)?,
        None => ScoutConfig::load()?,
    };

    let rows = feed_store::read_raw_rows(&rows_path)
        .await
        .with_context(|| format!("reading raw rows from {}", rows_path))?;
    info!(rows = rows.len(), path = %rows_path, "loaded raw rows");

    let orchestrator = ScoutOrchestrator::new(config.clone());
    let report = orchestrator.run(rows).await?;

    info!(
        listings = report.listings.records_extracted,
        traders = report.traders.records_extracted,
        wallet_stats = report.wallet_stats.records_extracted,
        skipped = report.listings.rows_skipped + report.traders.rows_skipped + report.wallet_stats.rows_skipped,
        "run {} finished",
        report.run_id
    );
    for target in &report.wallet_targets {
        info!(wallet = %target.label, url = %target.url, "queued wallet for the next crawl");
    }

    if config.system.debug_mode {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
