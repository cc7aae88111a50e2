//! Main entry point: run one bookkeeping pass
//!
//! Opens the ledger, checks the wallet, folds the current coin listing into
//! the books and reports what is waiting for the operator.

use anyhow::Result;
use hyppool::config::Config;
use hyppool::ledger::{LedgerStorage, SqliteLedger};
use hyppool::rpc::WalletCli;
use hyppool::sync::sync_coins;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config_path =
        std::env::args().nth(1).unwrap_or_else(|| "hyppool.json".to_string());
    let config = Config::load_or_default(&config_path)?;

    let ledger = SqliteLedger::open(&config.db_path).await?;
    let wallet = WalletCli::new(config.wallet);

    match wallet.checkwallet().await {
        Ok(report) => info!("Wallet check: {}", report),
        Err(e) => warn!("Wallet check failed: {:#}", e),
    }

    let summary = sync_coins(&ledger, &wallet).await?;
    info!(
        "Books now hold {} heaps ({} newly discovered this pass)",
        ledger.heap_count().await?,
        summary.discovered
    );

    let pending = ledger.unprocessed_transactions().await?;
    if pending.is_empty() {
        info!("No transactions waiting to be processed");
    } else {
        let now = chrono::Utc::now().timestamp();
        info!("{} transactions waiting to be processed:", pending.len());
        for tx in &pending {
            let waiting_days = (now - tx.timestamp) as f64 / 86_400.0;
            info!(
                "  {} {}:{} waiting {:.1} days",
                tx.kind, tx.txid, tx.vout, waiting_days
            );
        }
    }

    Ok(())
}
