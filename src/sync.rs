//! Chain-state ingestion
//!
//! One pass over the wallet's coin listing: coins we have never seen become
//! INCOMING heaps, coins we already track get their confirmation count
//! refreshed. No scheduler; the caller decides when a pass runs.

use anyhow::Result;
use tracing::{debug, info};

use crate::ledger::LedgerStorage;
use crate::rpc::{ListedCoin, WalletCli};

/// What a sync pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Coins listed by the wallet.
    pub listed: usize,
    /// New heaps recorded as INCOMING.
    pub discovered: usize,
    /// Known heaps whose confirmation count was refreshed.
    pub refreshed: usize,
}

/// Fetch the wallet's coin listing and fold it into the ledger.
pub async fn sync_coins(ledger: &dyn LedgerStorage, wallet: &WalletCli) -> Result<SyncSummary> {
    let coins = wallet.list_coins().await?;
    let summary = ingest_coins(ledger, coins).await?;
    info!(
        "Sync pass complete: {} listed, {} discovered, {} refreshed",
        summary.listed, summary.discovered, summary.refreshed
    );
    Ok(summary)
}

/// Fold an already-parsed coin listing into the ledger.
pub async fn ingest_coins(
    ledger: &dyn LedgerStorage,
    coins: Vec<ListedCoin>,
) -> Result<SyncSummary> {
    let mut summary = SyncSummary { listed: coins.len(), ..Default::default() };

    for coin in coins {
        match ledger.get_heap(&coin.txid, coin.vout).await? {
            Some(known) => {
                // Past 100 confirmations the count no longer matters.
                if known.is_entrenched() || known.confirmations == coin.confirmations {
                    continue;
                }
                ledger
                    .update_heap_confirmations(&known.txid, known.vout, coin.confirmations)
                    .await?;
                summary.refreshed += 1;
            }
            None => {
                let heap = coin.into_incoming_heap();
                debug!("Discovered new heap {} ({} uHYP)", heap.name, heap.amount);
                ledger.insert_heap(&heap).await?;
                summary.discovered += 1;
            }
        }
    }

    Ok(summary)
}
