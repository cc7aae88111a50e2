//! Storage abstraction for the pool ledger
//!
//! Formal contract for the bookkeeping tables, keeping the accessors separate
//! from the database engine that backs them.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Address, CoinHeap, HeapStatus, Pool, WalletTx};

/// Formal contract for the operator's persistent books.
///
/// Lookups of missing rows return `Ok(None)`; inserting a duplicate primary
/// key is an error surfaced to the caller. Heaps are never deleted, only
/// marked [`HeapStatus::Obsolete`].
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Store a new address.
    async fn insert_address(&self, address: &Address) -> Result<()>;

    /// Look up a single address.
    async fn get_address(&self, address: &str) -> Result<Option<Address>>;

    /// Every address we know about, ordered by address.
    async fn list_addresses(&self) -> Result<Vec<Address>>;

    /// Store a new coin heap.
    async fn insert_heap(&self, heap: &CoinHeap) -> Result<()>;

    /// Look up a heap by its outpoint.
    async fn get_heap(&self, txid: &str, vout: i64) -> Result<Option<CoinHeap>>;

    /// Look up a heap by its operator-assigned name.
    async fn get_heap_by_name(&self, name: &str) -> Result<Option<CoinHeap>>;

    /// All heaps currently in the given status, ordered by creation time.
    async fn list_heaps_by_status(&self, status: HeapStatus) -> Result<Vec<CoinHeap>>;

    /// Move a heap to a new status.
    async fn update_heap_status(&self, txid: &str, vout: i64, status: HeapStatus) -> Result<()>;

    /// Refresh a heap's confirmation count.
    async fn update_heap_confirmations(
        &self,
        txid: &str,
        vout: i64,
        confirmations: i64,
    ) -> Result<()>;

    /// Store a new pool.
    async fn insert_pool(&self, pool: &Pool) -> Result<()>;

    /// Look up a pool by name.
    async fn get_pool(&self, name: &str) -> Result<Option<Pool>>;

    /// Every pool, ordered by name.
    async fn list_pools(&self) -> Result<Vec<Pool>>;

    /// Store a new wallet transaction.
    async fn insert_transaction(&self, tx: &WalletTx) -> Result<()>;

    /// Look up a transaction by (txid, vout).
    async fn get_transaction(&self, txid: &str, vout: i64) -> Result<Option<WalletTx>>;

    /// Remove a transaction from the books.
    async fn delete_transaction(&self, txid: &str, vout: i64) -> Result<()>;

    /// Transactions not yet processed (`processed_time = 0`), oldest first.
    async fn unprocessed_transactions(&self) -> Result<Vec<WalletTx>>;

    /// Record when a transaction was processed.
    async fn mark_transaction_processed(
        &self,
        txid: &str,
        vout: i64,
        processed_time: i64,
    ) -> Result<()>;

    /// Total number of heaps ever recorded.
    async fn heap_count(&self) -> Result<i64>;

    /// Health check for the storage backend.
    async fn health_check(&self) -> Result<bool>;
}
