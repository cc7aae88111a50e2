//! Ledger module - persistent bookkeeping for the pool operator
//!
//! Defines the storage contract for addresses, coin heaps, pools and wallet
//! transactions, plus the SQLite implementation behind it.

pub mod sqlite;
pub mod storage;

pub use sqlite::SqliteLedger;
pub use storage::LedgerStorage;
