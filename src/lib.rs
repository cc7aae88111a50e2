//! Hyppool - bookkeeping ledger for a HyperStake staking pool operator
//!
//! This crate persists addresses, coin heaps, pools and wallet transactions
//! to a local SQLite database and drives the wallet daemon through its
//! command-line RPC client.

pub mod config;
pub mod ledger;
pub mod rpc;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use types::{Address, AddressKind, CoinHeap, HeapStatus, Pool, PoolKind, TxKind, WalletTx};
