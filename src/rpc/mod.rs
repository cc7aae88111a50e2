//! RPC module - wallet daemon access through its command-line client
//!
//! The wallet daemon has no socket API we use directly; every query shells
//! out to the client binary and captures its stdout.

pub mod wallet;

pub use wallet::{ListedCoin, WalletCli};
