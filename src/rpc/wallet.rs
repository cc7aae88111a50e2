//! Wallet daemon CLI client
//!
//! Each RPC call spawns the wallet client binary with the configured
//! invocation stub (-rpcport, -conf, -datadir) plus the command name, waits
//! for it with a timeout, and returns trimmed stdout. Failed spawns and
//! timeouts are retried with a fixed backoff before surfacing an error.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::timeout;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, warn};

use crate::config::WalletConfig;
use crate::types::{uhyp_from_hyp, CoinHeap, HeapStatus};

/// One coin entry from the `cclistcoins` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedCoin {
    pub address: String,
    pub txid: String,
    pub vout: i64,
    /// Amount in HYP as the wallet reports it.
    pub amount: f64,
    pub confirmations: i64,
    /// Seconds since the UNIX epoch.
    pub time: i64,
}

impl ListedCoin {
    /// Turn a freshly listed coin into an INCOMING heap named after its
    /// outpoint, converting the wallet's HYP amount to uHYP.
    pub fn into_incoming_heap(self) -> CoinHeap {
        // The txid is daemon output; truncate only on a char boundary.
        let short = self.txid.get(..8).unwrap_or(&self.txid);
        CoinHeap {
            name: format!("incoming-{}:{}", short, self.vout),
            amount: uhyp_from_hyp(self.amount),
            txid: self.txid,
            vout: self.vout,
            confirmations: self.confirmations,
            time_created: self.time,
            status: HeapStatus::Incoming,
        }
    }
}

/// Shell-out client for the wallet daemon's RPC interface.
pub struct WalletCli {
    config: WalletConfig,
}

impl WalletCli {
    pub fn new(config: WalletConfig) -> Self {
        Self { config }
    }

    /// The full argument vector for one command, invocation stub included.
    fn cmdline(&self, command: &str) -> Vec<String> {
        vec![
            format!("-rpcport={}", self.config.rpc_port),
            format!("-conf={}", self.config.conf_file),
            format!("-datadir={}", self.config.data_dir),
            command.to_string(),
        ]
    }

    /// Spawn the wallet binary once and capture its output.
    async fn invoke(&self, command: &str) -> Result<String> {
        let args = self.cmdline(command);
        debug!("Running RPC command: {} {:?}", self.config.binary, args);

        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn wallet binary {}", self.config.binary))?;

        let output = timeout(
            Duration::from_secs(self.config.rpc_timeout_secs),
            child.wait_with_output(),
        )
        .await
        .with_context(|| format!("wallet command {} timed out", command))?
        .context("failed to collect wallet output")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "wallet command {} exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Received RPC response ({} bytes)", stdout.len());
        Ok(stdout)
    }

    /// Run one RPC command, retrying failed invocations with a fixed backoff.
    pub async fn run_command(&self, command: &str) -> Result<String> {
        let strategy = FixedInterval::from_millis(self.config.rpc_retry_backoff_ms)
            .take(self.config.rpc_retry_attempts);
        Retry::spawn(strategy, || async {
            match self.invoke(command).await {
                Ok(out) => Ok(out),
                Err(e) => {
                    warn!("wallet command {} failed, may retry: {:#}", command, e);
                    Err(e)
                }
            }
        })
        .await
    }

    /// Run the wallet integrity check; returns the daemon's JSON verbatim.
    pub async fn checkwallet(&self) -> Result<String> {
        self.run_command("checkwallet").await
    }

    /// Run the coin listing; returns the daemon's JSON verbatim.
    pub async fn cclistcoins(&self) -> Result<String> {
        self.run_command("cclistcoins").await
    }

    /// Run the coin listing and parse it.
    pub async fn list_coins(&self) -> Result<Vec<ListedCoin>> {
        let raw = self.cclistcoins().await?;
        parse_coin_listing(&raw)
    }
}

/// Parse the JSON array `cclistcoins` prints.
pub fn parse_coin_listing(raw: &str) -> Result<Vec<ListedCoin>> {
    serde_json::from_str(raw).context("failed to parse cclistcoins output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UHYP_PER_HYP;

    fn test_config() -> WalletConfig {
        WalletConfig {
            binary: "/usr/local/bin/hyperstaked".to_string(),
            rpc_port: 20000,
            conf_file: "/tmp/HyperStake.conf".to_string(),
            data_dir: "/tmp/wallet/".to_string(),
            rpc_timeout_secs: 5,
            rpc_retry_attempts: 1,
            rpc_retry_backoff_ms: 10,
        }
    }

    #[test]
    fn cmdline_carries_the_invocation_stub() {
        let cli = WalletCli::new(test_config());
        assert_eq!(
            cli.cmdline("cclistcoins"),
            vec![
                "-rpcport=20000".to_string(),
                "-conf=/tmp/HyperStake.conf".to_string(),
                "-datadir=/tmp/wallet/".to_string(),
                "cclistcoins".to_string(),
            ]
        );
    }

    #[test]
    fn coin_listing_parses_and_converts() {
        let raw = r#"[
            {"address": "HTestAddr1", "txid": "aabbccddeeff0011", "vout": 0,
             "amount": 1250.5, "confirmations": 42, "time": 1400000000},
            {"address": "HTestAddr2", "txid": "0123", "vout": 3,
             "amount": 0.000001, "confirmations": 120, "time": 1400000500}
        ]"#;
        let coins = parse_coin_listing(raw).expect("parse listing");
        assert_eq!(coins.len(), 2);

        let heap = coins[0].clone().into_incoming_heap();
        assert_eq!(heap.name, "incoming-aabbccdd:0");
        assert_eq!(heap.amount, 1250 * UHYP_PER_HYP + UHYP_PER_HYP / 2);
        assert_eq!(heap.status, HeapStatus::Incoming);

        let heap = coins[1].clone().into_incoming_heap();
        assert_eq!(heap.name, "incoming-0123:3");
        assert_eq!(heap.amount, 1);
    }

    #[test]
    fn garbage_listing_is_an_error() {
        assert!(parse_coin_listing("wallet is still syncing").is_err());
    }

    #[test]
    fn multibyte_txid_truncates_without_panicking() {
        // 12 bytes of multi-byte chars puts byte 8 mid-char; the name falls
        // back to the whole txid instead of slicing through it.
        let coin = ListedCoin {
            address: "HTestAddr".to_string(),
            txid: "€€€€".to_string(),
            vout: 5,
            amount: 1.0,
            confirmations: 1,
            time: 0,
        };
        let heap = coin.into_incoming_heap();
        assert_eq!(heap.name, "incoming-€€€€:5");
        assert_eq!(heap.txid, "€€€€");
    }
}
