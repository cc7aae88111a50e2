//! Runtime configuration
//!
//! The wallet invocation stub (binary, rpc port, conf file, data dir) and the
//! database location all come from a JSON config file so that nothing about
//! the operator's deployment is baked into the code.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Top-level configuration, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite database file.
    pub db_path: String,
    pub wallet: WalletConfig,
}

/// How to reach the wallet daemon's command-line RPC client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path of the wallet client binary.
    pub binary: String,
    pub rpc_port: u16,
    /// Wallet configuration file passed as -conf.
    pub conf_file: String,
    /// Wallet data directory passed as -datadir.
    pub data_dir: String,
    /// How long to wait for a single RPC invocation before giving up.
    pub rpc_timeout_secs: u64,
    /// How many times to retry a failed invocation.
    pub rpc_retry_attempts: usize,
    /// Fixed backoff between retries, in milliseconds.
    pub rpc_retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "/home/hyp/.Hyperpool/db/hyppool.db".to_string(),
            wallet: WalletConfig::default(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            binary: "/home/hyp/.Hyperpool/wallet/hyperstaked".to_string(),
            rpc_port: 20000,
            conf_file: "/home/hyp/.Hyperpool/wallet/HyperStake.conf".to_string(),
            data_dir: "/home/hyp/.Hyperpool/wallet/".to_string(),
            rpc_timeout_secs: 5,
            rpc_retry_attempts: 3,
            rpc_retry_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if path.exists() {
            Config::load(path)
        } else {
            info!("Config file {} not found, using defaults", path.display());
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).expect("serialize");
        let parsed: Config = serde_json::from_str(&json).expect("parse back");
        assert_eq!(parsed.db_path, config.db_path);
        assert_eq!(parsed.wallet.binary, config.wallet.binary);
        assert_eq!(parsed.wallet.rpc_port, 20000);
        assert_eq!(parsed.wallet.rpc_timeout_secs, 5);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/does/not/exist.json").expect("defaults");
        assert_eq!(config.wallet.rpc_retry_attempts, 3);
    }
}
