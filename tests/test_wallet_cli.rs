//! Integration tests for the wallet CLI shell-out
//!
//! These substitute ordinary system binaries for the wallet client so the
//! spawn/capture/timeout path is exercised without a running daemon.

use hyppool::config::WalletConfig;
use hyppool::rpc::WalletCli;

fn config_with_binary(binary: &str) -> WalletConfig {
    WalletConfig {
        binary: binary.to_string(),
        rpc_port: 20000,
        conf_file: "/tmp/HyperStake.conf".to_string(),
        data_dir: "/tmp/wallet/".to_string(),
        rpc_timeout_secs: 2,
        rpc_retry_attempts: 1,
        rpc_retry_backoff_ms: 10,
    }
}

#[tokio::test]
async fn stdout_is_captured_and_trimmed() {
    // echo prints the argument vector back, trailing newline included.
    let cli = WalletCli::new(config_with_binary("/bin/echo"));
    let out = cli.run_command("checkwallet").await.expect("echo runs");
    assert_eq!(
        out,
        "-rpcport=20000 -conf=/tmp/HyperStake.conf -datadir=/tmp/wallet/ checkwallet"
    );
}

#[tokio::test]
async fn missing_binary_surfaces_an_error() {
    let cli = WalletCli::new(config_with_binary("/does/not/exist/hyperstaked"));
    let err = cli.checkwallet().await.expect_err("spawn must fail");
    assert!(err.to_string().contains("failed to spawn wallet binary"));
}

#[tokio::test]
async fn nonzero_exit_surfaces_an_error() {
    let cli = WalletCli::new(config_with_binary("/bin/false"));
    assert!(cli.cclistcoins().await.is_err());
}
