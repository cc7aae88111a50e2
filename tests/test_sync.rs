//! Integration tests for the coin ingestion pass

use hyppool::ledger::{LedgerStorage, SqliteLedger};
use hyppool::rpc::ListedCoin;
use hyppool::sync::ingest_coins;
use hyppool::types::{HeapStatus, CONFIRMED_DEPTH, UHYP_PER_HYP};

async fn temp_ledger() -> SqliteLedger {
    let path = std::env::temp_dir().join(format!("hyppool-sync-{}.db", rand::random::<u64>()));
    SqliteLedger::open(path.to_str().expect("utf8 temp path"))
        .await
        .expect("Failed to open test ledger")
}

fn coin(txid: &str, vout: i64, confirmations: i64) -> ListedCoin {
    ListedCoin {
        address: "HTestAddr".to_string(),
        txid: txid.to_string(),
        vout,
        amount: 12.5,
        confirmations,
        time: 1_400_000_000,
    }
}

#[tokio::test]
async fn unknown_coins_become_incoming_heaps() {
    let ledger = temp_ledger().await;

    let summary = ingest_coins(&ledger, vec![coin("aaaa", 0, 3), coin("bbbb", 1, 7)])
        .await
        .expect("ingest");
    assert_eq!(summary.listed, 2);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.refreshed, 0);

    let stored = ledger.get_heap("aaaa", 0).await.expect("query").expect("present");
    assert_eq!(stored.status, HeapStatus::Incoming);
    assert_eq!(stored.amount, 12 * UHYP_PER_HYP + UHYP_PER_HYP / 2);
    assert_eq!(stored.confirmations, 3);
}

#[tokio::test]
async fn known_coins_get_their_confirmations_refreshed() {
    let ledger = temp_ledger().await;

    ingest_coins(&ledger, vec![coin("aaaa", 0, 3)]).await.expect("first pass");

    let summary = ingest_coins(&ledger, vec![coin("aaaa", 0, 9)]).await.expect("second pass");
    assert_eq!(summary.discovered, 0);
    assert_eq!(summary.refreshed, 1);

    let stored = ledger.get_heap("aaaa", 0).await.expect("query").expect("present");
    assert_eq!(stored.confirmations, 9);
}

#[tokio::test]
async fn unchanged_confirmations_are_left_alone() {
    let ledger = temp_ledger().await;

    ingest_coins(&ledger, vec![coin("aaaa", 0, 3)]).await.expect("first pass");
    let summary = ingest_coins(&ledger, vec![coin("aaaa", 0, 3)]).await.expect("second pass");
    assert_eq!(summary.refreshed, 0);
}

#[tokio::test]
async fn entrenched_heaps_stop_being_tracked() {
    let ledger = temp_ledger().await;

    ingest_coins(&ledger, vec![coin("aaaa", 0, CONFIRMED_DEPTH)]).await.expect("first pass");

    // The wallet keeps counting but the books no longer care.
    let summary = ingest_coins(&ledger, vec![coin("aaaa", 0, CONFIRMED_DEPTH + 50)])
        .await
        .expect("second pass");
    assert_eq!(summary.refreshed, 0);

    let stored = ledger.get_heap("aaaa", 0).await.expect("query").expect("present");
    assert_eq!(stored.confirmations, CONFIRMED_DEPTH);
}

#[tokio::test]
async fn ingesting_an_empty_listing_is_a_no_op() {
    let ledger = temp_ledger().await;

    let summary = ingest_coins(&ledger, Vec::new()).await.expect("ingest");
    assert_eq!(summary.listed, 0);
    assert_eq!(ledger.heap_count().await.expect("count"), 0);
}
