//! SQLite implementation of the pool ledger
//!
//! Four tables, created idempotently on open. Every value travels through a
//! bind parameter; enum columns are stored as their SCREAMING_SNAKE text and
//! parsed back on read.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, FromRow, Pool, Sqlite};
use tracing::{debug, info};

use crate::ledger::storage::LedgerStorage;
use crate::types::{Address, CoinHeap, HeapStatus, Pool as StakePool, WalletTx};

/// Helper types for deserializing rows; enum text is parsed in the
/// conversions below so a corrupt column surfaces as an error, not a panic.

#[derive(FromRow)]
struct AddressRow {
    address: String,
    address_type: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = anyhow::Error;

    fn try_from(row: AddressRow) -> Result<Self> {
        Ok(Address {
            kind: row
                .address_type
                .parse()
                .with_context(|| format!("address {} has a bad type column", row.address))?,
            address: row.address,
        })
    }
}

#[derive(FromRow)]
struct HeapRow {
    name: String,
    txid: String,
    vout: i64,
    amount: i64,
    confirmations: i64,
    time_created: i64,
    status: String,
}

impl TryFrom<HeapRow> for CoinHeap {
    type Error = anyhow::Error;

    fn try_from(row: HeapRow) -> Result<Self> {
        Ok(CoinHeap {
            status: row
                .status
                .parse()
                .with_context(|| format!("heap {}:{} has a bad status column", row.txid, row.vout))?,
            name: row.name,
            txid: row.txid,
            vout: row.vout,
            amount: row.amount,
            confirmations: row.confirmations,
            time_created: row.time_created,
        })
    }
}

#[derive(FromRow)]
struct PoolRow {
    name: String,
    pool_type: String,
    fill_amount: i64,
    mint_amount: i64,
    bonus_amount: i64,
}

impl TryFrom<PoolRow> for StakePool {
    type Error = anyhow::Error;

    fn try_from(row: PoolRow) -> Result<Self> {
        Ok(StakePool {
            kind: row
                .pool_type
                .parse()
                .with_context(|| format!("pool {} has a bad type column", row.name))?,
            name: row.name,
            fill_amount: row.fill_amount,
            mint_amount: row.mint_amount,
            bonus_amount: row.bonus_amount,
        })
    }
}

#[derive(FromRow)]
struct TxRow {
    txid: String,
    vout: i64,
    tx_timestamp: i64,
    tx_type: String,
    processed_time: i64,
}

impl TryFrom<TxRow> for WalletTx {
    type Error = anyhow::Error;

    fn try_from(row: TxRow) -> Result<Self> {
        Ok(WalletTx {
            kind: row
                .tx_type
                .parse()
                .with_context(|| format!("tx {}:{} has a bad type column", row.txid, row.vout))?,
            txid: row.txid,
            vout: row.vout,
            timestamp: row.tx_timestamp,
            processed_time: row.processed_time,
        })
    }
}

/// SqliteLedger provides persistent storage for the pool books using a
/// single-file SQLite database.
pub struct SqliteLedger {
    pool: Pool<Sqlite>,
}

impl SqliteLedger {
    /// Open (creating if necessary) the database at `db_path` and make sure
    /// the schema exists.
    pub async fn open(db_path: &str) -> Result<Self> {
        // Make sure the directory exists in case the database needs creating.
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .context("Failed to connect to SQLite database")?;

        Self::create_schema(&pool).await?;

        info!("SqliteLedger initialized and connected to {}", db_path);

        Ok(Self { pool })
    }

    async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS addresses (
                address TEXT PRIMARY KEY,
                address_type TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create addresses table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS heaps (
                name TEXT NOT NULL,
                txid TEXT NOT NULL,
                vout INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                confirmations INTEGER NOT NULL,
                time_created INTEGER NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (txid, vout)
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create heaps table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pools (
                name TEXT PRIMARY KEY,
                pool_type TEXT NOT NULL,
                fill_amount INTEGER NOT NULL,
                mint_amount INTEGER NOT NULL,
                bonus_amount INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create pools table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                txid TEXT NOT NULL,
                vout INTEGER NOT NULL,
                tx_timestamp INTEGER NOT NULL,
                tx_type TEXT NOT NULL,
                processed_time INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (txid, vout)
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create transactions table")?;

        Ok(())
    }

    /// Shared pool handle for components that want to run their own queries.
    pub fn db_pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl LedgerStorage for SqliteLedger {
    async fn insert_address(&self, address: &Address) -> Result<()> {
        debug!("Inserting address {}", address.address);
        sqlx::query("INSERT INTO addresses (address, address_type) VALUES (?, ?)")
            .bind(&address.address)
            .bind(address.kind.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to insert address {}", address.address))?;
        Ok(())
    }

    async fn get_address(&self, address: &str) -> Result<Option<Address>> {
        let row: Option<AddressRow> =
            sqlx::query_as("SELECT address, address_type FROM addresses WHERE address = ?")
                .bind(address)
                .fetch_optional(&self.pool)
                .await
                .context("failed to fetch address")?;
        row.map(Address::try_from).transpose()
    }

    async fn list_addresses(&self) -> Result<Vec<Address>> {
        let rows: Vec<AddressRow> =
            sqlx::query_as("SELECT address, address_type FROM addresses ORDER BY address")
                .fetch_all(&self.pool)
                .await
                .context("failed to list addresses")?;
        rows.into_iter().map(Address::try_from).collect()
    }

    async fn insert_heap(&self, heap: &CoinHeap) -> Result<()> {
        debug!("Inserting heap {} at {}:{}", heap.name, heap.txid, heap.vout);
        sqlx::query(
            r#"
            INSERT INTO heaps (name, txid, vout, amount, confirmations, time_created, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&heap.name)
        .bind(&heap.txid)
        .bind(heap.vout)
        .bind(heap.amount)
        .bind(heap.confirmations)
        .bind(heap.time_created)
        .bind(heap.status.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert heap {}:{}", heap.txid, heap.vout))?;
        Ok(())
    }

    async fn get_heap(&self, txid: &str, vout: i64) -> Result<Option<CoinHeap>> {
        let row: Option<HeapRow> =
            sqlx::query_as("SELECT * FROM heaps WHERE txid = ? AND vout = ?")
                .bind(txid)
                .bind(vout)
                .fetch_optional(&self.pool)
                .await
                .context("failed to fetch heap by outpoint")?;
        row.map(CoinHeap::try_from).transpose()
    }

    async fn get_heap_by_name(&self, name: &str) -> Result<Option<CoinHeap>> {
        let row: Option<HeapRow> = sqlx::query_as("SELECT * FROM heaps WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch heap by name")?;
        row.map(CoinHeap::try_from).transpose()
    }

    async fn list_heaps_by_status(&self, status: HeapStatus) -> Result<Vec<CoinHeap>> {
        let rows: Vec<HeapRow> =
            sqlx::query_as("SELECT * FROM heaps WHERE status = ? ORDER BY time_created ASC")
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
                .context("failed to list heaps by status")?;
        rows.into_iter().map(CoinHeap::try_from).collect()
    }

    async fn update_heap_status(&self, txid: &str, vout: i64, status: HeapStatus) -> Result<()> {
        debug!("Moving heap {}:{} to {}", txid, vout, status);
        let result = sqlx::query("UPDATE heaps SET status = ? WHERE txid = ? AND vout = ?")
            .bind(status.as_str())
            .bind(txid)
            .bind(vout)
            .execute(&self.pool)
            .await
            .context("failed to update heap status")?;
        if result.rows_affected() == 0 {
            bail!("no heap at {}:{}", txid, vout);
        }
        Ok(())
    }

    async fn update_heap_confirmations(
        &self,
        txid: &str,
        vout: i64,
        confirmations: i64,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE heaps SET confirmations = ? WHERE txid = ? AND vout = ?")
            .bind(confirmations)
            .bind(txid)
            .bind(vout)
            .execute(&self.pool)
            .await
            .context("failed to update heap confirmations")?;
        if result.rows_affected() == 0 {
            bail!("no heap at {}:{}", txid, vout);
        }
        Ok(())
    }

    async fn insert_pool(&self, pool: &StakePool) -> Result<()> {
        debug!("Inserting pool {}", pool.name);
        sqlx::query(
            r#"
            INSERT INTO pools (name, pool_type, fill_amount, mint_amount, bonus_amount)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pool.name)
        .bind(pool.kind.as_str())
        .bind(pool.fill_amount)
        .bind(pool.mint_amount)
        .bind(pool.bonus_amount)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert pool {}", pool.name))?;
        Ok(())
    }

    async fn get_pool(&self, name: &str) -> Result<Option<StakePool>> {
        let row: Option<PoolRow> = sqlx::query_as("SELECT * FROM pools WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch pool")?;
        row.map(StakePool::try_from).transpose()
    }

    async fn list_pools(&self) -> Result<Vec<StakePool>> {
        let rows: Vec<PoolRow> = sqlx::query_as("SELECT * FROM pools ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("failed to list pools")?;
        rows.into_iter().map(StakePool::try_from).collect()
    }

    async fn insert_transaction(&self, tx: &WalletTx) -> Result<()> {
        debug!("Inserting transaction {}:{}", tx.txid, tx.vout);
        sqlx::query(
            r#"
            INSERT INTO transactions (txid, vout, tx_timestamp, tx_type, processed_time)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.txid)
        .bind(tx.vout)
        .bind(tx.timestamp)
        .bind(tx.kind.as_str())
        .bind(tx.processed_time)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert transaction {}:{}", tx.txid, tx.vout))?;
        Ok(())
    }

    async fn get_transaction(&self, txid: &str, vout: i64) -> Result<Option<WalletTx>> {
        let row: Option<TxRow> =
            sqlx::query_as("SELECT * FROM transactions WHERE txid = ? AND vout = ?")
                .bind(txid)
                .bind(vout)
                .fetch_optional(&self.pool)
                .await
                .context("failed to fetch transaction")?;
        row.map(WalletTx::try_from).transpose()
    }

    async fn delete_transaction(&self, txid: &str, vout: i64) -> Result<()> {
        debug!("Deleting transaction {}:{}", txid, vout);
        sqlx::query("DELETE FROM transactions WHERE txid = ? AND vout = ?")
            .bind(txid)
            .bind(vout)
            .execute(&self.pool)
            .await
            .context("failed to delete transaction")?;
        Ok(())
    }

    async fn unprocessed_transactions(&self) -> Result<Vec<WalletTx>> {
        let rows: Vec<TxRow> = sqlx::query_as(
            r#"
            SELECT * FROM transactions
            WHERE processed_time = 0
            ORDER BY tx_timestamp ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list unprocessed transactions")?;
        rows.into_iter().map(WalletTx::try_from).collect()
    }

    async fn mark_transaction_processed(
        &self,
        txid: &str,
        vout: i64,
        processed_time: i64,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE transactions SET processed_time = ? WHERE txid = ? AND vout = ?")
                .bind(processed_time)
                .bind(txid)
                .bind(vout)
                .execute(&self.pool)
                .await
                .context("failed to mark transaction processed")?;
        if result.rows_affected() == 0 {
            bail!("no transaction at {}:{}", txid, vout);
        }
        Ok(())
    }

    async fn heap_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM heaps")
            .fetch_one(&self.pool)
            .await
            .context("failed to count heaps")?;
        Ok(count.0)
    }

    async fn health_check(&self) -> Result<bool> {
        let result: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("storage health check failed")?;
        Ok(result.0 == 1)
    }
}
