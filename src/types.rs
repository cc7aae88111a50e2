//! Domain model for the staking pool ledger
//!
//! Amounts are kept in uHYP (one millionth of a HYP) as `i64`, matching the
//! INTEGER columns they are persisted to. All enums round-trip losslessly
//! through their SCREAMING_SNAKE text form, which is what the database stores.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// uHYP per HYP.
pub const UHYP_PER_HYP: i64 = 1_000_000;

/// Age in seconds after which a heap is old enough to stake (8.8 days).
pub const MATURITY_SECS: i64 = 760_320;

/// Confirmation depth past which we stop tracking confirmations; the heap is
/// considered firmly entrenched in the chain.
pub const CONFIRMED_DEPTH: i64 = 100;

/// Convert a wallet-reported HYP amount to uHYP.
pub fn uhyp_from_hyp(hyp: f64) -> i64 {
    (hyp * UHYP_PER_HYP as f64).round() as i64
}

/// Convert a stored uHYP amount back to HYP for display.
pub fn hyp_from_uhyp(uhyp: i64) -> f64 {
    uhyp as f64 / UHYP_PER_HYP as f64
}

/// What a known address is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressKind {
    /// Not yet classified. Coins sent from it stay in limbo until the
    /// operator assigns a kind.
    Unknown,
    /// Receives incoming pool payments from investors.
    PoolIncoming,
    /// A normal investor, paid out as pools mint.
    InvestorPaid,
    /// An investor whose returns are compounded back into the pool.
    InvestorCompound,
    /// Receives bonus pool money.
    Bonus,
    /// Receives endowment pool money.
    Endowment,
    /// Receives lottery entries.
    Lottery,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Unknown => "UNKNOWN",
            AddressKind::PoolIncoming => "POOL_INCOMING",
            AddressKind::InvestorPaid => "INVESTOR_PAID",
            AddressKind::InvestorCompound => "INVESTOR_COMPOUND",
            AddressKind::Bonus => "BONUS",
            AddressKind::Endowment => "ENDOWMENT",
            AddressKind::Lottery => "LOTTERY",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "UNKNOWN" => AddressKind::Unknown,
            "POOL_INCOMING" => AddressKind::PoolIncoming,
            "INVESTOR_PAID" => AddressKind::InvestorPaid,
            "INVESTOR_COMPOUND" => AddressKind::InvestorCompound,
            "BONUS" => AddressKind::Bonus,
            "ENDOWMENT" => AddressKind::Endowment,
            "LOTTERY" => AddressKind::Lottery,
            other => bail!("unknown address kind: {}", other),
        })
    }
}

/// A HYP address we track, with its assigned role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub kind: AddressKind,
}

/// The kind of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolKind {
    /// Coins owned by the pool itself, for fees and working float.
    Float,
    Pool,
    Bonus,
    Lottery,
    Endowment,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Float => "FLOAT",
            PoolKind::Pool => "POOL",
            PoolKind::Bonus => "BONUS",
            PoolKind::Lottery => "LOTTERY",
            PoolKind::Endowment => "ENDOWMENT",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "FLOAT" => PoolKind::Float,
            "POOL" => PoolKind::Pool,
            "BONUS" => PoolKind::Bonus,
            "LOTTERY" => PoolKind::Lottery,
            "ENDOWMENT" => PoolKind::Endowment,
            other => bail!("unknown pool kind: {}", other),
        })
    }
}

/// A staking pool and its configured amounts (all uHYP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub kind: PoolKind,
    pub fill_amount: i64,
    pub mint_amount: i64,
    pub bonus_amount: i64,
}

/// Lifecycle stage of a heap inside a pool.
///
/// Every pooled heap walks Filling -> Maturing -> Staking -> Minted. The
/// Maturing -> Staking step is gated by the maturity window
/// ([`MATURITY_SECS`]); Minted is terminal until the payout is dispersed and
/// the heap goes obsolete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolStage {
    Filling,
    Maturing,
    Staking,
    Minted,
}

impl PoolStage {
    /// The next stage, or `None` from the terminal Minted stage.
    pub fn next(&self) -> Option<PoolStage> {
        match self {
            PoolStage::Filling => Some(PoolStage::Maturing),
            PoolStage::Maturing => Some(PoolStage::Staking),
            PoolStage::Staking => Some(PoolStage::Minted),
            PoolStage::Minted => None,
        }
    }
}

/// Status of a coin heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeapStatus {
    /// Incoming coins not yet processed or allocated.
    Incoming,
    /// Owned by the pool itself for fees and working float.
    Float,
    PoolFilling,
    PoolMaturing,
    PoolStaking,
    PoolMinted,
    BonusFilling,
    BonusMaturing,
    BonusStaking,
    BonusMinted,
    LotteryFilling,
    LotteryMaturing,
    LotteryStaking,
    LotteryMinted,
    EndowmentFilling,
    EndowmentMaturing,
    EndowmentStaking,
    EndowmentMinted,
    /// No longer current, kept for the record.
    Obsolete,
}

impl HeapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeapStatus::Incoming => "INCOMING",
            HeapStatus::Float => "FLOAT",
            HeapStatus::PoolFilling => "POOL_FILLING",
            HeapStatus::PoolMaturing => "POOL_MATURING",
            HeapStatus::PoolStaking => "POOL_STAKING",
            HeapStatus::PoolMinted => "POOL_MINTED",
            HeapStatus::BonusFilling => "BONUS_FILLING",
            HeapStatus::BonusMaturing => "BONUS_MATURING",
            HeapStatus::BonusStaking => "BONUS_STAKING",
            HeapStatus::BonusMinted => "BONUS_MINTED",
            HeapStatus::LotteryFilling => "LOTTERY_FILLING",
            HeapStatus::LotteryMaturing => "LOTTERY_MATURING",
            HeapStatus::LotteryStaking => "LOTTERY_STAKING",
            HeapStatus::LotteryMinted => "LOTTERY_MINTED",
            HeapStatus::EndowmentFilling => "ENDOWMENT_FILLING",
            HeapStatus::EndowmentMaturing => "ENDOWMENT_MATURING",
            HeapStatus::EndowmentStaking => "ENDOWMENT_STAKING",
            HeapStatus::EndowmentMinted => "ENDOWMENT_MINTED",
            HeapStatus::Obsolete => "OBSOLETE",
        }
    }

    /// Compose a pooled status from a pool kind and a stage. `None` for
    /// [`PoolKind::Float`], which has no staged lifecycle.
    pub fn from_parts(kind: PoolKind, stage: PoolStage) -> Option<HeapStatus> {
        use HeapStatus::*;
        use PoolStage::*;
        Some(match (kind, stage) {
            (PoolKind::Pool, Filling) => PoolFilling,
            (PoolKind::Pool, Maturing) => PoolMaturing,
            (PoolKind::Pool, Staking) => PoolStaking,
            (PoolKind::Pool, Minted) => PoolMinted,
            (PoolKind::Bonus, Filling) => BonusFilling,
            (PoolKind::Bonus, Maturing) => BonusMaturing,
            (PoolKind::Bonus, Staking) => BonusStaking,
            (PoolKind::Bonus, Minted) => BonusMinted,
            (PoolKind::Lottery, Filling) => LotteryFilling,
            (PoolKind::Lottery, Maturing) => LotteryMaturing,
            (PoolKind::Lottery, Staking) => LotteryStaking,
            (PoolKind::Lottery, Minted) => LotteryMinted,
            (PoolKind::Endowment, Filling) => EndowmentFilling,
            (PoolKind::Endowment, Maturing) => EndowmentMaturing,
            (PoolKind::Endowment, Staking) => EndowmentStaking,
            (PoolKind::Endowment, Minted) => EndowmentMinted,
            (PoolKind::Float, _) => return None,
        })
    }

    /// Decompose a pooled status into its pool kind and stage. `None` for
    /// INCOMING, FLOAT and OBSOLETE, which are not part of a pool lifecycle.
    pub fn parts(&self) -> Option<(PoolKind, PoolStage)> {
        use HeapStatus::*;
        use PoolStage::*;
        Some(match self {
            PoolFilling => (PoolKind::Pool, Filling),
            PoolMaturing => (PoolKind::Pool, Maturing),
            PoolStaking => (PoolKind::Pool, Staking),
            PoolMinted => (PoolKind::Pool, Minted),
            BonusFilling => (PoolKind::Bonus, Filling),
            BonusMaturing => (PoolKind::Bonus, Maturing),
            BonusStaking => (PoolKind::Bonus, Staking),
            BonusMinted => (PoolKind::Bonus, Minted),
            LotteryFilling => (PoolKind::Lottery, Filling),
            LotteryMaturing => (PoolKind::Lottery, Maturing),
            LotteryStaking => (PoolKind::Lottery, Staking),
            LotteryMinted => (PoolKind::Lottery, Minted),
            EndowmentFilling => (PoolKind::Endowment, Filling),
            EndowmentMaturing => (PoolKind::Endowment, Maturing),
            EndowmentStaking => (PoolKind::Endowment, Staking),
            EndowmentMinted => (PoolKind::Endowment, Minted),
            Incoming | Float | Obsolete => return None,
        })
    }

    /// Step a pooled status one stage forward. Non-pooled statuses and the
    /// terminal Minted stage stay where they are.
    pub fn advance(&self) -> Option<HeapStatus> {
        let (kind, stage) = self.parts()?;
        HeapStatus::from_parts(kind, stage.next()?)
    }
}

impl fmt::Display for HeapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeapStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use HeapStatus::*;
        Ok(match s {
            "INCOMING" => Incoming,
            "FLOAT" => Float,
            "POOL_FILLING" => PoolFilling,
            "POOL_MATURING" => PoolMaturing,
            "POOL_STAKING" => PoolStaking,
            "POOL_MINTED" => PoolMinted,
            "BONUS_FILLING" => BonusFilling,
            "BONUS_MATURING" => BonusMaturing,
            "BONUS_STAKING" => BonusStaking,
            "BONUS_MINTED" => BonusMinted,
            "LOTTERY_FILLING" => LotteryFilling,
            "LOTTERY_MATURING" => LotteryMaturing,
            "LOTTERY_STAKING" => LotteryStaking,
            "LOTTERY_MINTED" => LotteryMinted,
            "ENDOWMENT_FILLING" => EndowmentFilling,
            "ENDOWMENT_MATURING" => EndowmentMaturing,
            "ENDOWMENT_STAKING" => EndowmentStaking,
            "ENDOWMENT_MINTED" => EndowmentMinted,
            "OBSOLETE" => Obsolete,
            other => bail!("unknown heap status: {}", other),
        })
    }
}

/// A coin heap: a pile of coins in the wallet, uniquely identified by its
/// outpoint (txid, vout). We keep every heap we have ever handled, even after
/// it stops being current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHeap {
    /// Descriptive name so the operator can see what the heap is for.
    pub name: String,
    /// Output transaction hash.
    pub txid: String,
    /// Output index within the transaction.
    pub vout: i64,
    /// Amount in uHYP.
    pub amount: i64,
    /// Confirmation count, tracked until [`CONFIRMED_DEPTH`].
    pub confirmations: i64,
    /// Creation time, seconds since the UNIX epoch.
    pub time_created: i64,
    pub status: HeapStatus,
}

impl CoinHeap {
    /// Whether the heap is old enough to stake (older than 8.8 days).
    pub fn is_mature(&self, now: i64) -> bool {
        now - self.time_created > MATURITY_SECS
    }

    /// Whether the heap is buried deep enough that we stop tracking its
    /// confirmation count.
    pub fn is_entrenched(&self) -> bool {
        self.confirmations >= CONFIRMED_DEPTH
    }
}

/// The kind of a wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    Send,
    Recv,
    Mint,
    Move,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Send => "SEND",
            TxKind::Recv => "RECV",
            TxKind::Mint => "MINT",
            TxKind::Move => "MOVE",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SEND" => TxKind::Send,
            "RECV" => TxKind::Recv,
            "MINT" => TxKind::Mint,
            "MOVE" => TxKind::Move,
            other => bail!("unknown tx kind: {}", other),
        })
    }
}

/// A wallet transaction output awaiting bookkeeping, keyed by (txid, vout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTx {
    pub txid: String,
    pub vout: i64,
    /// When the transaction happened, seconds since the UNIX epoch.
    pub timestamp: i64,
    pub kind: TxKind,
    /// When the operator processed it; 0 means not yet processed.
    pub processed_time: i64,
}

impl WalletTx {
    pub fn is_processed(&self) -> bool {
        self.processed_time != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_status_round_trips_through_text() {
        let statuses = [
            HeapStatus::Incoming,
            HeapStatus::Float,
            HeapStatus::PoolFilling,
            HeapStatus::PoolMaturing,
            HeapStatus::PoolStaking,
            HeapStatus::PoolMinted,
            HeapStatus::BonusFilling,
            HeapStatus::BonusMaturing,
            HeapStatus::BonusStaking,
            HeapStatus::BonusMinted,
            HeapStatus::LotteryFilling,
            HeapStatus::LotteryMaturing,
            HeapStatus::LotteryStaking,
            HeapStatus::LotteryMinted,
            HeapStatus::EndowmentFilling,
            HeapStatus::EndowmentMaturing,
            HeapStatus::EndowmentStaking,
            HeapStatus::EndowmentMinted,
            HeapStatus::Obsolete,
        ];
        for status in statuses {
            let parsed: HeapStatus = status.as_str().parse().expect("parse back");
            assert_eq!(parsed, status);
        }
        assert!("BOGUS".parse::<HeapStatus>().is_err());
    }

    #[test]
    fn pooled_statuses_walk_the_full_lifecycle() {
        let mut status = HeapStatus::BonusFilling;
        let mut seen = vec![status];
        while let Some(next) = status.advance() {
            status = next;
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                HeapStatus::BonusFilling,
                HeapStatus::BonusMaturing,
                HeapStatus::BonusStaking,
                HeapStatus::BonusMinted,
            ]
        );
    }

    #[test]
    fn non_pooled_statuses_do_not_advance() {
        assert_eq!(HeapStatus::Incoming.advance(), None);
        assert_eq!(HeapStatus::Float.advance(), None);
        assert_eq!(HeapStatus::Obsolete.advance(), None);
        assert_eq!(HeapStatus::PoolMinted.advance(), None);
    }

    #[test]
    fn float_pools_have_no_staged_statuses() {
        assert_eq!(HeapStatus::from_parts(PoolKind::Float, PoolStage::Filling), None);
        assert_eq!(HeapStatus::Float.parts(), None);
    }

    #[test]
    fn maturity_window_is_8_point_8_days() {
        let heap = CoinHeap {
            name: "t".to_string(),
            txid: "abc".to_string(),
            vout: 0,
            amount: 5 * UHYP_PER_HYP,
            confirmations: 10,
            time_created: 1_000_000,
            status: HeapStatus::PoolMaturing,
        };
        assert!(!heap.is_mature(1_000_000 + MATURITY_SECS));
        assert!(heap.is_mature(1_000_000 + MATURITY_SECS + 1));
    }

    #[test]
    fn confirmations_stop_mattering_at_100() {
        let mut heap = CoinHeap {
            name: "t".to_string(),
            txid: "abc".to_string(),
            vout: 1,
            amount: 1,
            confirmations: 99,
            time_created: 0,
            status: HeapStatus::Incoming,
        };
        assert!(!heap.is_entrenched());
        heap.confirmations = 100;
        assert!(heap.is_entrenched());
    }

    #[test]
    fn uhyp_conversion_rounds_to_nearest() {
        assert_eq!(uhyp_from_hyp(1.0), UHYP_PER_HYP);
        assert_eq!(uhyp_from_hyp(0.123_456_7), 123_457);
        assert_eq!(hyp_from_uhyp(2_500_000), 2.5);
    }
}
