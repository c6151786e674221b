// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Per-round block data delivered by the feed

use crate::{Address, Amount, Round};
use serde::{Deserialize, Serialize};

/// Kind of a transaction, with the payload the engine consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    /// payment
    Payment,
    /// key registration, `vote_last = 0` unregisters the sender
    KeyRegistration {
        /// last round of validity of the voting key
        vote_last: Round,
    },
    /// asset transfer
    AssetTransfer,
    /// application call, may carry inner transactions
    ApplicationCall,
    /// any other kind
    Other,
}

/// A transaction and the inner transactions it spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// sender of the transaction
    pub sender: Address,
    /// kind and payload
    #[serde(flatten)]
    pub kind: TransactionKind,
    /// inner transactions, in execution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner: Vec<SignedTransaction>,
}

/// New balance of an account after a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// account
    pub address: Address,
    /// balance after the round
    pub balance: Amount,
    /// last round of validity of the account's voting key
    pub vote_last_valid: Round,
}

/// Everything the engine reads from a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// round of the block
    pub round: Round,
    /// block timestamp, in seconds
    pub timestamp: i64,
    /// top level transactions
    #[serde(default)]
    pub transactions: Vec<SignedTransaction>,
    /// account balance changes, `None` when the round carries no state delta
    #[serde(default)]
    pub balance_deltas: Option<Vec<BalanceRecord>>,
    /// online money reported by the ledger for this round
    #[serde(default)]
    pub online_money: Option<Amount>,
}
