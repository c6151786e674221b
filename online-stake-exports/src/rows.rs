// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Rows sent to the external store

use crate::{Amount, Round};
use serde::{Deserialize, Serialize};

/// Per-account aggregate of one closed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// account address, canonical string form
    pub address: String,
    /// first round of the window, shifted by `STAKE_LAG`
    pub round: Round,
    /// timestamp of the block closing the window
    pub timestamp: i64,
    /// rounds the account had stake during the window
    pub online_rounds: u64,
    /// sum of the per-round stake fractions over the window
    pub stake_fraction_sum: f64,
}

/// Stake of one account, or the synthetic total, at a recomputation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeSnapshotRow {
    /// account address or `TOTAL_ROW_ADDRESS`
    pub address: String,
    /// recomputation round, shifted by `STAKE_LAG`
    pub round: Round,
    /// stake
    pub stake: Amount,
    /// stake fraction
    pub stake_fraction: f64,
}
