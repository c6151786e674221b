// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{Amount, Round};
use serde::{Deserialize, Serialize};

/// Participation status of a genesis account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// not voting
    Offline,
    /// voting with a registered key
    Online,
    /// never allowed to vote
    NotParticipating,
}

/// One entry of the genesis allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    /// address in canonical string form, decoded when the registry is seeded
    pub address: String,
    /// initial balance
    pub balance: Amount,
    /// last round of validity of the voting key, 0 if none
    #[serde(default)]
    pub vote_last_valid: Round,
    /// participation status
    pub status: AccountStatus,
}

/// Genesis bootstrap record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// network name
    #[serde(default)]
    pub network: String,
    /// initial allocation
    #[serde(default)]
    pub allocations: Vec<GenesisAllocation>,
}
