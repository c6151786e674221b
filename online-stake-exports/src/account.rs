// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{Address, Amount, Round};
use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// Classification of an account at the last recomputation.
/// Anything but `Online` is deleted when the aggregation window closes.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountState {
    /// online
    #[default]
    Online,
    /// closed
    Closed,
    /// offlined
    Offlined,
    /// expired
    Expired,
}

/// Participation record of an account holding, or recently holding, a voting key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationAccount {
    /// address in canonical string form
    #[serde(rename = "addr")]
    pub address: String,
    /// last round the voting key is valid, already shifted by `STAKE_LAG`
    #[serde(rename = "votelast")]
    pub vote_last: Round,
    /// stake counted toward online stake
    pub stake: Amount,
    /// round of the last mutation
    #[serde(rename = "updated")]
    pub updated_at_round: Round,
    /// sum of the stake fractions over the current aggregation window
    #[serde(rename = "aggsfsum")]
    pub agg_stake_fraction_sum: f64,
    /// number of rounds with stake in the current aggregation window
    #[serde(rename = "aggonlrnd")]
    pub agg_online_count: u64,
    /// stake fraction at the last recomputation
    #[serde(skip)]
    pub stake_fraction: f64,
    /// classification at the last recomputation
    #[serde(skip)]
    pub state: AccountState,
}

impl ParticipationAccount {
    /// Fresh record holding only the address
    pub fn new(address: &Address) -> Self {
        ParticipationAccount {
            address: address.to_string(),
            vote_last: 0,
            stake: Amount::zero(),
            updated_at_round: 0,
            agg_stake_fraction_sum: 0.0,
            agg_online_count: 0,
            stake_fraction: 0.0,
            state: AccountState::Online,
        }
    }
}
