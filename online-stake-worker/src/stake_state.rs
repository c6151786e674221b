// Copyright (c) 2022 MASSA LABS <info@massa.net>

use online_stake_exports::constants::UNBOUNDED_ROUND;
use online_stake_exports::{
    AccountStatus, Address, Amount, Genesis, OnlineStakeConfig, ParticipationAccount, Round,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{info, warn};

/// Engine parameters the state needs at recomputation and aggregation time
#[derive(Debug, Clone, PartialEq)]
pub struct StakeParams {
    /// rounds per aggregation window
    pub aggregation_window_size: u64,
    /// lowest stake eligible for rewards
    pub eligibility_min_stake: Amount,
    /// highest stake eligible for rewards
    pub eligibility_max_stake: Amount,
    /// account whose state is logged on every recomputation
    pub debug_address: Option<Address>,
}

impl From<&OnlineStakeConfig> for StakeParams {
    fn from(config: &OnlineStakeConfig) -> Self {
        StakeParams {
            aggregation_window_size: config.aggregation_window_size,
            eligibility_min_stake: config.eligibility_min_stake,
            eligibility_max_stake: config.eligibility_max_stake,
            debug_address: config.debug_address,
        }
    }
}

impl Default for StakeParams {
    fn default() -> Self {
        StakeParams::from(&OnlineStakeConfig::default())
    }
}

impl StakeParams {
    /// True if `stake` lies within the eligibility band
    pub fn is_eligible(&self, stake: Amount) -> bool {
        stake >= self.eligibility_min_stake && stake <= self.eligibility_max_stake
    }
}

/// Online stake state: the participation registry and the totals derived from it.
///
/// Totals are valid as of `updated_at_round`. They are recomputed only when an
/// account changed (`dirty`) or when a voting key reaches `next_expiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeState {
    /// participation accounts by address
    pub accounts: BTreeMap<Address, ParticipationAccount>,
    /// sum of the online stakes
    #[serde(rename = "totalstake")]
    pub total_stake: Amount,
    /// sum of the online stakes within the eligibility band
    #[serde(rename = "totalstakerwd")]
    pub total_stake_eligible: Amount,
    /// largest online stake
    #[serde(rename = "maxstake")]
    pub max_stake: Amount,
    /// number of online accounts
    #[serde(rename = "onlinecnt")]
    pub online_count: u64,
    /// number of online accounts within the eligibility band
    #[serde(rename = "onlinecntrwd")]
    pub online_count_eligible: u64,
    /// round of the last recomputation
    #[serde(rename = "updated")]
    pub updated_at_round: Round,
    /// first round at which a voting key stops being valid, over the keys still valid
    /// at `updated_at_round` (already expired keys do not count)
    #[serde(rename = "nextexpiry")]
    pub next_expiry: Round,
    /// last round folded into the aggregation window
    #[serde(rename = "lastround", default, skip_serializing_if = "Option::is_none")]
    pub last_folded_round: Option<Round>,
    /// an account changed since the last recomputation
    #[serde(skip)]
    pub dirty: bool,
    /// engine parameters
    #[serde(skip)]
    pub params: StakeParams,
}

impl StakeState {
    /// Empty state, flagged dirty so that the first recomputation runs
    pub fn new(params: StakeParams) -> Self {
        StakeState {
            accounts: BTreeMap::new(),
            total_stake: Amount::zero(),
            total_stake_eligible: Amount::zero(),
            max_stake: Amount::zero(),
            online_count: 0,
            online_count_eligible: 0,
            updated_at_round: 0,
            next_expiry: UNBOUNDED_ROUND,
            last_folded_round: None,
            dirty: true,
            params,
        }
    }

    /// Seeds the registry from the genesis allocation, at round 0.
    /// Online entries with a voting key are applied as a key registration plus a balance event.
    pub fn from_genesis(genesis: &Genesis, params: StakeParams) -> Self {
        let mut state = StakeState::new(params);
        info!("Loading genesis online state");
        for allocation in &genesis.allocations {
            if allocation.vote_last_valid == 0 || allocation.status != AccountStatus::Online {
                continue;
            }
            match Address::from_str(&allocation.address) {
                Ok(address) => {
                    info!(round = 0, "Genesis stake for {} : {}", address, allocation.balance);
                    state.update_account(
                        0,
                        &address,
                        Some(allocation.vote_last_valid),
                        Some(allocation.balance),
                    );
                }
                Err(err) => {
                    warn!(round = 0, "Skipping genesis allocation: {}", err);
                }
            }
        }
        state.dirty = true;
        state
    }

    /// Participation record of `address`
    pub fn get(&self, address: &Address) -> Option<&ParticipationAccount> {
        self.accounts.get(address)
    }
}
