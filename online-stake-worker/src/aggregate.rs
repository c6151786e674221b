// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Aggregation window: per-round accumulation and window reset

use crate::StakeState;
use online_stake_exports::constants::TOTAL_ROW_ADDRESS;
use online_stake_exports::{AccountState, Address, AggregateRow, Round, StakeSnapshotRow, STAKE_LAG};
use tracing::{debug, info};

impl StakeState {
    /// True if `round` has not been folded into the window yet
    pub fn is_new_round(&self, round: Round) -> bool {
        self.last_folded_round.map_or(true, |last| round > last)
    }

    /// Adds the current stake fractions of every account with stake to the window accumulators.
    ///
    /// Returns true if `round` is the last round of its window. Windows are aligned on
    /// absolute round numbers.
    pub fn fold_round(&mut self, round: Round) -> bool {
        for account in self.accounts.values_mut() {
            if !account.stake.is_zero() {
                account.agg_online_count += 1;
                account.agg_stake_fraction_sum += account.stake_fraction;
            }
        }
        self.last_folded_round = Some(round);
        let window_size = self.params.aggregation_window_size.max(1);
        round % window_size == window_size - 1
    }

    /// Aggregate rows of the window containing `round`, one per account
    pub fn aggregate_rows(&self, round: Round, timestamp: i64) -> Vec<AggregateRow> {
        let window_size = self.params.aggregation_window_size.max(1);
        let window_round = round - round % window_size + STAKE_LAG;
        self.accounts
            .values()
            .map(|account| AggregateRow {
                address: account.address.clone(),
                round: window_round,
                timestamp,
                online_rounds: account.agg_online_count,
                stake_fraction_sum: account.agg_stake_fraction_sum,
            })
            .collect()
    }

    /// Stake of every account plus the total, as of the last recomputation
    pub fn snapshot_rows(&self) -> Vec<StakeSnapshotRow> {
        let round = self.updated_at_round + STAKE_LAG;
        let mut rows: Vec<StakeSnapshotRow> = self
            .accounts
            .values()
            .map(|account| StakeSnapshotRow {
                address: account.address.clone(),
                round,
                stake: account.stake,
                stake_fraction: account.stake_fraction,
            })
            .collect();
        rows.push(StakeSnapshotRow {
            address: TOTAL_ROW_ADDRESS.to_string(),
            round,
            stake: self.total_stake,
            stake_fraction: 1.0,
        });
        rows
    }

    /// Deletes the accounts that are no longer online and resets the accumulators of the others
    pub fn close_window(&mut self, round: Round) {
        let stale: Vec<Address> = self
            .accounts
            .iter()
            .filter(|(_, account)| account.state != AccountState::Online)
            .map(|(address, _)| *address)
            .collect();
        for address in &stale {
            if let Some(account) = self.accounts.remove(address) {
                info!(round, addr = %account.address, "Deleting account ({})", account.state);
            }
        }
        for account in self.accounts.values_mut() {
            account.agg_online_count = 0;
            account.agg_stake_fraction_sum = 0.0;
        }
        debug!(
            round,
            "Window closed, {} accounts kept, {} deleted",
            self.accounts.len(),
            stale.len()
        );
    }
}
