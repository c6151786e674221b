// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Lazy recomputation of the round-wide totals

use crate::StakeState;
use online_stake_exports::constants::UNBOUNDED_ROUND;
use online_stake_exports::{AccountState, Amount, Round};
use tracing::{debug, info};

impl StakeState {
    /// Recomputes totals, account classifications and stake fractions as of `round`.
    ///
    /// Skipped when no account changed and no voting key expires at or before `round`.
    /// Accounts that stop being online keep their record until the aggregation window closes.
    ///
    /// Returns true if the recomputation ran.
    pub fn recompute_totals(&mut self, round: Round) -> bool {
        if !self.dirty && self.next_expiry > round {
            debug!(
                round,
                "Skipping totals update, next expiry at {}", self.next_expiry
            );
            return false;
        }

        let mut total_stake = Amount::zero();
        let mut total_stake_eligible = Amount::zero();
        let mut max_stake = Amount::zero();
        let mut online_count = 0u64;
        let mut online_count_eligible = 0u64;
        let mut next_expiry = UNBOUNDED_ROUND;

        for account in self.accounts.values_mut() {
            let previous_state = account.state;
            if account.vote_last < round {
                account.stake = Amount::zero();
                account.state = if account.vote_last == 0 {
                    AccountState::Offlined
                } else {
                    AccountState::Expired
                };
            } else if account.stake.is_zero() {
                account.state = AccountState::Closed;
            } else {
                account.state = AccountState::Online;
                total_stake = total_stake.saturating_add(account.stake);
                online_count += 1;
                max_stake = max_stake.max(account.stake);
                if self.params.is_eligible(account.stake) {
                    total_stake_eligible = total_stake_eligible.saturating_add(account.stake);
                    online_count_eligible += 1;
                }
            }

            // expired keys are left out, a key still valid at `round` expires at vote_last + 1
            if account.vote_last >= round {
                next_expiry = next_expiry.min(account.vote_last.saturating_add(1));
            }

            if previous_state == AccountState::Online && account.state != AccountState::Online {
                info!(
                    round,
                    addr = %account.address,
                    "Marking for deletion ({}), voteLast: {}", account.state, account.vote_last
                );
            }
        }

        for account in self.accounts.values_mut() {
            account.stake_fraction = account.stake.fraction_of(total_stake);
        }

        if let Some(debug_address) = self.params.debug_address {
            if let Some(account) = self.accounts.get(&debug_address) {
                info!(
                    round,
                    addr = %account.address,
                    "Debug account: stake {}, fraction {}, voteLast {}, state {}",
                    account.stake,
                    account.stake_fraction,
                    account.vote_last,
                    account.state
                );
            }
        }

        self.total_stake = total_stake;
        self.total_stake_eligible = total_stake_eligible;
        self.max_stake = max_stake;
        self.online_count = online_count;
        self.online_count_eligible = online_count_eligible;
        self.updated_at_round = round;
        self.next_expiry = next_expiry;
        self.dirty = false;
        true
    }
}
