// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Participation registry updates

use crate::StakeState;
use online_stake_exports::{AccountState, Address, Amount, ParticipationAccount, Round, STAKE_LAG};
use online_stake_logging::stake_trace;
use tracing::info;

impl StakeState {
    /// Applies a registration and/or a stake change to an account.
    ///
    /// * Unknown accounts are only created by a non-zero registration.
    /// * A registration ending before `round` is stale and ignored, except `vote_last = 0`
    ///   (unregistration) which takes effect after `STAKE_LAG` rounds.
    /// * The stored `vote_last` is shifted back by `STAKE_LAG`: the round at which the key
    ///   stops counting for consensus.
    ///
    /// Returns true if the account changed.
    pub fn update_account(
        &mut self,
        round: Round,
        address: &Address,
        vote_last: Option<Round>,
        stake: Option<Amount>,
    ) -> bool {
        let exists = self.accounts.contains_key(address);
        if !exists && vote_last.map_or(true, |vote_last| vote_last == 0) {
            return false;
        }

        let vote_last = match vote_last {
            Some(0) => Some(round.saturating_add(STAKE_LAG)),
            Some(vote_last) if vote_last < round => {
                stake_trace!("registry.stale_registration", {
                    "round": round,
                    "addr": address.to_string(),
                    "vote_last": vote_last
                });
                return false;
            }
            other => other,
        };

        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| ParticipationAccount::new(address));
        let mut updated = false;

        if let Some(stake) = stake {
            if account.stake != stake {
                account.stake = stake;
                updated = true;
                info!(round, addr = %account.address, "New stake: {}", account.stake);
            }
        }

        if let Some(vote_last) = vote_last {
            account.vote_last = vote_last.saturating_sub(STAKE_LAG);
            updated = true;
            if account.vote_last <= round {
                info!(round, addr = %account.address, "New voteLast: {}, unreg", account.vote_last);
            } else {
                info!(
                    round,
                    addr = %account.address,
                    "New voteLast: {} ({})", account.vote_last, vote_last
                );
                account.state = AccountState::Online;
            }
        }

        if updated {
            self.dirty = true;
            account.updated_at_round = round;
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use crate::{StakeParams, StakeState};
    use online_stake_exports::test_exports::address;
    use online_stake_exports::{Amount, STAKE_LAG};

    fn clean_state() -> StakeState {
        let mut state = StakeState::new(StakeParams::default());
        state.dirty = false;
        state
    }

    #[test]
    fn test_unknown_account_balance_only_is_ignored() {
        let mut state = clean_state();
        assert!(!state.update_account(10, &address(1), None, Some(Amount::from_raw(5))));
        assert!(!state.update_account(10, &address(1), Some(0), Some(Amount::from_raw(5))));
        assert!(state.accounts.is_empty());
        assert!(!state.dirty);
    }

    #[test]
    fn test_registration_is_shifted_by_stake_lag() {
        let mut state = clean_state();
        let a = address(1);
        assert!(state.update_account(10, &a, Some(5000), None));
        let account = state.get(&a).unwrap();
        assert_eq!(account.vote_last, 5000 - STAKE_LAG);
        assert_eq!(account.updated_at_round, 10);
        assert!(account.stake.is_zero());
        assert!(state.dirty);
    }

    #[test]
    fn test_stale_registration_is_rejected() {
        let mut state = clean_state();
        let a = address(1);
        state.update_account(10, &a, Some(5000), None);
        state.dirty = false;
        assert!(!state.update_account(6000, &a, Some(5999), None));
        assert_eq!(state.get(&a).unwrap().vote_last, 5000 - STAKE_LAG);
        assert!(!state.dirty);
    }

    #[test]
    fn test_unregistration_takes_effect_at_current_round() {
        let mut state = clean_state();
        let a = address(1);
        state.update_account(10, &a, Some(5000), None);
        assert!(state.update_account(700, &a, Some(0), None));
        let account = state.get(&a).unwrap();
        assert_eq!(account.vote_last, 700);
        assert_eq!(account.updated_at_round, 700);
    }

    #[test]
    fn test_stake_change_marks_dirty() {
        let mut state = clean_state();
        let a = address(1);
        state.update_account(10, &a, Some(5000), None);
        state.dirty = false;

        assert!(state.update_account(11, &a, None, Some(Amount::from_raw(7))));
        assert_eq!(state.get(&a).unwrap().updated_at_round, 11);
        assert!(state.dirty);

        // same stake: no change
        state.dirty = false;
        assert!(!state.update_account(12, &a, None, Some(Amount::from_raw(7))));
        assert_eq!(state.get(&a).unwrap().updated_at_round, 11);
        assert!(!state.dirty);
    }
}
