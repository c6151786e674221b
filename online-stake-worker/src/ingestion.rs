// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Extraction of the registry events carried by a round

use crate::StakeState;
use online_stake_exports::constants::MAX_STORED_STAKE;
use online_stake_exports::{BalanceRecord, Round, SignedTransaction, TransactionKind};
use tracing::warn;

impl StakeState {
    /// Applies every key registration of the transaction trees, inner transactions included,
    /// in depth-first execution order.
    ///
    /// Returns true if an account changed.
    pub fn process_transactions(&mut self, round: Round, transactions: &[SignedTransaction]) -> bool {
        let mut changed = false;
        let mut stack: Vec<&SignedTransaction> = transactions.iter().rev().collect();
        while let Some(transaction) = stack.pop() {
            if let TransactionKind::KeyRegistration { vote_last } = transaction.kind {
                changed |= self.update_account(round, &transaction.sender, Some(vote_last), None);
            }
            stack.extend(transaction.inner.iter().rev());
        }
        changed
    }

    /// Applies the new balances of the accounts whose voting key is still valid at `round`.
    ///
    /// Returns true if an account changed.
    pub fn process_balance_deltas(&mut self, round: Round, deltas: &[BalanceRecord]) -> bool {
        let mut changed = false;
        for record in deltas {
            if record.vote_last_valid < round {
                continue;
            }
            if record.balance > MAX_STORED_STAKE {
                warn!(
                    round,
                    addr = %record.address,
                    "Skipping out of range stake {}", record.balance
                );
                continue;
            }
            changed |= self.update_account(round, &record.address, None, Some(record.balance));
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::{StakeParams, StakeState};
    use online_stake_exports::test_exports::{address, app_call, balance, keyreg, payment};
    use online_stake_exports::{Amount, STAKE_LAG};

    #[test]
    fn test_nested_registrations_are_found() {
        let mut state = StakeState::new(StakeParams::default());
        let (a, b, c) = (address(1), address(2), address(3));
        let transactions = vec![
            payment(a),
            app_call(
                a,
                vec![
                    payment(b),
                    app_call(b, vec![keyreg(c, 3000)]),
                    keyreg(b, 2000),
                ],
            ),
        ];
        assert!(state.process_transactions(10, &transactions));
        assert!(state.get(&a).is_none());
        assert_eq!(state.get(&b).unwrap().vote_last, 2000 - STAKE_LAG);
        assert_eq!(state.get(&c).unwrap().vote_last, 3000 - STAKE_LAG);
    }

    #[test]
    fn test_last_registration_of_a_round_wins() {
        let mut state = StakeState::new(StakeParams::default());
        let a = address(1);
        let transactions = vec![app_call(a, vec![keyreg(a, 2000)]), keyreg(a, 4000)];
        state.process_transactions(10, &transactions);
        assert_eq!(state.get(&a).unwrap().vote_last, 4000 - STAKE_LAG);
    }

    #[test]
    fn test_balance_of_unknown_or_invalid_key_is_ignored() {
        let mut state = StakeState::new(StakeParams::default());
        let (a, b) = (address(1), address(2));
        state.process_transactions(10, &[keyreg(a, 2000)]);

        assert!(!state.process_balance_deltas(11, &[balance(b, 500, 5)]));
        assert!(!state.process_balance_deltas(11, &[balance(b, 500, 2000)]));
        assert_eq!(state.accounts.len(), 1);

        assert!(!state.process_balance_deltas(11, &[balance(a, 500, 10)]));
        assert!(state.get(&a).unwrap().stake.is_zero());

        assert!(state.process_balance_deltas(11, &[balance(a, 500, 2000)]));
        assert_eq!(state.get(&a).unwrap().stake, Amount::from_raw(500));
    }

    #[test]
    fn test_out_of_range_stake_is_skipped() {
        let mut state = StakeState::new(StakeParams::default());
        let (a, b) = (address(1), address(2));
        state.process_transactions(10, &[keyreg(a, 2000), keyreg(b, 2000)]);
        let changed = state.process_balance_deltas(
            11,
            &[balance(a, u64::MAX, 2000), balance(b, 42, 2000)],
        );
        assert!(changed);
        assert!(state.get(&a).unwrap().stake.is_zero());
        assert_eq!(state.get(&b).unwrap().stake, Amount::from_raw(42));
    }
}
