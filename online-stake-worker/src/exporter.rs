// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{AggregateBundle, StakeParams, StakeState};
use online_stake_exports::{
    BlockData, BlockFeed, OnlineStakeConfig, Round, StakeResult, StakeStore,
};
use online_stake_logging::stake_trace;
use tracing::{error, info};

/// Online stake engine: consumes rounds in order, maintains the stake state and
/// exports snapshots and window aggregates to the store.
pub struct OnlineStakeExporter {
    config: OnlineStakeConfig,
    state: StakeState,
    bundle: AggregateBundle,
    store: Box<dyn StakeStore>,
    snapshot_pending: bool,
    durable_next_round: Round,
}

impl OnlineStakeExporter {
    /// Builds the engine, either from the genesis record (`next_round == 0`) or from the
    /// persisted snapshot, and saves the resulting state.
    ///
    /// Rounds already folded into the snapshot are skipped: the driver must resume
    /// the feed at `durable_next_round()`, which may be after `next_round`.
    ///
    /// # Arguments
    /// * `next_round`: next round the feed is going to deliver
    pub fn new(
        config: OnlineStakeConfig,
        next_round: Round,
        feed: &dyn BlockFeed,
        store: Box<dyn StakeStore>,
    ) -> StakeResult<Self> {
        config.check()?;
        let params = StakeParams::from(&config);
        let (mut state, start_round) = if next_round == 0 {
            (StakeState::from_genesis(&feed.genesis()?, params), 0)
        } else {
            let state = StakeState::load(&config.state_file_path, next_round, params)
                .map_err(|err| {
                    error!("Could not load online state: {}", err);
                    err
                })?;
            let start_round = state.resume_round(next_round);
            if start_round > next_round {
                info!(
                    round = next_round,
                    "Rounds {} to {} are covered by the saved state, resuming at {}",
                    next_round,
                    start_round - 1,
                    start_round
                );
            }
            (state, start_round)
        };
        state.recompute_totals(start_round);
        state.persist(&config.state_file_path)?;
        info!(
            round = start_round,
            "Online stake engine started: total stake {}, {} online accounts, next expiry {}",
            state.total_stake,
            state.online_count,
            state.next_expiry
        );

        Ok(OnlineStakeExporter {
            bundle: AggregateBundle::from_config(&config),
            config,
            state,
            store,
            snapshot_pending: false,
            durable_next_round: start_round,
        })
    }

    /// Processes the data of one round.
    ///
    /// On error the round can be delivered again: registry updates are idempotent
    /// and a round is folded into the aggregation window only once.
    pub fn receive(&mut self, block: &BlockData) -> StakeResult<()> {
        let round = block.round;
        let catching_up = self.bundle.observe_round(round);
        info!(round, "Processing block {}, catching-up:{}", round, catching_up);

        self.state.process_transactions(round, &block.transactions);
        if let Some(deltas) = &block.balance_deltas {
            self.state.process_balance_deltas(round, deltas);
        }

        let changed = self.state.recompute_totals(round);
        if changed {
            self.snapshot_pending = !self.config.dry_run;
        }

        let mut window_closed = false;
        if self.state.is_new_round(round) {
            window_closed = self.state.fold_round(round);
            if window_closed {
                if !self.config.dry_run {
                    self.bundle
                        .append_rows(self.state.aggregate_rows(round, block.timestamp));
                }
                self.state.close_window(round);
            }
        }
        if window_closed || self.bundle.has_retry_pending() {
            self.bundle.flush(self.store.as_mut(), false)?;
        }

        if self.snapshot_pending {
            self.store.insert_stake_snapshot(self.state.snapshot_rows())?;
            self.snapshot_pending = false;
        }

        // buffered rows are lost on a crash, their window must stay replayable
        if self.bundle.pending_rows() == 0 && (changed || window_closed || !catching_up) {
            self.persist()?;
        }

        stake_trace!("exporter.round", {
            "round": round,
            "total_stake": self.state.total_stake.to_raw(),
            "online_money": block.online_money.map(|money| money.to_raw()),
        });
        let diff = block
            .online_money
            .map(|money| {
                (self.state.total_stake.to_raw() as i128 - money.to_raw() as i128).to_string()
            })
            .unwrap_or_else(|| "n/a".to_string());
        info!(
            round,
            "Total stake: {}, diff to online money: {}, next expiry: {}",
            self.state.total_stake,
            diff,
            self.state.next_expiry
        );
        Ok(())
    }

    /// Sends every buffered aggregate and saves the state
    pub fn close(&mut self) -> StakeResult<()> {
        info!("Closing online stake engine");
        self.bundle.flush(self.store.as_mut(), true)?;
        self.persist()
    }

    fn persist(&mut self) -> StakeResult<()> {
        self.state.persist(&self.config.state_file_path)?;
        if let Some(last) = self.state.last_folded_round {
            self.durable_next_round = self.durable_next_round.max(last + 1);
        }
        Ok(())
    }

    /// Current stake state
    pub fn state(&self) -> &StakeState {
        &self.state
    }

    /// True if the last rounds arrived in catch-up mode
    pub fn is_catching_up(&self) -> bool {
        self.bundle.is_catching_up()
    }

    /// First round whose effects are not covered by the saved state and the store.
    /// A driver resuming after a crash must deliver rounds from here.
    pub fn durable_next_round(&self) -> Round {
        self.durable_next_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use online_stake_exports::test_exports::{
        address, empty_block, online_allocation, MemoryFeed, MockStakeStore,
    };
    use online_stake_exports::{Amount, StakeSnapshotRow};
    use tempfile::TempDir;

    #[test]
    fn test_genesis_start_without_change() {
        let dir = TempDir::new().unwrap();
        let config = OnlineStakeConfig {
            state_file_path: dir.path().join("state.json"),
            ..Default::default()
        };
        let a = address(1);
        let feed = MemoryFeed::with_allocations(vec![online_allocation(a, 1_000_000_000, 2000)]);

        let mut store = MockStakeStore::new();
        store.expect_insert_aggregates().never();
        // the genesis totals are computed at construction, nothing changes at round 1
        store.expect_insert_stake_snapshot().never();

        let mut exporter = OnlineStakeExporter::new(config, 0, &feed, Box::new(store)).unwrap();
        assert!(dir.path().join("state.json").exists());
        assert_eq!(exporter.state().total_stake, Amount::from_raw(1_000_000_000));

        exporter.receive(&empty_block(1)).unwrap();
        assert_eq!(exporter.durable_next_round(), 2);
    }

    #[test]
    fn test_snapshot_rows_sent_on_registration() {
        let dir = TempDir::new().unwrap();
        let config = OnlineStakeConfig {
            state_file_path: dir.path().join("state.json"),
            ..Default::default()
        };
        let feed = MemoryFeed::with_allocations(vec![online_allocation(address(1), 600, 2000)]);
        let mut store = MockStakeStore::new();
        store
            .expect_insert_stake_snapshot()
            .withf(|rows: &Vec<StakeSnapshotRow>| {
                rows.len() == 2 && rows[1].address == "total" && rows[1].stake.to_raw() == 1000
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut exporter = OnlineStakeExporter::new(config, 0, &feed, Box::new(store)).unwrap();
        let mut block = empty_block(1);
        block.balance_deltas = Some(vec![online_stake_exports::test_exports::balance(
            address(1),
            1000,
            2000,
        )]);
        exporter.receive(&block).unwrap();
    }
}
