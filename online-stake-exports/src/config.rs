// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::constants::{
    AGGREGATE_BATCH_LIMIT, AGGREGATION_WINDOW_SIZE, CATCH_UP_THRESHOLD_MILLIS,
    ELIGIBILITY_MAX_STAKE, ELIGIBILITY_MIN_STAKE,
};
use crate::{Address, Amount, StakeError, StakeResult};
use std::path::PathBuf;
use std::time::Duration;

/// External store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// directory holding the store tables
    pub path: PathBuf,
    /// aggregate table, aggregates are not exported when `None`
    pub aggregate_table: Option<String>,
    /// stake snapshot table, snapshots are not exported when `None`
    pub snapshot_table: Option<String>,
}

/// online stake engine configuration
#[derive(Debug, Clone)]
pub struct OnlineStakeConfig {
    /// path of the persisted state snapshot
    pub state_file_path: PathBuf,
    /// external store
    pub store: StoreConfig,
    /// rounds per aggregation window
    pub aggregation_window_size: u64,
    /// lowest stake eligible for rewards
    pub eligibility_min_stake: Amount,
    /// highest stake eligible for rewards
    pub eligibility_max_stake: Amount,
    /// windows buffered while catching up before a flush is forced, 0 flushes every window
    pub batch_limit: usize,
    /// wall-clock gap under which consecutive rounds count as catch-up
    pub catch_up_threshold: Duration,
    /// account whose state is logged on every recomputation
    pub debug_address: Option<Address>,
    /// skip every store write
    pub dry_run: bool,
}

impl Default for OnlineStakeConfig {
    fn default() -> Self {
        Self {
            state_file_path: PathBuf::from("online_stake_state.json"),
            store: StoreConfig::default(),
            aggregation_window_size: AGGREGATION_WINDOW_SIZE,
            eligibility_min_stake: ELIGIBILITY_MIN_STAKE,
            eligibility_max_stake: ELIGIBILITY_MAX_STAKE,
            batch_limit: AGGREGATE_BATCH_LIMIT,
            catch_up_threshold: Duration::from_millis(CATCH_UP_THRESHOLD_MILLIS),
            debug_address: None,
            dry_run: false,
        }
    }
}

impl OnlineStakeConfig {
    /// Rejects values the engine cannot run with
    pub fn check(&self) -> StakeResult<()> {
        if self.aggregation_window_size == 0 {
            return Err(StakeError::Config(
                "aggregation window size must be at least 1".into(),
            ));
        }
        if self.eligibility_min_stake > self.eligibility_max_stake {
            return Err(StakeError::Config(format!(
                "eligibility band is inverted: {} > {}",
                self.eligibility_min_stake, self.eligibility_max_stake
            )));
        }
        Ok(())
    }
}
