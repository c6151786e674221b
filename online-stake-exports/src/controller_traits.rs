// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module exports generic traits representing the collaborators of the
//! online stake engine: the block feed upstream and the store downstream.

use crate::{AggregateRow, BlockData, Genesis, Round, StakeResult, StakeSnapshotRow};

/// interface of the external store receiving the engine output
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait StakeStore: Send {
    /// Insert the aggregate rows of one or more closed windows
    ///
    /// # Arguments
    /// * `rows`: rows to insert, sent as a single batch
    fn insert_aggregates(&mut self, rows: Vec<AggregateRow>) -> StakeResult<()>;

    /// Insert a stake snapshot, total row included
    ///
    /// # Arguments
    /// * `rows`: rows to insert, sent as a single batch
    fn insert_stake_snapshot(&mut self, rows: Vec<StakeSnapshotRow>) -> StakeResult<()>;
}

/// interface of the upstream feed delivering rounds in order
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait BlockFeed {
    /// Genesis bootstrap record
    fn genesis(&self) -> StakeResult<Genesis>;

    /// Block data of a round, `None` if the round is not available yet
    fn block(&self, round: Round) -> StakeResult<Option<BlockData>>;
}
