// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

use crate::Round;

/// online stake result
pub type StakeResult<T, E = StakeError> = core::result::Result<T, E>;

/// online stake error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum StakeError {
    /// address parse error: {0}
    AddressParse(String),
    /// amount parse error: {0}
    AmountParse(String),
    /// invalid configuration: {0}
    Config(String),
    /** SnapshotAhead: state round {snapshot_round} is after the next round
    {next_round} expected by the feed */
    SnapshotAhead {
        /// round of the last recomputation stored in the snapshot
        snapshot_round: Round,
        /// next round the feed is going to deliver
        next_round: Round,
    },
    /// invalid snapshot: {0}
    InvalidSnapshot(String),
    /// store error: {0}
    Store(String),
    /// feed error: {0}
    Feed(String),
    /// IO error: {0}
    Io(#[from] std::io::Error),
    /// serde error: {0}
    Serde(#[from] serde_json::Error),
}

impl StakeError {
    /// Fatal errors cannot be fixed by delivering the same round again
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StakeError::Config(_) | StakeError::SnapshotAhead { .. } | StakeError::InvalidSnapshot(_)
        )
    }
}
