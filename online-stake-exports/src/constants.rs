// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Protocol and engine constants

use crate::{Amount, Round};

/// Number of rounds between a key registration and the round it becomes visible to consensus
pub const STAKE_LAG: Round = 320;

/// Number of microunits in one currency unit
pub const AMOUNT_DECIMAL_FACTOR: u64 = 1_000_000;

/// Stand-in for "no key expires"
pub const UNBOUNDED_ROUND: Round = Round::MAX;

/// Lowest stake eligible for rewards
pub const ELIGIBILITY_MIN_STAKE: Amount = Amount::from_raw(30_000 * AMOUNT_DECIMAL_FACTOR);

/// Highest stake eligible for rewards (2^26 units)
pub const ELIGIBILITY_MAX_STAKE: Amount = Amount::from_raw((1 << 26) * AMOUNT_DECIMAL_FACTOR);

/// Default number of rounds per aggregation window
pub const AGGREGATION_WINDOW_SIZE: u64 = 1000;

/// Default number of windows buffered while catching up
pub const AGGREGATE_BATCH_LIMIT: usize = 100;

/// Default wall-clock gap under which consecutive rounds count as catch-up
pub const CATCH_UP_THRESHOLD_MILLIS: u64 = 1000;

/// Address column value of the synthetic total row of a stake snapshot
pub const TOTAL_ROW_ADDRESS: &str = "total";

/// Largest stake the store accepts (signed 64-bit column)
pub const MAX_STORED_STAKE: Amount = Amount::from_raw(i64::MAX as u64);
