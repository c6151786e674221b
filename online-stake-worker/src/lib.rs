// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Online stake engine.
//!
//! Tracks the accounts holding a valid participation key, recomputes the online
//! stake totals when an account changes or a key expires, accumulates per-account
//! aggregates over fixed round windows and exports them to a `StakeStore`.
//! The state is saved to a snapshot file so that processing resumes after a restart.

#![warn(missing_docs)]

mod aggregate;
mod batcher;
mod exporter;
mod file_store;
mod ingestion;
mod registry;
mod snapshot;
mod stake_state;
mod totals;

pub use batcher::AggregateBundle;
pub use exporter::OnlineStakeExporter;
pub use file_store::FileStore;
pub use stake_state::{StakeParams, StakeState};

#[cfg(test)]
mod tests;
