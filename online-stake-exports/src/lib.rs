// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Definition and exports of the online stake types, configuration and errors.
//!
//! Define also the interfaces of the engine collaborators: the block feed
//! delivering rounds and the store receiving aggregates.

#![warn(missing_docs)]

mod account;
mod address;
mod amount;
mod block;
mod config;
mod controller_traits;
mod error;
mod genesis;
mod rows;

pub mod constants;

pub use account::*;
pub use address::*;
pub use amount::Amount;
pub use block::*;
pub use config::{OnlineStakeConfig, StoreConfig};
pub use constants::STAKE_LAG;
pub use controller_traits::{BlockFeed, StakeStore};
pub use error::*;
pub use genesis::*;
pub use rows::*;

/// Block height, the unit of all scheduling
pub type Round = u64;

#[cfg(any(test, feature = "test-exports"))]
pub mod test_exports;
