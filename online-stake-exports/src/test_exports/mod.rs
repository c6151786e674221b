// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Test helpers: a recording store, an in-memory feed and builders for feed data.

mod mock;
mod tools;

pub use mock::*;
pub use tools::*;

pub use crate::controller_traits::{MockBlockFeed, MockStakeStore};
