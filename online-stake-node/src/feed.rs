// Copyright (c) 2022 MASSA LABS <info@massa.net>

use online_stake_exports::{BlockData, BlockFeed, Genesis, Round, StakeError, StakeResult};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Block feed reading `genesis.json` and `blocks/<round>.json` from a directory
pub struct FileBlockFeed {
    path: PathBuf,
}

impl FileBlockFeed {
    pub fn new(path: PathBuf) -> Self {
        FileBlockFeed { path }
    }

    fn read<T: DeserializeOwned>(path: &Path) -> StakeResult<Option<T>> {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|err| StakeError::Feed(format!("{}: {}", path.display(), err)))
    }
}

impl BlockFeed for FileBlockFeed {
    fn genesis(&self) -> StakeResult<Genesis> {
        let path = self.path.join("genesis.json");
        Self::read(&path)?
            .ok_or_else(|| StakeError::Feed(format!("missing genesis file {}", path.display())))
    }

    fn block(&self, round: Round) -> StakeResult<Option<BlockData>> {
        let block: Option<BlockData> =
            Self::read(&self.path.join("blocks").join(format!("{}.json", round)))?;
        match block {
            Some(block) if block.round != round => Err(StakeError::Feed(format!(
                "block file of round {} holds round {}",
                round, block.round
            ))),
            other => Ok(other),
        }
    }
}

/// Consecutive read failures of the same round after which they are logged as errors
pub const MAX_READ_FAILURES: u32 = 10;

/// Counts consecutive failures to read the round the driver waits for
#[derive(Debug, Default)]
pub struct ReadFailures {
    round: Round,
    count: u32,
}

impl ReadFailures {
    /// Records a failure on `round`, returns true once the round failed
    /// `MAX_READ_FAILURES` times in a row
    pub fn record(&mut self, round: Round) -> bool {
        if self.round != round {
            self.round = round;
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
        self.count >= MAX_READ_FAILURES
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}
