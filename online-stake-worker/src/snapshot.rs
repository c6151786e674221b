// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Durable state snapshot

use crate::{StakeParams, StakeState};
use online_stake_exports::{Round, StakeError, StakeResult};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

impl StakeState {
    /// Writes the state to `path`, replacing the previous snapshot atomically
    pub fn persist(&self, path: &Path) -> StakeResult<()> {
        let tmp = tmp_path(path);
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        debug!(
            round = self.updated_at_round,
            "State saved to {}",
            path.display()
        );
        Ok(())
    }

    /// First round to deliver on top of this state. Rounds up to the last folded one
    /// are covered by the snapshot and must not be delivered again.
    pub fn resume_round(&self, next_round: Round) -> Round {
        match self.last_folded_round {
            Some(last) => next_round.max(last.saturating_add(1)),
            None => next_round,
        }
    }

    /// Reads the snapshot at `path` and checks it is not ahead of the feed.
    /// A snapshot whose folded rounds reach past `next_round` is accepted, see `resume_round`.
    ///
    /// # Arguments
    /// * `next_round`: next round the feed is going to deliver
    pub fn load(path: &Path, next_round: Round, params: StakeParams) -> StakeResult<StakeState> {
        let content = std::fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => {
                StakeError::InvalidSnapshot(format!("no state file at {}", path.display()))
            }
            _ => StakeError::Io(err),
        })?;
        let mut state: StakeState = serde_json::from_slice(&content)
            .map_err(|err| StakeError::InvalidSnapshot(format!("{}: {}", path.display(), err)))?;
        if state.resume_round(next_round) < state.updated_at_round {
            return Err(StakeError::SnapshotAhead {
                snapshot_round: state.updated_at_round,
                next_round,
            });
        }
        info!(
            round = state.updated_at_round,
            "Loaded online state from {}: {} accounts",
            path.display(),
            state.accounts.len()
        );
        state.params = params;
        state.dirty = true;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use crate::{StakeParams, StakeState};
    use assert_matches::assert_matches;
    use online_stake_exports::test_exports::address;
    use online_stake_exports::{Amount, StakeError};
    use tempfile::TempDir;

    fn sample_state() -> StakeState {
        let mut state = StakeState::new(StakeParams::default());
        state.update_account(5, &address(1), Some(5000), Some(Amount::from_raw(77)));
        state.update_account(5, &address(2), Some(6000), Some(Amount::from_raw(23)));
        state.recompute_totals(5);
        state.fold_round(5);
        state
    }

    #[test]
    fn test_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let state = sample_state();
        state.persist(&path).unwrap();
        assert!(!dir.path().join("state.json.tmp").exists());

        let loaded = StakeState::load(&path, 6, StakeParams::default()).unwrap();
        assert!(loaded.dirty);
        assert_eq!(loaded.total_stake, state.total_stake);
        assert_eq!(loaded.last_folded_round, Some(5));
        let account = loaded.get(&address(1)).unwrap();
        assert_eq!(account.vote_last, state.get(&address(1)).unwrap().vote_last);
        assert_eq!(account.agg_online_count, 1);
    }

    #[test]
    fn test_resume_after_folded_rounds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        sample_state().persist(&path).unwrap();

        let loaded = StakeState::load(&path, 2, StakeParams::default()).unwrap();
        assert_eq!(loaded.resume_round(2), 6);
        assert_eq!(loaded.resume_round(6), 6);
        assert_eq!(loaded.resume_round(9), 9);
    }

    #[test]
    fn test_snapshot_ahead_of_feed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        // recomputed at round 5 but nothing folded
        let mut state = StakeState::new(StakeParams::default());
        state.update_account(5, &address(1), Some(5000), Some(Amount::from_raw(77)));
        state.recompute_totals(5);
        state.persist(&path).unwrap();
        let res = StakeState::load(&path, 4, StakeParams::default());
        assert_matches!(
            &res,
            Err(StakeError::SnapshotAhead {
                snapshot_round: 5,
                next_round: 4
            })
        );
        assert!(res.unwrap_err().is_fatal());
    }

    #[test]
    fn test_missing_or_malformed_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        assert_matches!(
            StakeState::load(&path, 0, StakeParams::default()),
            Err(StakeError::InvalidSnapshot(_))
        );
        std::fs::write(&path, b"{\"accounts\": 12}").unwrap();
        assert_matches!(
            StakeState::load(&path, 0, StakeParams::default()),
            Err(StakeError::InvalidSnapshot(_))
        );
    }
}
