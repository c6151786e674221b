// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Adaptive batching of the aggregate rows sent to the store

use online_stake_exports::{AggregateRow, OnlineStakeConfig, Round, StakeResult, StakeStore};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Buffer of the aggregate rows of closed windows not yet sent to the store.
///
/// While the feed is replaying history (consecutive rounds arriving faster than
/// `catch_up_threshold`), windows are buffered up to `batch_limit` before a flush.
/// Live rounds are flushed as soon as their window closes.
#[derive(Debug)]
pub struct AggregateBundle {
    batch_limit: usize,
    catch_up_threshold: Duration,
    batches: usize,
    batch: Option<Vec<AggregateRow>>,
    last_round: Option<Round>,
    last_seen: Option<Instant>,
    is_catching_up: bool,
    retry_pending: bool,
}

impl AggregateBundle {
    /// Empty bundle
    pub fn new(batch_limit: usize, catch_up_threshold: Duration) -> Self {
        AggregateBundle {
            batch_limit,
            catch_up_threshold,
            batches: 0,
            batch: None,
            last_round: None,
            last_seen: None,
            is_catching_up: false,
            retry_pending: false,
        }
    }

    /// Empty bundle using the limits of `config`
    pub fn from_config(config: &OnlineStakeConfig) -> Self {
        AggregateBundle::new(config.batch_limit, config.catch_up_threshold)
    }

    /// Classifies the ingestion as catching up or live, see `observe_round_at`
    pub fn observe_round(&mut self, round: Round) -> bool {
        self.observe_round_at(round, Instant::now())
    }

    /// Classifies the ingestion as catching up if `round` directly follows the previous
    /// observed round and arrived within the catch-up threshold.
    pub fn observe_round_at(&mut self, round: Round, now: Instant) -> bool {
        let consecutive = self
            .last_round
            .and_then(|last| round.checked_sub(last))
            .map_or(false, |gap| gap == 1);
        let fast = self
            .last_seen
            .map_or(false, |last| now.saturating_duration_since(last) < self.catch_up_threshold);
        let catching_up = consecutive && fast;
        if catching_up != self.is_catching_up {
            info!(round, "Catching up: {}", catching_up);
        }
        self.is_catching_up = catching_up;
        self.last_round = Some(round);
        self.last_seen = Some(now);
        catching_up
    }

    /// Current ingestion classification
    pub fn is_catching_up(&self) -> bool {
        self.is_catching_up
    }

    /// Number of windows buffered
    pub fn pending_windows(&self) -> usize {
        self.batches
    }

    /// Number of rows buffered
    pub fn pending_rows(&self) -> usize {
        self.batch.as_ref().map_or(0, Vec::len)
    }

    /// True if the last flush failed and its rows are still buffered
    pub fn has_retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Appends the rows of a closed window to the open batch
    pub fn append_rows(&mut self, rows: Vec<AggregateRow>) {
        self.batch.get_or_insert_with(Vec::new).extend(rows);
        self.batches += 1;
    }

    /// Sends the buffered rows to the store if forced, live, or over the batch limit.
    /// On failure the rows stay buffered for the next flush.
    ///
    /// Returns true if the buffer was emptied.
    pub fn flush(&mut self, store: &mut dyn StakeStore, force: bool) -> StakeResult<bool> {
        if self.batches == 0 {
            return Ok(false);
        }
        if !force && self.is_catching_up && self.batches <= self.batch_limit {
            debug!("Buffering {} aggregate windows", self.batches);
            return Ok(false);
        }
        let rows = self.batch.take().unwrap_or_default();
        if !rows.is_empty() {
            info!(
                "Sending {} aggregate rows from {} windows",
                rows.len(),
                self.batches
            );
            if let Err(err) = store.insert_aggregates(rows.clone()) {
                warn!("Aggregate insert failed: {}", err);
                self.batch = Some(rows);
                self.retry_pending = true;
                return Err(err);
            }
        }
        self.batches = 0;
        self.retry_pending = false;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use online_stake_exports::test_exports::{MockStakeStore, RecordingStore, StoreMessage};
    use online_stake_exports::StakeError;

    fn rows(round: Round) -> Vec<AggregateRow> {
        vec![AggregateRow {
            address: "A".into(),
            round,
            timestamp: 0,
            online_rounds: 1,
            stake_fraction_sum: 1.0,
        }]
    }

    #[test]
    fn test_catch_up_detection() {
        let mut bundle = AggregateBundle::new(100, Duration::from_secs(1));
        let start = Instant::now();
        assert!(!bundle.observe_round_at(10, start));
        assert!(bundle.observe_round_at(11, start + Duration::from_millis(10)));
        // round gap of 2
        assert!(!bundle.observe_round_at(13, start + Duration::from_millis(20)));
        assert!(bundle.observe_round_at(14, start + Duration::from_millis(30)));
        // slow round
        assert!(!bundle.observe_round_at(15, start + Duration::from_secs(2)));
        // same round delivered again
        assert!(!bundle.observe_round_at(15, start + Duration::from_secs(2)));
    }

    #[test]
    fn test_live_rounds_flush_every_window() {
        let (mut store, rx) = RecordingStore::new_with_receiver();
        let mut bundle = AggregateBundle::new(100, Duration::from_secs(1));
        bundle.append_rows(rows(0));
        assert!(bundle.flush(&mut store, false).unwrap());
        assert_matches!(rx.try_recv(), Ok(StoreMessage::Aggregates(sent)) if sent.len() == 1);
        assert_eq!(bundle.pending_windows(), 0);

        // nothing to send
        assert!(!bundle.flush(&mut store, true).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_catch_up_buffers_up_to_batch_limit() {
        let (mut store, rx) = RecordingStore::new_with_receiver();
        let mut bundle = AggregateBundle::new(100, Duration::from_secs(1));
        let start = Instant::now();
        let window_size = 10;
        let mut flushes = 0;
        for window in 0..150u64 {
            for round in window * window_size..(window + 1) * window_size {
                bundle.observe_round_at(round, start + Duration::from_millis(round));
            }
            bundle.append_rows(rows(window));
            if bundle.flush(&mut store, false).unwrap() {
                flushes += 1;
            }
        }
        assert_eq!(flushes, 1);
        assert_matches!(rx.try_recv(), Ok(StoreMessage::Aggregates(sent)) if sent.len() == 101);
        assert_eq!(bundle.pending_windows(), 49);

        assert!(bundle.flush(&mut store, true).unwrap());
        assert_matches!(rx.try_recv(), Ok(StoreMessage::Aggregates(sent)) if sent.len() == 49);
    }

    #[test]
    fn test_failed_flush_keeps_rows() {
        let mut store = MockStakeStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_insert_aggregates()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(StakeError::Store("connection refused".into())));
        store
            .expect_insert_aggregates()
            .withf(|rows| rows.len() == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut bundle = AggregateBundle::new(100, Duration::from_secs(1));
        bundle.append_rows(rows(0));
        bundle.append_rows(rows(1));
        assert_matches!(bundle.flush(&mut store, false), Err(StakeError::Store(_)));
        assert!(bundle.has_retry_pending());
        assert_eq!(bundle.pending_rows(), 2);

        assert!(bundle.flush(&mut store, false).unwrap());
        assert!(!bundle.has_retry_pending());
        assert_eq!(bundle.pending_rows(), 0);
    }
}
