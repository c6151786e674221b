// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver},
    Arc, Mutex,
};

use crate::{AggregateRow, StakeError, StakeResult, StakeSnapshotRow, StakeStore};

/// All inserts a `RecordingStore` forwards to its receiver.
#[derive(Debug)]
pub enum StoreMessage {
    /// A batch of aggregate rows
    Aggregates(Vec<AggregateRow>),
    /// A stake snapshot
    StakeSnapshot(Vec<StakeSnapshotRow>),
}

/// Store that forwards every insert to a receiver.
/// Can be switched to failing mode to simulate an unreachable store.
#[derive(Clone)]
pub struct RecordingStore {
    tx: Arc<Mutex<mpsc::Sender<StoreMessage>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingStore {
    /// Create a new pair (recording store, mpsc receiver for the inserts)
    /// Note that unbounded mpsc channels are used
    pub fn new_with_receiver() -> (RecordingStore, Receiver<StoreMessage>) {
        let (tx, rx) = mpsc::channel();
        (
            RecordingStore {
                tx: Arc::new(Mutex::new(tx)),
                failing: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Make every following insert fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn send(&self, msg: StoreMessage) -> StakeResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StakeError::Store("store unreachable".into()));
        }
        self.tx
            .lock()
            .unwrap()
            .send(msg)
            .map_err(|err| StakeError::Store(err.to_string()))
    }
}

impl StakeStore for RecordingStore {
    fn insert_aggregates(&mut self, rows: Vec<AggregateRow>) -> StakeResult<()> {
        self.send(StoreMessage::Aggregates(rows))
    }

    fn insert_stake_snapshot(&mut self, rows: Vec<StakeSnapshotRow>) -> StakeResult<()> {
        self.send(StoreMessage::StakeSnapshot(rows))
    }
}
