// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Store writing each table as a JSON lines file

use online_stake_exports::{AggregateRow, StakeResult, StakeSnapshotRow, StakeStore, StoreConfig};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use tracing::debug;

/// Appends rows to `<path>/<table>.jsonl`, one JSON object per line.
/// A table left unset in the config is not written.
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    /// Store writing under `config.path`, created if missing
    pub fn new(config: StoreConfig) -> StakeResult<Self> {
        std::fs::create_dir_all(&config.path)?;
        Ok(FileStore { config })
    }

    fn append<T: Serialize>(&self, table: Option<&String>, rows: &[T]) -> StakeResult<()> {
        let Some(table) = table else {
            return Ok(());
        };
        let path = self.config.path.join(format!("{}.jsonl", table));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        debug!("{} rows written to {}", rows.len(), path.display());
        Ok(())
    }
}

impl StakeStore for FileStore {
    fn insert_aggregates(&mut self, rows: Vec<AggregateRow>) -> StakeResult<()> {
        self.append(self.config.aggregate_table.as_ref(), &rows)
    }

    fn insert_stake_snapshot(&mut self, rows: Vec<StakeSnapshotRow>) -> StakeResult<()> {
        self.append(self.config.snapshot_table.as_ref(), &rows)
    }
}
