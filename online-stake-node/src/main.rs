// Copyright (c) 2022 MASSA LABS <info@massa.net>

mod feed;
mod metadata;
mod settings;

use crate::feed::{FileBlockFeed, ReadFailures};
use crate::metadata::DriverMetadata;
use crate::settings::Settings;
use anyhow::Context;
use clap::Parser;
use online_stake_exports::BlockFeed;
use online_stake_worker::{FileStore, OnlineStakeExporter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(version, about = "Online stake tracking and aggregation")]
struct Args {
    /// Base configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Data directory, overrides `node.data_dir`
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn run(settings: &Settings, data_dir: PathBuf, stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("could not create data directory {}", data_dir.display()))?;
    let metadata_path = data_dir.join("metadata.json");
    let metadata = DriverMetadata::load(&metadata_path)?;
    let feed = FileBlockFeed::new(settings.feed.path.clone());
    let config = settings.engine_config(&data_dir);
    let store = FileStore::new(config.store.clone())?;
    let poll_interval = Duration::from_millis(settings.feed.poll_interval_ms);

    let mut exporter = OnlineStakeExporter::new(config, metadata.next_round, &feed, Box::new(store))
        .context("could not start the online stake engine")?;
    let mut round = exporter.durable_next_round();
    let mut failures = ReadFailures::default();

    while !stop.load(Ordering::SeqCst) {
        let block = match feed.block(round) {
            Ok(Some(block)) => {
                failures.clear();
                block
            }
            Ok(None) => {
                std::thread::sleep(poll_interval);
                continue;
            }
            Err(err) => {
                if failures.record(round) {
                    error!(round, "Block still unreadable: {}", err);
                } else {
                    warn!(round, "Could not read block: {}", err);
                }
                std::thread::sleep(poll_interval);
                continue;
            }
        };
        match exporter.receive(&block) {
            Ok(()) => {
                round += 1;
                DriverMetadata {
                    next_round: exporter.durable_next_round(),
                }
                .save(&metadata_path)?;
            }
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                warn!(round, "Round failed, retrying: {}", err);
                std::thread::sleep(poll_interval);
            }
        }
    }

    info!("Stop requested at round {}", round);
    exporter.close()?;
    DriverMetadata {
        next_round: exporter.durable_next_round(),
    }
    .save(&metadata_path)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    let level = match settings.logging.level {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
    })
    .context("could not set the interrupt handler")?;

    let data_dir = args
        .data_dir
        .unwrap_or_else(|| settings.node.data_dir.clone());
    if let Err(err) = run(&settings, data_dir, stop) {
        error!("Online stake node stopped: {:#}", err);
        return Err(err);
    }
    info!("End of process");
    Ok(())
}
