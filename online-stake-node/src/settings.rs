// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Build here the default node settings from the configuration file toml
use online_stake_exports::{Address, Amount, OnlineStakeConfig, StoreConfig};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BASE_CONFIG_PATH: &str = "base_config/config.toml";
const OVERRIDE_CONFIG_PATH: &str = "config/config.toml";
const ENV_PREFIX: &str = "ONLINE_STAKE";

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LoggingSettings {
    pub level: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NodeSettings {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub path: PathBuf,
    pub poll_interval_ms: u64,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub state_file_path: PathBuf,
    pub aggregation_window_size: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub eligibility_min_stake: Amount,
    #[serde_as(as = "DisplayFromStr")]
    pub eligibility_max_stake: Amount,
    pub batch_limit: usize,
    pub catch_up_threshold_millis: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub debug_address: Option<Address>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub path: PathBuf,
    pub aggregate_table: Option<String>,
    pub snapshot_table: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub node: NodeSettings,
    pub feed: FeedSettings,
    pub engine: EngineSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Layers the base file, the optional override file and the `ONLINE_STAKE_*` environment.
    /// `base_path` replaces the base file given by `ONLINE_STAKE_CONFIG_PATH`.
    pub fn load(base_path: Option<&Path>) -> anyhow::Result<Settings> {
        let base = match base_path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("ONLINE_STAKE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(BASE_CONFIG_PATH)),
        };
        let override_path = std::env::var("ONLINE_STAKE_CONFIG_OVERRIDE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(OVERRIDE_CONFIG_PATH));

        let mut builder = config::Config::builder().add_source(config::File::from(base));
        if override_path.is_file() {
            builder = builder.add_source(config::File::from(override_path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Engine configuration, relative paths resolved against `data_dir`
    pub fn engine_config(&self, data_dir: &Path) -> OnlineStakeConfig {
        OnlineStakeConfig {
            state_file_path: data_dir.join(&self.engine.state_file_path),
            store: StoreConfig {
                path: data_dir.join(&self.store.path),
                aggregate_table: self.store.aggregate_table.clone(),
                snapshot_table: self.store.snapshot_table.clone(),
            },
            aggregation_window_size: self.engine.aggregation_window_size,
            eligibility_min_stake: self.engine.eligibility_min_stake,
            eligibility_max_stake: self.engine.eligibility_max_stake,
            batch_limit: self.engine.batch_limit,
            catch_up_threshold: Duration::from_millis(self.engine.catch_up_threshold_millis),
            debug_address: self.engine.debug_address,
            dry_run: self.engine.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use online_stake_exports::constants::{ELIGIBILITY_MAX_STAKE, ELIGIBILITY_MIN_STAKE};

    #[test]
    fn test_base_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(BASE_CONFIG_PATH);
        let settings = Settings::load(Some(&path)).unwrap();
        let config = settings.engine_config(Path::new("/var/lib/online-stake"));
        let defaults = OnlineStakeConfig::default();

        config.check().unwrap();
        assert_eq!(config.eligibility_min_stake, ELIGIBILITY_MIN_STAKE);
        assert_eq!(config.eligibility_max_stake, ELIGIBILITY_MAX_STAKE);
        assert_eq!(config.aggregation_window_size, defaults.aggregation_window_size);
        assert_eq!(config.batch_limit, defaults.batch_limit);
        assert_eq!(config.catch_up_threshold, defaults.catch_up_threshold);
        assert_eq!(
            config.state_file_path,
            PathBuf::from("/var/lib/online-stake/online_stake_state.json")
        );
        assert!(config.debug_address.is_none());
    }

    #[test]
    fn test_debug_address_is_decoded() {
        let dir = tempfile::TempDir::new().unwrap();
        let address = Address::from_bytes(&[9u8; 32]);
        let content = std::fs::read_to_string(
            Path::new(env!("CARGO_MANIFEST_DIR")).join(BASE_CONFIG_PATH),
        )
        .unwrap()
        .replace(
            "    dry_run = false",
            &format!("    dry_run = true\n    debug_address = \"{}\"", address),
        );
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.engine.debug_address, Some(address));
        assert!(settings.engine.dry_run);
    }
}
