// Copyright (c) 2022 MASSA LABS <info@massa.net>

use online_stake_exports::Round;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// Progress of the driver, saved in `<data_dir>/metadata.json`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMetadata {
    pub next_round: Round,
}

impl DriverMetadata {
    /// Reads the metadata file, a fresh start if it does not exist
    pub fn load(path: &Path) -> anyhow::Result<DriverMetadata> {
        match std::fs::read(path) {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(DriverMetadata::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        assert_eq!(DriverMetadata::load(&path).unwrap().next_round, 0);

        DriverMetadata { next_round: 1234 }.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"next_round":1234}"#
        );
        assert_eq!(DriverMetadata::load(&path).unwrap().next_round, 1234);
    }
}
