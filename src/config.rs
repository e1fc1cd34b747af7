//! Config loading and persistence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Limits;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
}

impl Config {
    /// Load from a JSON file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => {
                let config = serde_json::from_slice(&bytes).map_err(Error::ConfigFormat)?;
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(Error::ConfigIo(err)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(Error::ConfigFormat)?;
        fs::write(path, json).map_err(Error::ConfigIo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/vault-config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"limits": {"max_history_depth": 7}}"#).unwrap();
        assert_eq!(config.limits.max_history_depth, 7);
        assert_eq!(
            config.limits.max_batch_actions,
            Limits::default().max_batch_actions
        );
    }
}
