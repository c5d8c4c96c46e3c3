use std::fs::read_to_string;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RECENTLY_VIEWED_KEY: &str = "recentlyViewedCars";
pub const POPULAR_COMPARISONS_KEY: &str = "popularComparisons";
pub const MAX_RECENTLY_VIEWED: usize = 10;
pub const MAX_POPULAR_COMPARISONS: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Storage keys and list bounds for the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityConfig {
    pub recently_viewed_key: String,
    pub popular_comparisons_key: String,
    pub max_recently_viewed: usize,
    pub max_popular_comparisons: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            recently_viewed_key: RECENTLY_VIEWED_KEY.to_string(),
            popular_comparisons_key: POPULAR_COMPARISONS_KEY.to_string(),
            max_recently_viewed: MAX_RECENTLY_VIEWED,
            max_popular_comparisons: MAX_POPULAR_COMPARISONS,
        }
    }
}

impl ActivityConfig {
    /// Parses a JSON object; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ActivityConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recently_viewed == 0 || self.max_popular_comparisons == 0 {
            return Err(ConfigError::Invalid("list bounds must be at least 1".to_string()));
        }
        if self.recently_viewed_key.is_empty() || self.popular_comparisons_key.is_empty() {
            return Err(ConfigError::Invalid("storage keys must not be empty".to_string()));
        }
        if self.recently_viewed_key == self.popular_comparisons_key {
            return Err(ConfigError::Invalid(format!(
                "both logs would share the key {}",
                self.recently_viewed_key
            )));
        }
        Ok(())
    }

    /// Reads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let json = match read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                info!("{} not readable ({e}), using default activity config", path.display());
                return Self::default();
            }
        };

        Self::from_json(&json).unwrap_or_else(|e| {
            warn!("Ignoring {}: {e}", path.display());
            Self::default()
        })
    }
}
