//! Engine configuration loader.

use std::path::Path;

use effect_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing EngineConfig
    ///
    /// # Returns
    ///
    /// Returns an EngineConfig. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Parse config data from TOML text.
    pub fn from_str(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if !config.reduction_cap.is_finite() {
            anyhow::bail!("reduction_cap must be finite, got {}", config.reduction_cap);
        }
        if config.second_interval == 0 {
            anyhow::bail!("second_interval must be at least 1 tick");
        }
        let reduction_cap = config.reduction_cap;
        Ok(config.with_reduction_cap(reduction_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = ConfigLoader::from_str("second_interval = 10\n").unwrap();
        assert_eq!(config.second_interval, 10);
        assert_eq!(config.reduction_cap, EngineConfig::DEFAULT_REDUCTION_CAP);
        assert_eq!(
            config.status_refresh_window,
            EngineConfig::DEFAULT_STATUS_REFRESH_WINDOW
        );
    }

    #[test]
    fn reduction_cap_is_clamped() {
        let config = ConfigLoader::from_str("reduction_cap = 1.5\n").unwrap();
        assert_eq!(config.reduction_cap, 1.0);
    }

    #[test]
    fn rejects_zero_second_interval() {
        assert!(ConfigLoader::from_str("second_interval = 0\n").is_err());
    }
}
