use crate::save::MAX_SAVED_REPTILES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine and host settings. Missing JSON fields fall back to `Default`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub seed:                 u64,
    /// Maximum number of reptiles the engine will hold.
    pub capacity:             usize,
    pub tick_interval_ms:     u64,
    pub autosave_every_ticks: u64,
    pub event_history:        usize,
    /// Key namespace in the durable store.
    pub namespace:            String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                 0,
            capacity:             10,
            tick_interval_ms:     100,
            autosave_every_ticks: 100,
            event_history:        64,
            namespace:            "reptile_game".to_string(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        if config.capacity == 0 || config.capacity > MAX_SAVED_REPTILES {
            anyhow::bail!(
                "Invalid config {}: capacity must be between 1 and {MAX_SAVED_REPTILES}",
                path.display()
            );
        }
        Ok(config)
    }

    /// Default config with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }
}
