use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Settings for one [`Session`](crate::Session).
///
/// Every field is optional in the JSON file, missing ones take their default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed for shuffling and for the watchdog. Random if not given.
    pub seed: Option<u64>,
    /// How long the machine thinks before each move
    pub think_time_ms: u64,
    /// Bounds of the random pause between two watchdog checks
    pub watchdog_min_ms: u64,
    pub watchdog_max_ms: u64,
    /// How many cards of the human hand are shown at once
    pub hand_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            think_time_ms: 1500,
            watchdog_min_ms: 2000,
            watchdog_max_ms: 5000,
            hand_window: 4,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open config file {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.watchdog_min_ms == 0 {
            bail!("watchdog_min_ms must be positive");
        }
        if self.watchdog_min_ms > self.watchdog_max_ms {
            bail!(
                "watchdog_min_ms ({}) is larger than watchdog_max_ms ({})",
                self.watchdog_min_ms,
                self.watchdog_max_ms
            );
        }
        if self.hand_window == 0 {
            bail!("hand_window must be at least 1");
        }
        Ok(())
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    pub fn watchdog_interval(&self) -> RangeInclusive<Duration> {
        Duration::from_millis(self.watchdog_min_ms)..=Duration::from_millis(self.watchdog_max_ms)
    }
}
