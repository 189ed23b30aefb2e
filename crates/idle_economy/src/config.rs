//! Seed configuration for new accounts
//!
//! Holds the per-category starting values and the claim policy. Defaults match
//! the shipped farm economy; hosts may override them from a TOML file.

use crate::account::AssetLines;
use crate::asset_line::AssetLine;
use crate::errors::{EconomyError, Result};
use crate::types::{AssetCategory, ClaimPolicy, Points};
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU128, NonZeroU64};
use std::path::Path;
use tracing::{info, warn};

// Evaluated at compile time for the seed constants below.
const fn divisor(value: u64) -> NonZeroU64 {
    match NonZeroU64::new(value) {
        Some(divisor) => divisor,
        None => panic!("growth divisors must be positive"),
    }
}

const CROPS_SEED: LineConfig = LineConfig {
    quantity: 1,
    production_rate: 10_000,
    rate_growth_divisor: divisor(100), // +1% rate per upgrade
    upgrade_cost: 1_000_000,
    cost_growth_divisor: divisor(10), // +10% cost per upgrade
};

const ANIMALS_SEED: LineConfig = LineConfig {
    quantity: 0,
    production_rate: 30_000,
    rate_growth_divisor: divisor(90),
    upgrade_cost: 10_000_000,
    cost_growth_divisor: divisor(5),
};

const WORKERS_SEED: LineConfig = LineConfig {
    quantity: 0,
    production_rate: 70_000,
    rate_growth_divisor: divisor(80),
    upgrade_cost: 15_000_000,
    cost_growth_divisor: divisor(2),
};

/// Starting values for one asset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Owned units at account creation
    pub quantity: u64,
    /// Points per unit per block
    pub production_rate: u64,
    /// Rate grows by `rate / rate_growth_divisor` per upgrade
    pub rate_growth_divisor: NonZeroU64,
    /// Cost of the first upgrade
    pub upgrade_cost: u64,
    /// Cost grows by `cost / cost_growth_divisor` per upgrade
    pub cost_growth_divisor: NonZeroU64,
}

impl LineConfig {
    /// Zero divisors are unrepresentable, so building a line cannot fail.
    pub fn build(&self) -> AssetLine {
        AssetLine::new(
            self.quantity,
            self.production_rate as Points,
            NonZeroU128::from(self.rate_growth_divisor),
            self.upgrade_cost as Points,
            NonZeroU128::from(self.cost_growth_divisor),
        )
    }
}

/// Economy configuration shared by every account a host creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub claim_policy: ClaimPolicy,
    pub crops: LineConfig,
    pub animals: LineConfig,
    pub workers: LineConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            claim_policy: ClaimPolicy::default(),
            crops: CROPS_SEED,
            animals: ANIMALS_SEED,
            workers: WORKERS_SEED,
        }
    }
}

impl EconomyConfig {
    pub fn line(&self, category: AssetCategory) -> &LineConfig {
        match category {
            AssetCategory::Crops => &self.crops,
            AssetCategory::Animals => &self.animals,
            AssetCategory::Workers => &self.workers,
        }
    }

    /// Configurations that are legal but produce nothing.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for category in AssetCategory::ALL {
            let line = self.line(category);
            if line.production_rate == 0 {
                warnings.push(format!("{category} has a zero production rate"));
            }
            if line.upgrade_cost == 0 {
                warnings.push(format!("{category} upgrades are free"));
            }
        }
        if AssetCategory::ALL.iter().all(|c| self.line(*c).quantity == 0) {
            warnings.push("no category starts with owned units; accounts will never accrue".into());
        }
        warnings
    }

    /// Build the fixed set of lines for a new account.
    pub fn build_lines(&self) -> AssetLines {
        AssetLines::new(
            self.crops.build(),
            self.animals.build(),
            self.workers.build(),
        )
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EconomyConfig = toml::from_str(content)
            .map_err(|e| EconomyError::Config(format!("Failed to parse config: {e}")))?;
        for warning in config.warnings() {
            warn!("{warning}");
        }
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading economy configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| EconomyError::Config(format!("Failed to read config file: {e}")))?;
        let config = Self::from_toml_str(&content)?;

        info!("Economy configuration loaded");
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| EconomyError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| EconomyError::Config(format!("Failed to write config file: {e}")))?;

        info!("Economy configuration saved to: {}", path.display());
        Ok(())
    }
}
