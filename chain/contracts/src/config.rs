//! Pool configuration
//!
//! Parameters fixed when the pool is constructed. Only the lock duration can
//! change afterwards, through a controller call.

use std::collections::HashSet;

use chrono::Duration;
use pool_types::ids::AssetId;
use pool_types::numeric::Amount;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How `distribute_profit` walks the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionPolicy {
    /// Visit one slot per deposit event, fail the whole round on any
    /// zero-principal record and sweep the entire residual custody balance
    /// to the controller.
    #[default]
    Faithful,
    /// Visit each record once, skip withdrawn records and sweep only custody
    /// in excess of the pool balance.
    Corrected,
}

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Asset participants deposit and are repaid in
    pub settlement_asset: AssetId,
    /// Decimal places of the settlement asset, used for display only
    pub settlement_decimals: u32,
    /// Lock period applied from every deposit
    pub lock_duration_days: i64,
    /// Profit must strictly exceed this before a distribution runs
    pub min_profit_threshold: Amount,
    /// Controller fee taken from each participant's profit
    pub fee_percent: u8,
    /// Fixed allow-list answered by `is_allowed_asset`
    pub allowed_assets: Vec<AssetId>,
    pub distribution_policy: DistributionPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            settlement_asset: AssetId::new("USDC"),
            settlement_decimals: 6,
            lock_duration_days: 180,
            min_profit_threshold: Amount::new(100),
            fee_percent: 5,
            allowed_assets: ["USDC", "USDT", "DAI", "WETH", "WBTC"]
                .into_iter()
                .map(AssetId::new)
                .collect(),
            distribution_policy: DistributionPolicy::Faithful,
        }
    }
}

impl PoolConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_percent > 100 {
            return Err(ConfigError::FeePercentOutOfRange(self.fee_percent));
        }
        lock_duration(self.lock_duration_days)?;

        let mut seen = HashSet::new();
        for asset in &self.allowed_assets {
            if !seen.insert(asset) {
                return Err(ConfigError::DuplicateAllowedAsset(asset.clone()));
            }
        }
        Ok(())
    }

    /// Lock period as a duration
    pub fn lock_duration(&self) -> Result<Duration, ConfigError> {
        lock_duration(self.lock_duration_days)
    }
}

pub(crate) fn lock_duration(days: i64) -> Result<Duration, ConfigError> {
    if days <= 0 {
        return Err(ConfigError::InvalidLockDuration(days));
    }
    Duration::try_days(days).ok_or(ConfigError::InvalidLockDuration(days))
}
