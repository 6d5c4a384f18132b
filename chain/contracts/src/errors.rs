//! Pool error types
//!
//! Every failure aborts the whole call; no variant leaves partial state behind.

use chrono::{DateTime, Utc};
use pool_types::errors::AssetError;
use pool_types::ids::{AccountId, AssetId};
use pool_types::numeric::Amount;
use thiserror::Error;

/// Errors returned by pool entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    // Input validation
    #[error("Deposit amount must be positive")]
    InvalidAmount,

    #[error("Insufficient authorization: required {required}, approved {approved}")]
    InsufficientAuthorization { required: Amount, approved: Amount },

    // State preconditions
    #[error("Lock not expired: withdrawal allowed after {unlocks_at}")]
    LockNotExpired { unlocks_at: DateTime<Utc> },

    #[error("No investment recorded for {participant}")]
    ZeroInvestment { participant: AccountId },

    #[error("Insufficient custody funds: required {required}, available {available}")]
    InsufficientCustodyFunds { required: Amount, available: Amount },

    #[error("No profit available: profit {profit} does not exceed threshold {threshold}")]
    NoProfitAvailable { profit: Amount, threshold: Amount },

    #[error("Participant {participant} (sequence {sequence_id}) has no investment")]
    ParticipantHasNoInvestment {
        participant: AccountId,
        sequence_id: u64,
    },

    #[error("Asset not allowed: {asset}")]
    AssetNotAllowed { asset: AssetId },

    // Invariant violations
    #[error("Profit computation invariant violated for {participant}: claim {claim}, principal {principal}")]
    ProfitComputationInvariantViolated {
        participant: AccountId,
        claim: Amount,
        principal: Amount,
    },

    #[error("Pool balance underflow: balance {balance}, debit {debit}")]
    PoolBalanceUnderflow { balance: Amount, debit: Amount },

    #[error("Arithmetic overflow in pool accounting")]
    Overflow,

    // Authorization
    #[error("Unauthorized: caller is not the controller")]
    Unauthorized,

    #[error("Reentrancy detected")]
    ReentrancyDetected,

    // Configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    // External collaborators
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Pool configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Fee percent must be at most 100, got {0}")]
    FeePercentOutOfRange(u8),

    #[error("Lock duration must be positive, got {0} days")]
    InvalidLockDuration(i64),

    #[error("Duplicate allow-list entry: {0}")]
    DuplicateAllowedAsset(AssetId),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display() {
        let err = PoolError::InsufficientAuthorization {
            required: Amount::new(500),
            approved: Amount::new(100),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient authorization: required 500, approved 100"
        );
    }

    #[test]
    fn test_no_profit_display() {
        let err = PoolError::NoProfitAvailable {
            profit: Amount::new(100),
            threshold: Amount::new(100),
        };
        assert!(err.to_string().contains("threshold 100"));
    }

    #[test]
    fn test_pool_error_from_asset() {
        let asset_err = AssetError::Rejected {
            reason: "frozen".to_string(),
        };
        let pool_err: PoolError = asset_err.into();
        assert!(matches!(pool_err, PoolError::Asset(_)));
    }

    #[test]
    fn test_pool_error_from_config() {
        let pool_err: PoolError = ConfigError::FeePercentOutOfRange(101).into();
        assert!(pool_err.to_string().contains("101"));
    }
}
