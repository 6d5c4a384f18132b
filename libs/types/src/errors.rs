//! Error types reported by external asset collaborators
//!
//! The pool core never implements fungible-asset mechanics itself; custody,
//! share and router implementations report their failures with these.

use thiserror::Error;

use crate::ids::AssetId;
use crate::numeric::Amount;

/// Failure reported by a fungible ledger, native-value transfer or router.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: AssetId,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient {asset} allowance: required {required}, approved {approved}")]
    InsufficientAllowance {
        asset: AssetId,
        required: Amount,
        approved: Amount,
    },

    #[error("Unknown asset: {asset}")]
    UnknownAsset { asset: AssetId },

    #[error("Slippage limit not met: minimum {min_amount_out}, quoted {amount_out}")]
    SlippageExceeded {
        min_amount_out: Amount,
        amount_out: Amount,
    },

    #[error("Arithmetic overflow in {asset} ledger")]
    Overflow { asset: AssetId },

    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_display() {
        let err = AssetError::InsufficientBalance {
            asset: AssetId::new("USDC"),
            required: Amount::new(10),
            available: Amount::new(3),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient USDC balance: required 10, available 3"
        );
    }

    #[test]
    fn test_slippage_display() {
        let err = AssetError::SlippageExceeded {
            min_amount_out: Amount::new(100),
            amount_out: Amount::new(90),
        };
        assert!(err.to_string().contains("90"));
    }
}
