//! Pool events
//!
//! Immutable records appended to the pool's event log by successful calls.
//! Failed calls emit nothing.

use chrono::{DateTime, Utc};
use pool_types::ids::{AccountId, AssetId};
use pool_types::numeric::Amount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Principal accepted from a participant and shares minted 1:1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub participant: AccountId,
    pub amount: Amount,
    /// Participant's principal after this deposit
    pub principal: Amount,
    pub sequence_id: u64,
    pub unlocks_at: DateTime<Utc>,
}

/// Principal returned and shares burned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub participant: AccountId,
    pub amount: Amount,
}

/// One payout line of a distribution round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitPaid {
    pub distribution_id: Uuid,
    pub participant: AccountId,
    pub sequence_id: u64,
    pub user_profit: Amount,
    pub fee: Amount,
}

/// Summary of a completed distribution round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitDistributed {
    pub distribution_id: Uuid,
    pub custody_balance: Amount,
    pub total_profit: Amount,
    pub participants_paid: usize,
    pub total_user_profit: Amount,
    pub total_fees: Amount,
    pub residual_swept: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swapped {
    pub router: AccountId,
    pub from_asset: AssetId,
    pub amount_in: Amount,
    pub to_asset: AssetId,
    pub amount_out: Amount,
}

/// Controller moved custodied assets outside pool accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransferred {
    pub asset: AssetId,
    pub to: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTransferred {
    pub to: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeReceived {
    pub from: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDurationUpdated {
    pub previous_days: i64,
    pub lock_duration_days: i64,
}

/// Enum wrapper for all pool events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    ProfitPaid(ProfitPaid),
    ProfitDistributed(ProfitDistributed),
    Swapped(Swapped),
    AssetTransferred(AssetTransferred),
    NativeTransferred(NativeTransferred),
    NativeReceived(NativeReceived),
    LockDurationUpdated(LockDurationUpdated),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deposited_serialization() {
        let event = Deposited {
            participant: AccountId::new(),
            amount: Amount::new(1_000),
            principal: Amount::new(1_500),
            sequence_id: 4,
            unlocks_at: Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: Deposited = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_contract_event_enum_variant() {
        let event = ContractEvent::Withdrawn(Withdrawn {
            participant: AccountId::new(),
            amount: Amount::new(5),
        });
        assert!(matches!(event, ContractEvent::Withdrawn(_)));
    }

    #[test]
    fn test_profit_distributed_serialization() {
        let event = ContractEvent::ProfitDistributed(ProfitDistributed {
            distribution_id: Uuid::now_v7(),
            custody_balance: Amount::new(2_300),
            total_profit: Amount::new(300),
            participants_paid: 2,
            total_user_profit: Amount::new(286),
            total_fees: Amount::new(14),
            residual_swept: Amount::new(2_000),
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: ContractEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }
}
