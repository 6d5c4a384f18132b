//! Vault — the pool facade, deposits and read-only views
//!
//! `ProfitPool` owns the participant registry, the configuration, the
//! reentrancy guard and the collaborator handles. Entry points take `&self`
//! so that a collaborator holding a reference to the pool can call back in
//! while an outbound transfer is running; the guard turns such calls away.
//!
//! Every state-changing operation:
//! 1. Enters the reentrancy guard
//! 2. Checks access control (where applicable)
//! 3. Validates inputs and preconditions before touching anything
//! 4. Performs collaborator calls without holding a borrow of pool state
//! 5. Commits registry changes and appends an event

use std::cell::RefCell;
use std::fmt;

use chrono::{DateTime, Utc};
use pool_types::ids::{AccountId, AssetId};
use pool_types::numeric::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::PoolConfig;
use crate::errors::PoolError;
use crate::events::{ContractEvent, Deposited};
use crate::interfaces::Collaborators;
use crate::registry::{InvestmentRecord, ParticipantRegistry};
use crate::security::{AccessControl, ReentrancyGuard};

/// Who is calling and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    pub now: DateTime<Utc>,
}

impl CallContext {
    pub fn new(caller: AccountId, now: DateTime<Utc>) -> Self {
        Self { caller, now }
    }
}

/// Serializable view of the pool's abstract state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool: AccountId,
    pub controller: AccountId,
    pub settlement_asset: AssetId,
    pub lock_duration_days: i64,
    pub min_profit_threshold: Amount,
    pub fee_percent: u8,
    pub allowed_assets: Vec<AssetId>,
    pub pool_balance: Amount,
    /// `pool_balance` in whole settlement-asset units
    pub pool_balance_display: Option<Decimal>,
    pub participant_count: u64,
    pub records: Vec<InvestmentRecord>,
    pub lock_deadlines: Vec<(AccountId, DateTime<Utc>)>,
}

/// Single-asset profit-sharing pool.
pub struct ProfitPool {
    /// Identity the pool holds custody under
    pub(crate) address: AccountId,
    pub(crate) access_control: AccessControl,
    pub(crate) config: RefCell<PoolConfig>,
    pub(crate) state: RefCell<ParticipantRegistry>,
    pub(crate) reentrancy_guard: ReentrancyGuard,
    pub(crate) collaborators: Collaborators,
    /// Emitted events log (append-only)
    pub(crate) events: RefCell<Vec<ContractEvent>>,
}

impl ProfitPool {
    /// Create a pool holding custody as `address`, controlled by `controller`.
    pub fn new(
        address: AccountId,
        controller: AccountId,
        config: PoolConfig,
        collaborators: Collaborators,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        info!(
            pool = %address,
            %controller,
            settlement_asset = %config.settlement_asset,
            lock_duration_days = config.lock_duration_days,
            fee_percent = config.fee_percent,
            policy = ?config.distribution_policy,
            "Pool initialized"
        );

        Ok(Self {
            address,
            access_control: AccessControl::new(controller),
            config: RefCell::new(config),
            state: RefCell::new(ParticipantRegistry::new()),
            reentrancy_guard: ReentrancyGuard::new(),
            collaborators,
            events: RefCell::new(Vec::new()),
        })
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Pull `amount` of the settlement asset from the caller, mint the same
    /// number of shares and credit the caller's record.
    ///
    /// The caller must have approved the pool for at least `amount`. The
    /// caller's lock deadline moves to `now + lock_duration_days`.
    pub fn deposit(&self, ctx: &CallContext, amount: Amount) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;

        if amount.is_zero() {
            warn!(participant = %ctx.caller, "Rejected zero deposit");
            return Err(PoolError::InvalidAmount);
        }

        let asset = self.settlement_asset();
        let approved = self
            .collaborators
            .assets
            .allowance(&asset, &ctx.caller, &self.address);
        if approved < amount {
            warn!(participant = %ctx.caller, %amount, %approved, "Deposit exceeds allowance");
            return Err(PoolError::InsufficientAuthorization {
                required: amount,
                approved,
            });
        }

        let lock_duration = self.config.borrow().lock_duration()?;
        let unlocks_at = ctx
            .now
            .checked_add_signed(lock_duration)
            .ok_or(PoolError::Overflow)?;
        self.state.borrow().check_credit(&ctx.caller, amount)?;

        self.collaborators
            .assets
            .transfer_from(&asset, &self.address, &ctx.caller, &self.address, amount)?;

        if let Err(mint_err) = self.collaborators.shares.mint(&ctx.caller, amount) {
            if let Err(refund_err) =
                self.collaborators
                    .assets
                    .transfer(&asset, &self.address, &ctx.caller, amount)
            {
                error!(
                    participant = %ctx.caller,
                    %amount,
                    %refund_err,
                    "Failed to return deposit after mint failure"
                );
            }
            return Err(mint_err.into());
        }

        let record = self
            .state
            .borrow_mut()
            .upsert(ctx.caller, amount, unlocks_at)?;

        info!(
            participant = %ctx.caller,
            %amount,
            principal = %record.principal,
            sequence_id = record.sequence_id,
            %unlocks_at,
            "Deposit recorded"
        );

        Ok(self.emit(ContractEvent::Deposited(Deposited {
            participant: ctx.caller,
            amount,
            principal: record.principal,
            sequence_id: record.sequence_id,
            unlocks_at,
        })))
    }

    // ───────────────────────── Views ─────────────────────────

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn controller(&self) -> AccountId {
        self.access_control.controller()
    }

    pub fn settlement_asset(&self) -> AssetId {
        self.config.borrow().settlement_asset.clone()
    }

    pub fn config(&self) -> PoolConfig {
        self.config.borrow().clone()
    }

    /// Membership in the fixed asset allow-list.
    pub fn is_allowed_asset(&self, asset: &AssetId) -> bool {
        self.config.borrow().allowed_assets.contains(asset)
    }

    /// Outstanding principal owed to participants.
    pub fn pool_balance(&self) -> Amount {
        self.state.borrow().pool_balance()
    }

    /// Deposit events recorded so far.
    pub fn participant_count(&self) -> u64 {
        self.state.borrow().participant_count()
    }

    pub fn record(&self, participant: &AccountId) -> Option<InvestmentRecord> {
        self.state.borrow().record(participant).cloned()
    }

    pub fn records(&self) -> Vec<InvestmentRecord> {
        self.state.borrow().records().to_vec()
    }

    pub fn lock_deadline(&self, participant: &AccountId) -> Option<DateTime<Utc>> {
        self.state.borrow().lock_deadline(participant)
    }

    /// Settlement asset held in custody.
    pub fn custody_balance(&self) -> Amount {
        self.collaborators
            .assets
            .balance_of(&self.settlement_asset(), &self.address)
    }

    pub fn share_supply(&self) -> Amount {
        self.collaborators.shares.total_supply()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let config = self.config.borrow();
        let state = self.state.borrow();
        PoolSnapshot {
            pool: self.address,
            controller: self.controller(),
            settlement_asset: config.settlement_asset.clone(),
            lock_duration_days: config.lock_duration_days,
            min_profit_threshold: config.min_profit_threshold,
            fee_percent: config.fee_percent,
            allowed_assets: config.allowed_assets.clone(),
            pool_balance: state.pool_balance(),
            pool_balance_display: state.pool_balance().to_decimal(config.settlement_decimals),
            participant_count: state.participant_count(),
            records: state.records().to_vec(),
            lock_deadlines: state.lock_deadlines(),
        }
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> Vec<ContractEvent> {
        self.events.borrow().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<ContractEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub(crate) fn emit(&self, event: ContractEvent) -> ContractEvent {
        self.events.borrow_mut().push(event.clone());
        event
    }
}

impl fmt::Debug for ProfitPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfitPool")
            .field("address", &self.address)
            .field("controller", &self.controller())
            .field("pool_balance", &self.pool_balance())
            .field("participant_count", &self.participant_count())
            .field("guarded", &self.reentrancy_guard.is_locked())
            .finish()
    }
}
