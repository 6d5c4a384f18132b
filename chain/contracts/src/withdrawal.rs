//! Withdrawal — lock-gated redemption of principal
//!
//! A withdrawal returns exactly the recorded principal. Profit only ever
//! leaves the pool through a distribution round.

use pool_types::ids::AccountId;
use pool_types::numeric::Amount;
use tracing::{error, info, warn};

use crate::errors::PoolError;
use crate::events::{ContractEvent, Withdrawn};
use crate::vault::{CallContext, ProfitPool};

impl ProfitPool {
    /// Redeem the caller's full principal.
    ///
    /// Checks, in order and before any mutation: custody holds at least the
    /// principal, the lock deadline has passed, the principal is non-zero.
    /// Then burns the shares, pays the principal out and zeroes the record,
    /// all under the reentrancy guard.
    pub fn withdraw(&self, ctx: &CallContext) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        let participant = ctx.caller;
        let asset = self.settlement_asset();

        let (principal, deadline) = {
            let state = self.state.borrow();
            (state.principal_of(&participant), state.lock_deadline(&participant))
        };

        let custody = self
            .collaborators
            .assets
            .balance_of(&asset, &self.address);
        if custody < principal {
            warn!(%participant, %principal, %custody, "Custody cannot cover withdrawal");
            return Err(PoolError::InsufficientCustodyFunds {
                required: principal,
                available: custody,
            });
        }

        if let Some(unlocks_at) = deadline {
            if ctx.now <= unlocks_at {
                warn!(%participant, %unlocks_at, "Withdrawal before lock expiry");
                return Err(PoolError::LockNotExpired { unlocks_at });
            }
        }

        if principal.is_zero() {
            warn!(%participant, "Withdrawal with no investment");
            return Err(PoolError::ZeroInvestment { participant });
        }

        self.state.borrow().check_debit(principal)?;

        self.collaborators.shares.burn(&participant, principal)?;

        if let Err(transfer_err) =
            self.collaborators
                .assets
                .transfer(&asset, &self.address, &participant, principal)
        {
            self.restore_burned_shares(&participant, principal);
            return Err(transfer_err.into());
        }

        let withdrawn = self.state.borrow_mut().zero(&participant)?;

        info!(
            %participant,
            amount = %withdrawn,
            pool_balance = %self.pool_balance(),
            "Withdrawal completed"
        );

        Ok(self.emit(ContractEvent::Withdrawn(Withdrawn {
            participant,
            amount: withdrawn,
        })))
    }

    fn restore_burned_shares(&self, participant: &AccountId, amount: Amount) {
        if let Err(mint_err) = self.collaborators.shares.mint(participant, amount) {
            error!(
                %participant,
                %amount,
                %mint_err,
                "Failed to restore shares after payout failure"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::interfaces::FungibleAssets;
    use crate::memory::InMemoryLedger;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pool_types::ids::AssetId;
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn after_lock() -> DateTime<Utc> {
        t0() + Duration::days(180) + Duration::seconds(1)
    }

    fn usdc() -> AssetId {
        AssetId::new("USDC")
    }

    fn setup() -> (Rc<InMemoryLedger>, ProfitPool) {
        let ledger = Rc::new(InMemoryLedger::new());
        let pool = ProfitPool::new(
            AccountId::new(),
            AccountId::new(),
            PoolConfig::default(),
            ledger.collaborators(),
        )
        .unwrap();
        (ledger, pool)
    }

    fn deposit(ledger: &InMemoryLedger, pool: &ProfitPool, who: AccountId, amount: u128) {
        ledger.credit(&usdc(), &who, Amount::new(amount));
        ledger.set_allowance(&usdc(), &who, &pool.address(), Amount::new(amount));
        pool.deposit(&CallContext::new(who, t0()), Amount::new(amount))
            .unwrap();
    }

    #[test]
    fn test_withdraw_after_lock() {
        let (ledger, pool) = setup();
        let alice = AccountId::new();
        deposit(&ledger, &pool, alice, 1_000);

        let event = pool.withdraw(&CallContext::new(alice, after_lock())).unwrap();
        assert_eq!(
            event,
            ContractEvent::Withdrawn(Withdrawn {
                participant: alice,
                amount: Amount::new(1_000),
            })
        );
        assert_eq!(ledger.balance(&usdc(), &alice), Amount::new(1_000));
        assert_eq!(ledger.shares(&alice), Amount::ZERO);
        assert_eq!(pool.pool_balance(), Amount::ZERO);
        assert_eq!(pool.record(&alice).unwrap().principal, Amount::ZERO);
    }

    #[test]
    fn test_withdraw_at_deadline_is_still_locked() {
        let (ledger, pool) = setup();
        let alice = AccountId::new();
        deposit(&ledger, &pool, alice, 1_000);

        let deadline = t0() + Duration::days(180);
        let result = pool.withdraw(&CallContext::new(alice, deadline));
        assert_eq!(result, Err(PoolError::LockNotExpired { unlocks_at: deadline }));
        assert_eq!(pool.pool_balance(), Amount::new(1_000));
        assert_eq!(ledger.shares(&alice), Amount::new(1_000));
    }

    #[test]
    fn test_withdraw_without_deposit() {
        let (_ledger, pool) = setup();
        let stranger = AccountId::new();
        let result = pool.withdraw(&CallContext::new(stranger, t0()));
        assert_eq!(
            result,
            Err(PoolError::ZeroInvestment {
                participant: stranger
            })
        );
    }

    #[test]
    fn test_second_withdraw_fails() {
        let (ledger, pool) = setup();
        let alice = AccountId::new();
        deposit(&ledger, &pool, alice, 250);

        pool.withdraw(&CallContext::new(alice, after_lock())).unwrap();
        let result = pool.withdraw(&CallContext::new(alice, after_lock()));
        assert_eq!(result, Err(PoolError::ZeroInvestment { participant: alice }));
    }

    #[test]
    fn test_withdraw_insufficient_custody() {
        let (ledger, pool) = setup();
        let alice = AccountId::new();
        deposit(&ledger, &pool, alice, 1_000);

        // Controller moved funds out of custody behind the pool's back
        ledger
            .transfer(&usdc(), &pool.address(), &AccountId::new(), Amount::new(400))
            .unwrap();

        let result = pool.withdraw(&CallContext::new(alice, after_lock()));
        assert_eq!(
            result,
            Err(PoolError::InsufficientCustodyFunds {
                required: Amount::new(1_000),
                available: Amount::new(600),
            })
        );
        assert_eq!(pool.pool_balance(), Amount::new(1_000));
    }

    #[test]
    fn test_failed_payout_restores_shares() {
        let (ledger, pool) = setup();
        let alice = AccountId::new();
        deposit(&ledger, &pool, alice, 800);
        ledger.reject_transfers_to(&alice);

        let result = pool.withdraw(&CallContext::new(alice, after_lock()));
        assert!(matches!(result, Err(PoolError::Asset(_))));
        assert_eq!(ledger.shares(&alice), Amount::new(800));
        assert_eq!(pool.record(&alice).unwrap().principal, Amount::new(800));
        assert_eq!(pool.custody_balance(), Amount::new(800));
    }
}
