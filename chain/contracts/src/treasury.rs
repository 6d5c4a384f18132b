//! Treasury — controller-only asset movement outside pool accounting
//!
//! None of these operations touch the participant registry or the pool
//! balance. Raw transfers can leave custody below the pool balance; that is
//! the controller's responsibility.

use pool_types::ids::{AccountId, AssetId};
use pool_types::numeric::Amount;
use tracing::{debug, error, info, warn};

use crate::config::lock_duration;
use crate::errors::PoolError;
use crate::events::{
    AssetTransferred, ContractEvent, LockDurationUpdated, NativeReceived, NativeTransferred,
    Swapped,
};
use crate::interfaces::ExchangeRouter;
use crate::vault::{CallContext, ProfitPool};

impl ProfitPool {
    /// Swap `amount_in` of `from_asset` held in custody for `to_asset`
    /// through `router`, receiving the output into custody.
    ///
    /// Both assets must be on the allow-list. Slippage is enforced by the
    /// router against `min_amount_out`.
    pub fn swap_via_router(
        &self,
        ctx: &CallContext,
        router: &dyn ExchangeRouter,
        from_asset: &AssetId,
        amount_in: Amount,
        to_asset: &AssetId,
        min_amount_out: Amount,
    ) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        self.access_control.ensure_controller(&ctx.caller)?;

        for asset in [from_asset, to_asset] {
            if !self.is_allowed_asset(asset) {
                return Err(PoolError::AssetNotAllowed {
                    asset: asset.clone(),
                });
            }
        }

        let router_address = router.address();
        self.collaborators
            .assets
            .approve(from_asset, &self.address, &router_address, amount_in)?;
        let amount_out = match router.swap_exact_input(
            &self.address,
            from_asset,
            amount_in,
            to_asset,
            min_amount_out,
            &self.address,
        ) {
            Ok(amount_out) => amount_out,
            Err(swap_err) => {
                self.revoke_router_approval(from_asset, &router_address);
                warn!(router = %router_address, %from_asset, %swap_err, "Swap failed");
                return Err(swap_err.into());
            }
        };

        info!(
            router = %router_address,
            %from_asset,
            %amount_in,
            %to_asset,
            %amount_out,
            "Swap executed"
        );

        Ok(self.emit(ContractEvent::Swapped(Swapped {
            router: router_address,
            from_asset: from_asset.clone(),
            amount_in,
            to_asset: to_asset.clone(),
            amount_out,
        })))
    }

    fn revoke_router_approval(&self, asset: &AssetId, router: &AccountId) {
        if let Err(approve_err) =
            self.collaborators
                .assets
                .approve(asset, &self.address, router, Amount::ZERO)
        {
            error!(
                %router,
                %asset,
                %approve_err,
                "Failed to revoke router approval after failed swap"
            );
        }
    }

    /// Move custodied `asset` to `to` unconditionally.
    pub fn raw_asset_transfer(
        &self,
        ctx: &CallContext,
        asset: &AssetId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        self.access_control.ensure_controller(&ctx.caller)?;

        self.collaborators
            .assets
            .transfer(asset, &self.address, to, amount)?;

        info!(%asset, %to, %amount, "Raw asset transfer");
        Ok(self.emit(ContractEvent::AssetTransferred(AssetTransferred {
            asset: asset.clone(),
            to: *to,
            amount,
        })))
    }

    /// Move native value held by the pool to `to` unconditionally.
    pub fn raw_native_transfer(
        &self,
        ctx: &CallContext,
        to: &AccountId,
        amount: Amount,
    ) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        self.access_control.ensure_controller(&ctx.caller)?;

        self.collaborators
            .native
            .transfer_native(&self.address, to, amount)?;

        info!(%to, %amount, "Raw native transfer");
        Ok(self.emit(ContractEvent::NativeTransferred(NativeTransferred {
            to: *to,
            amount,
        })))
    }

    /// Accept incidental native value. No accounting happens.
    pub fn receive_native(&self, ctx: &CallContext, amount: Amount) -> ContractEvent {
        debug!(from = %ctx.caller, %amount, "Native value received");
        self.emit(ContractEvent::NativeReceived(NativeReceived {
            from: ctx.caller,
            amount,
        }))
    }

    /// Change the lock period applied by future deposits. Existing
    /// deadlines are unchanged.
    pub fn set_lock_duration_days(
        &self,
        ctx: &CallContext,
        days: i64,
    ) -> Result<ContractEvent, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        self.access_control.ensure_controller(&ctx.caller)?;
        lock_duration(days)?;

        let previous_days = {
            let mut config = self.config.borrow_mut();
            std::mem::replace(&mut config.lock_duration_days, days)
        };

        info!(previous_days, lock_duration_days = days, "Lock duration updated");
        Ok(self.emit(ContractEvent::LockDurationUpdated(LockDurationUpdated {
            previous_days,
            lock_duration_days: days,
        })))
    }
}
