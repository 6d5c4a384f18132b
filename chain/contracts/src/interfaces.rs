//! Capability contracts for the pool's external collaborators
//!
//! The pool never implements asset mechanics. It reaches the settlement-asset
//! custody, the share ledger, native-value transfer and exchange routers only
//! through these traits. Methods take `&self`: a collaborator is an external
//! party, and it may call back into the pool while a call is in flight.

use std::fmt;
use std::rc::Rc;

use pool_types::errors::AssetError;
use pool_types::ids::{AccountId, AssetId};
use pool_types::numeric::Amount;

/// Multi-asset fungible ledger (custody gateway).
pub trait FungibleAssets {
    fn balance_of(&self, asset: &AssetId, owner: &AccountId) -> Amount;

    fn allowance(&self, asset: &AssetId, owner: &AccountId, spender: &AccountId) -> Amount;

    fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError>;

    /// Pay every `(to, amount)` leg out of `from`, in order.
    ///
    /// All-or-nothing: every leg is validated before any balance moves, and
    /// an error leaves all balances untouched.
    fn transfer_batch(
        &self,
        asset: &AssetId,
        from: &AccountId,
        legs: &[(AccountId, Amount)],
    ) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &self,
        asset: &AssetId,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError>;

    fn approve(
        &self,
        asset: &AssetId,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError>;
}

/// Pool share ledger. Shares are minted and burned only by the pool.
pub trait ShareLedger {
    fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), AssetError>;

    fn burn(&self, from: &AccountId, amount: Amount) -> Result<(), AssetError>;

    fn total_supply(&self) -> Amount;

    fn shares_of(&self, owner: &AccountId) -> Amount;
}

/// Native-value (gas token) transfers.
pub trait NativeTransfer {
    fn transfer_native(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError>;
}

/// Exchange router with a fixed-input swap.
pub trait ExchangeRouter {
    /// Identity the router spends allowances as.
    fn address(&self) -> AccountId;

    /// Swap exactly `amount_in` of `from` held by `payer` for at least
    /// `min_amount_out` of `to`, delivered to `recipient`. The router pulls
    /// the input through the payer's allowance and fails the whole swap when
    /// the output would fall short.
    fn swap_exact_input(
        &self,
        payer: &AccountId,
        from: &AssetId,
        amount_in: Amount,
        to: &AssetId,
        min_amount_out: Amount,
        recipient: &AccountId,
    ) -> Result<Amount, AssetError>;
}

/// Handles to every collaborator the pool calls on its own behalf.
#[derive(Clone)]
pub struct Collaborators {
    pub assets: Rc<dyn FungibleAssets>,
    pub shares: Rc<dyn ShareLedger>,
    pub native: Rc<dyn NativeTransfer>,
}

impl Collaborators {
    pub fn new(
        assets: Rc<dyn FungibleAssets>,
        shares: Rc<dyn ShareLedger>,
        native: Rc<dyn NativeTransfer>,
    ) -> Self {
        Self {
            assets,
            shares,
            native,
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
