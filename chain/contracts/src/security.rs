//! Security primitives shared by every pool entry point
//!
//! Provides the pool-wide reentrancy guard and the single-controller
//! access gate.

use std::cell::Cell;

use pool_types::ids::AccountId;
use tracing::warn;

use crate::errors::PoolError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A pool operation acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
/// The flag lives in a `Cell` so that a collaborator calling back into the
/// pool through a shared reference observes it.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: Cell::new(false),
        }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&self) -> bool {
        if self.locked.get() {
            return false;
        }
        self.locked.set(true);
        true
    }

    /// Release the guard.
    pub fn release(&self) {
        self.locked.set(false);
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Acquire the guard for the lifetime of the returned scope.
    ///
    /// The guard is released when the scope drops, on success and error
    /// paths alike.
    pub fn enter(&self) -> Result<GuardScope<'_>, PoolError> {
        if !self.acquire() {
            warn!("Reentrant call rejected");
            return Err(PoolError::ReentrancyDetected);
        }
        Ok(GuardScope { guard: self })
    }
}

/// Held while a guarded operation is in flight.
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Single-controller access gate.
///
/// The controller is fixed at construction; there is no transfer path.
#[derive(Debug, Clone)]
pub struct AccessControl {
    controller: AccountId,
}

impl AccessControl {
    pub fn new(controller: AccountId) -> Self {
        Self { controller }
    }

    pub fn is_controller(&self, caller: &AccountId) -> bool {
        *caller == self.controller
    }

    /// Fail with `Unauthorized` unless `caller` is the controller.
    pub fn ensure_controller(&self, caller: &AccountId) -> Result<(), PoolError> {
        if !self.is_controller(caller) {
            warn!(%caller, "Privileged call from non-controller rejected");
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    pub fn controller(&self) -> AccountId {
        self.controller
    }
}
