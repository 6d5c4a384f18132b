//! Pooled-Capital Profit-Sharing Vault
//!
//! Participants deposit a settlement asset, receive pool shares one-to-one,
//! and may redeem their principal once a lock period has elapsed. A
//! controller periodically splits the pool's gains over the outstanding
//! principal, taking a percentage fee, and may move treasury assets.
//!
//! # Modules
//! - `errors`: Pool and configuration error types
//! - `events`: Events emitted by successful state-changing operations
//! - `security`: Reentrancy guard and controller access gate
//! - `config`: Pool configuration and distribution policy
//! - `interfaces`: Collaborator traits (asset custody, shares, native value, router)
//! - `registry`: Per-participant principal records and lock deadlines
//! - `vault`: Pool state, deposits and read-only views
//! - `withdrawal`: Lock-gated principal redemption
//! - `distribution`: Profit planning and payout rounds
//! - `treasury`: Controller-only swaps and raw transfers
//! - `memory`: In-memory collaborators for tests and simulations

pub mod config;
pub mod distribution;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod memory;
pub mod registry;
pub mod security;
pub mod treasury;
pub mod vault;
pub mod withdrawal;

pub use config::{DistributionPolicy, PoolConfig};
pub use errors::{ConfigError, PoolError};
pub use vault::{CallContext, PoolSnapshot, ProfitPool};

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
