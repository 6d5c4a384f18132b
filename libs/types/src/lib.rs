//! Types library for the profit-sharing pool
//!
//! Shared vocabulary between the pool core and the external collaborators it
//! calls into (asset custody, share ledger, exchange router).
//!
//! # Modules
//! - `ids`: Identifiers (AccountId, AssetId)
//! - `numeric`: Integer base-unit amounts
//! - `errors`: Collaborator error taxonomy

pub mod ids;
pub mod numeric;
pub mod errors;

pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
