//! Domain types
//!
//! Validated primitives and business rules shared across the crate.

pub mod amount;
pub mod caller;
pub mod error;
pub mod movement;

pub use amount::{Amount, AmountError};
pub use caller::CallerIdentity;
pub use error::DomainError;
pub use movement::{EntryStatus, MovementKind};
