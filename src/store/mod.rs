//! Persistence layer
//!
//! Tenant-scoped stores over PostgreSQL. Balance-mutating operations take the
//! caller's transaction so they participate in the movement unit of work;
//! plain reads for the HTTP shell go through the pool.

pub mod accounts;
pub mod entries;
pub mod profiles;
pub mod tenants;

pub use accounts::{Account, AccountStore, CreateAccount};
pub use entries::{LedgerEntry, LedgerEntryStore, NewLedgerEntry};
pub use profiles::{CreateProfile, Profile, ProfileStore};
pub use tenants::{Tenant, TenantStore};
