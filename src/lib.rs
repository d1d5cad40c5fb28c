//! tesoro Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod domain;
pub mod events;
pub mod handlers;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, CallerIdentity, DomainError, EntryStatus, MovementKind};
pub use error::{AppError, AppResult};
