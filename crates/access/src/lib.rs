//! `userward-access` — pure authorization boundary for user management.
//!
//! This crate is intentionally decoupled from storage and transport: callers
//! resolve a [`Principal`] however they like (store-backed, token-backed) and
//! every gate check takes it as an explicit argument.

pub mod capability;
pub mod gate;
pub mod permission;
pub mod principal;
pub mod role;

pub use capability::Capability;
pub use gate::{AccessError, Action, authorize};
pub use permission::Permission;
pub use principal::{DEFAULT_PER_PAGE, Principal};
pub use role::Role;
