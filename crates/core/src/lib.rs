//! `userward-core` — shared domain model for the user-management subsystem.
//!
//! This crate is intentionally decoupled from authorization and storage.

pub mod error;
pub mod id;
pub mod user;

pub use error::{DomainError, ValidationErrors};
pub use id::{RoleId, UserId};
pub use user::User;
