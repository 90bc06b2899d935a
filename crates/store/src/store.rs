use std::sync::Arc;

use thiserror::Error;

use userward_access::{Principal, Role};
use userward_core::{RoleId, User, UserId};

use crate::query::SearchQuery;

/// Store operation error.
///
/// These are infrastructure/consistency failures, as opposed to domain
/// validation errors. The service layer catches them at its boundary and
/// converts them into the structured error contract; they never reach a
/// caller raw.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("stale write: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// CRUD-capable user store.
///
/// - Each call is an independent, internally consistent unit of work; the
///   store provides its own locking.
/// - `update` performs an optimistic version check so a check-then-mutate
///   sequence racing a concurrent write surfaces a [`StoreError::Conflict`]
///   instead of silently half-applying.
/// - `search` pushes the principal's read visibility into the query:
///   principals without the view permission only see their own record.
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Users visible to `principal` and matching `query`, username-ordered.
    fn search(&self, principal: &Principal, query: &SearchQuery) -> Result<Vec<User>, StoreError>;

    /// Persist a new user; enforces username uniqueness.
    fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Persist changes to an existing user (optimistic version check).
    fn update(&self, user: User) -> Result<User, StoreError>;

    /// Remove a user, returning the removed record.
    fn remove(&self, id: UserId) -> Result<User, StoreError>;

    fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    fn insert_role(&self, role: Role) -> Result<(), StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id)
    }

    fn search(&self, principal: &Principal, query: &SearchQuery) -> Result<Vec<User>, StoreError> {
        (**self).search(principal, query)
    }

    fn insert(&self, user: User) -> Result<User, StoreError> {
        (**self).insert(user)
    }

    fn update(&self, user: User) -> Result<User, StoreError> {
        (**self).update(user)
    }

    fn remove(&self, id: UserId) -> Result<User, StoreError> {
        (**self).remove(id)
    }

    fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        (**self).username_exists(username)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        (**self).role(id)
    }

    fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        (**self).insert_role(role)
    }
}
