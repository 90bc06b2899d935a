use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use userward_access::{Principal, Role, permission};
use userward_core::{RoleId, User, UserId};

use crate::query::SearchQuery;
use crate::store::{StoreError, UserStore};

/// In-memory user store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
    roles: RwLock<HashMap<RoleId, Role>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_users(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, User>>, StoreError> {
        self.users
            .read()
            .map_err(|_| StoreError::Backend("user table lock poisoned".to_string()))
    }

    fn write_users(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, User>>, StoreError> {
        self.users
            .write()
            .map_err(|_| StoreError::Backend("user table lock poisoned".to_string()))
    }

    fn read_roles(&self) -> Result<RwLockReadGuard<'_, HashMap<RoleId, Role>>, StoreError> {
        self.roles
            .read()
            .map_err(|_| StoreError::Backend("role table lock poisoned".to_string()))
    }

    fn write_roles(&self) -> Result<RwLockWriteGuard<'_, HashMap<RoleId, Role>>, StoreError> {
        self.roles
            .write()
            .map_err(|_| StoreError::Backend("role table lock poisoned".to_string()))
    }
}

fn same_username(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl UserStore for InMemoryUserStore {
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read_users()?.get(&id).cloned())
    }

    fn search(&self, principal: &Principal, query: &SearchQuery) -> Result<Vec<User>, StoreError> {
        let users = self.read_users()?;
        let can_view = principal.can(permission::VIEW_USERS);

        let mut visible: Vec<User> = users
            .values()
            .filter(|u| can_view || u.id == principal.id)
            .filter(|u| query.matches(u))
            .cloned()
            .collect();

        visible.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(visible)
    }

    fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.write_users()?;

        if users
            .values()
            .any(|u| same_username(u.username(), user.username()))
        {
            return Err(StoreError::DuplicateUsername(user.username().to_string()));
        }

        let mut stored = user;
        stored.version = 1;
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.write_users()?;

        let current = users.get(&user.id).ok_or(StoreError::NotFound)?;
        if current.version != user.version {
            return Err(StoreError::Conflict(format!(
                "expected version {}, found {}",
                user.version, current.version
            )));
        }

        let mut stored = user;
        stored.version += 1;
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn remove(&self, id: UserId) -> Result<User, StoreError> {
        let removed = self.write_users()?.remove(&id).ok_or(StoreError::NotFound)?;

        // The own role exists for this user alone; drop it with the user.
        self.write_roles()?.remove(&removed.own_role());
        Ok(removed)
    }

    fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self
            .read_users()?
            .values()
            .any(|u| same_username(u.username(), username)))
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.read_roles()?.get(&id).cloned())
    }

    fn insert_role(&self, role: Role) -> Result<(), StoreError> {
        self.write_roles()?.insert(role.id, role);
        Ok(())
    }
}
