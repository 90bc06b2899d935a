use serde::{Deserialize, Serialize};

use userward_core::RoleId;

use crate::permission::Permission;

/// A named grant of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            permissions,
        }
    }

    /// The per-user "own role", auto-created at account creation.
    ///
    /// It carries no permissions of its own; it exists so user-scoped grants
    /// have a stable anchor, and it must stay assigned to its user forever.
    pub fn own_role_for(username: &str) -> Self {
        Self::new(format!("own:{username}"), Vec::new())
    }
}
