use std::collections::HashSet;

use userward_core::UserId;

use crate::permission::Permission;

/// Page size used when a user has no listing preference of their own.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage: the caller unions the permissions
/// granted by the principal's assigned roles and passes the result in. The
/// principal is re-resolved per request, never cached across requests, since
/// role assignments can change between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    /// Listing page-size preference for this principal.
    pub per_page: u32,
    permissions: HashSet<Permission>,
}

impl Principal {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        per_page: u32,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            per_page,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Whether this principal holds `permission` (or the wildcard).
    pub fn can(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.is_wildcard() || p.as_str() == permission)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }
}
