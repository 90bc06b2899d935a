use userward_access::{Action, DEFAULT_PER_PAGE, Principal, authorize};
use userward_core::{User, UserId};
use userward_store::UserStore;

use crate::reply::{ServiceError, UserTemplate, UserView};

/// Capability-gated user management facade.
///
/// Every operation takes the acting [`Principal`] explicitly; there is no
/// ambient "current user". Within one call, target resolution, the gate
/// check, and the mutation run sequentially against the store, and stale
/// writes surface as conflicts through the store's version check.
pub struct UserService<S> {
    store: S,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the acting principal from its stored account.
    ///
    /// Effective permissions are the union over the account's assigned roles.
    /// Resolution is per request; verdicts and permission sets are never
    /// cached across requests.
    pub fn principal(&self, id: UserId) -> Result<Principal, ServiceError> {
        let user = self.target(id)?;

        let mut permissions = Vec::new();
        for role_id in user.roles() {
            if let Some(role) = self.store.role(*role_id)? {
                permissions.extend(role.permissions.iter().cloned());
            }
        }

        Ok(Principal::new(
            user.id,
            user.username().to_string(),
            permissions,
            user.per_page.unwrap_or(DEFAULT_PER_PAGE),
        ))
    }

    /// Empty form template for the "new user" view.
    pub fn new_template(&self, principal: &Principal) -> Result<UserTemplate, ServiceError> {
        authorize(principal, Action::NewForm, None)?;
        Ok(UserTemplate::default())
    }

    /// Current state of a user, for the edit form.
    pub fn show(&self, principal: &Principal, id: UserId) -> Result<UserView, ServiceError> {
        let target = self.target(id)?;
        authorize(principal, Action::EditForm, Some(&target))?;
        Ok(UserView::from(&target))
    }

    /// Load a target user; a missing id is NotFound, distinct from a denial.
    pub(crate) fn target(&self, id: UserId) -> Result<User, ServiceError> {
        self.store.find_by_id(id)?.ok_or(ServiceError::NotFound)
    }
}
