use userward_core::User;

use crate::permission;
use crate::principal::Principal;

/// Capability predicate families bound to actions.
///
/// Evaluation is a pure policy check:
/// - No IO
/// - No panics
/// - No business logic beyond the access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// May the principal list/browse users at all?
    AnyReadable,
    /// May the principal create users?
    Creatable,
    /// May the principal read this target user?
    Readable,
    /// May the principal edit this target user?
    Editable,
    /// May the principal destroy this target user?
    Deletable,
    /// Trivially granted (self-service help-tip state).
    Always,
}

impl Capability {
    /// Evaluate this predicate for `principal`, optionally against a target.
    ///
    /// Target-scoped predicates evaluated without a target deny; resolving
    /// the target (and turning a missing one into NotFound) is the caller's
    /// job and happens before the gate.
    pub fn evaluate(&self, principal: &Principal, target: Option<&User>) -> bool {
        match self {
            Capability::AnyReadable => principal.can(permission::VIEW_USERS),
            Capability::Creatable => principal.can(permission::CREATE_USERS),
            Capability::Readable => {
                target.is_some_and(|t| principal.can(permission::VIEW_USERS) || t.id == principal.id)
            }
            Capability::Editable => {
                target.is_some_and(|t| principal.can(permission::EDIT_USERS) || t.id == principal.id)
            }
            Capability::Deletable => {
                target.is_some() && principal.can(permission::DESTROY_USERS)
            }
            Capability::Always => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;
    use crate::principal::DEFAULT_PER_PAGE;
    use userward_core::{RoleId, UserId};

    fn principal_with(perms: &[&'static str]) -> Principal {
        Principal::new(
            UserId::new(),
            "actor",
            perms.iter().map(|p| Permission::new(*p)),
            DEFAULT_PER_PAGE,
        )
    }

    fn someone_else() -> User {
        User::new(UserId::new(), "other", RoleId::new())
    }

    #[test]
    fn editable_grants_via_permission_or_self() {
        let actor = principal_with(&[]);
        let target = someone_else();
        assert!(!Capability::Editable.evaluate(&actor, Some(&target)));

        let own_record = User::new(actor.id, "actor", RoleId::new());
        assert!(Capability::Editable.evaluate(&actor, Some(&own_record)));

        let editor = principal_with(&[permission::EDIT_USERS]);
        assert!(Capability::Editable.evaluate(&editor, Some(&target)));
    }

    #[test]
    fn deletable_ignores_self_identity() {
        // Deletion is permission-only; the self-delete guard lives in the
        // destroy operation, not in the predicate.
        let actor = principal_with(&[]);
        let own_record = User::new(actor.id, "actor", RoleId::new());
        assert!(!Capability::Deletable.evaluate(&actor, Some(&own_record)));

        let destroyer = principal_with(&[permission::DESTROY_USERS]);
        assert!(Capability::Deletable.evaluate(&destroyer, Some(&own_record)));
    }

    #[test]
    fn target_scoped_predicates_deny_without_target() {
        let root = principal_with(&["*"]);
        assert!(!Capability::Readable.evaluate(&root, None));
        assert!(!Capability::Editable.evaluate(&root, None));
        assert!(!Capability::Deletable.evaluate(&root, None));
    }

    #[test]
    fn always_is_always_true() {
        let nobody = principal_with(&[]);
        assert!(Capability::Always.evaluate(&nobody, None));
        assert!(Capability::Always.evaluate(&nobody, Some(&someone_else())));
    }
}
