//! Authorization gate: a fixed action-to-predicate table.
//!
//! Every request goes through [`authorize`] before the corresponding
//! operation runs. The gate is stateless and re-evaluated per request; a
//! verdict is never cached, since capabilities can change between requests
//! (e.g. role reassignment).

use serde::Serialize;
use thiserror::Error;

use userward_core::User;

use crate::capability::Capability;
use crate::principal::Principal;

/// The closed set of actions this subsystem exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    ItemPage,
    NewForm,
    Create,
    EditForm,
    UpdateFields,
    UpdateRoles,
    ClearHelpTips,
    EnableHelpTip,
    DisableHelpTip,
    Destroy,
}

impl Action {
    /// The capability predicate bound to this action.
    ///
    /// This is a fixed table over a closed enum, not open-ended dispatch:
    /// adding an action without deciding its predicate does not compile.
    pub fn capability(self) -> Capability {
        match self {
            Action::List | Action::ItemPage => Capability::AnyReadable,
            Action::NewForm | Action::Create => Capability::Creatable,
            Action::EditForm => Capability::Readable,
            Action::UpdateFields | Action::UpdateRoles | Action::ClearHelpTips => {
                Capability::Editable
            }
            Action::EnableHelpTip | Action::DisableHelpTip => Capability::Always,
            Action::Destroy => Capability::Deletable,
        }
    }

    /// Whether the action operates on a resolved target user.
    pub fn requires_target(self) -> bool {
        matches!(
            self,
            Action::EditForm
                | Action::UpdateFields
                | Action::UpdateRoles
                | Action::ClearHelpTips
                | Action::Destroy
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::ItemPage => "item_page",
            Action::NewForm => "new_form",
            Action::Create => "create",
            Action::EditForm => "edit_form",
            Action::UpdateFields => "update_fields",
            Action::UpdateRoles => "update_roles",
            Action::ClearHelpTips => "clear_help_tips",
            Action::EnableHelpTip => "enable_help_tip",
            Action::DisableHelpTip => "disable_help_tip",
            Action::Destroy => "destroy",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("access denied for '{0}'")]
    Denied(Action),
}

/// Authorize `action` for `principal`, optionally against a resolved target.
///
/// A denial must prevent the operation from running and mutates nothing.
/// Target resolution happens before this call; a missing target is the
/// caller's NotFound, distinct from a denial here.
pub fn authorize(
    principal: &Principal,
    action: Action,
    target: Option<&User>,
) -> Result<(), AccessError> {
    if action.capability().evaluate(principal, target) {
        Ok(())
    } else {
        tracing::debug!(actor = %principal.id, %action, "authorization denied");
        Err(AccessError::Denied(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{self, Permission};
    use crate::principal::DEFAULT_PER_PAGE;
    use userward_core::{RoleId, UserId};

    const ALL_ACTIONS: [Action; 11] = [
        Action::List,
        Action::ItemPage,
        Action::NewForm,
        Action::Create,
        Action::EditForm,
        Action::UpdateFields,
        Action::UpdateRoles,
        Action::ClearHelpTips,
        Action::EnableHelpTip,
        Action::DisableHelpTip,
        Action::Destroy,
    ];

    fn principal_with(perms: &[&'static str]) -> Principal {
        Principal::new(
            UserId::new(),
            "actor",
            perms.iter().map(|p| Permission::new(*p)),
            DEFAULT_PER_PAGE,
        )
    }

    #[test]
    fn wildcard_principal_passes_every_action_with_target() {
        let root = principal_with(&["*"]);
        let target = User::new(UserId::new(), "target", RoleId::new());
        for action in ALL_ACTIONS {
            assert!(
                authorize(&root, action, Some(&target)).is_ok(),
                "{action} unexpectedly denied"
            );
        }
    }

    #[test]
    fn unprivileged_principal_only_passes_tip_toggles() {
        let nobody = principal_with(&[]);
        let target = User::new(UserId::new(), "target", RoleId::new());
        for action in ALL_ACTIONS {
            let verdict = authorize(&nobody, action, Some(&target));
            match action {
                Action::EnableHelpTip | Action::DisableHelpTip => {
                    assert!(verdict.is_ok(), "{action} unexpectedly denied")
                }
                _ => assert_eq!(verdict, Err(AccessError::Denied(action))),
            }
        }
    }

    #[test]
    fn table_is_stable() {
        assert_eq!(Action::List.capability(), Capability::AnyReadable);
        assert_eq!(Action::ItemPage.capability(), Capability::AnyReadable);
        assert_eq!(Action::NewForm.capability(), Capability::Creatable);
        assert_eq!(Action::Create.capability(), Capability::Creatable);
        assert_eq!(Action::EditForm.capability(), Capability::Readable);
        assert_eq!(Action::UpdateFields.capability(), Capability::Editable);
        assert_eq!(Action::UpdateRoles.capability(), Capability::Editable);
        // Clearing help tips deliberately reuses the edit predicate.
        assert_eq!(Action::ClearHelpTips.capability(), Capability::Editable);
        assert_eq!(Action::EnableHelpTip.capability(), Capability::Always);
        assert_eq!(Action::DisableHelpTip.capability(), Capability::Always);
        assert_eq!(Action::Destroy.capability(), Capability::Deletable);
    }

    #[test]
    fn verdict_follows_current_permissions() {
        // The gate holds no state: the same action re-evaluated with a
        // re-resolved principal reflects the new permission set.
        let target = User::new(UserId::new(), "target", RoleId::new());

        let before = principal_with(&[]);
        assert!(authorize(&before, Action::UpdateFields, Some(&target)).is_err());

        let after = Principal::new(
            before.id,
            "actor",
            [Permission::new(permission::EDIT_USERS)],
            DEFAULT_PER_PAGE,
        );
        assert!(authorize(&after, Action::UpdateFields, Some(&target)).is_ok());
    }
}
