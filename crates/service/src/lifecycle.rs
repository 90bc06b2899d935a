//! User lifecycle operations: create, update, role assignment, help-tip
//! state, destroy.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use userward_access::{Action, Principal, Role, authorize};
use userward_core::{RoleId, User, UserId, ValidationErrors};
use userward_store::{StoreError, UserStore};

use crate::reply::{Confirmation, CreatedUser, ServiceError, UpdateReply};
use crate::service::UserService;

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub mail: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub description: Option<String>,
    pub per_page: Option<u32>,
}

/// Loosely-typed field map for updates, keyed by field name.
pub type UserPatch = BTreeMap<String, Value>;

impl<S: UserStore> UserService<S> {
    /// Create a new user account.
    ///
    /// Requires the creatable capability. The account's own role is created
    /// alongside it. Returns the new identity for optimistic UI.
    pub fn create(
        &self,
        principal: &Principal,
        fields: NewUser,
    ) -> Result<CreatedUser, ServiceError> {
        authorize(principal, Action::Create, None)?;

        let username = fields.username.trim().to_string();

        let mut errors = ValidationErrors::new();
        if username.is_empty() {
            errors.add("username", "cannot be blank");
        } else if !valid_username(&username) {
            errors.add(
                "username",
                "may only contain letters, digits, '.', '_' and '-'",
            );
        } else if self.store().username_exists(&username)? {
            errors.add("username", "is already taken");
        }
        if let Some(mail) = fields.mail.as_deref()
            && !valid_mail(mail)
        {
            errors.add("mail", "is invalid");
        }
        if fields.per_page == Some(0) {
            errors.add("per_page", "must be positive");
        }
        errors.into_result().map_err(ServiceError::Invalid)?;

        let own_role = Role::own_role_for(&username);
        let mut user = User::new(UserId::new(), &username, own_role.id);
        user.mail = fields.mail.map(|m| m.trim().to_lowercase());
        user.firstname = fields.firstname;
        user.lastname = fields.lastname;
        user.description = fields.description;
        user.per_page = fields.per_page;

        let stored = match self.store().insert(user) {
            Ok(stored) => stored,
            // Lost the uniqueness race between the check and the insert.
            Err(StoreError::DuplicateUsername(_)) => {
                return Err(ServiceError::Invalid(ValidationErrors::single(
                    "username",
                    "is already taken",
                )));
            }
            Err(other) => return Err(other.into()),
        };
        if let Err(err) = self.store().insert_role(own_role) {
            // Never leave a half-created account behind with a dangling
            // own-role reference.
            let _ = self.store().remove(stored.id);
            return Err(err.into());
        }

        tracing::info!(user = %stored.id, username = %stored.username(), "user created");
        Ok(CreatedUser {
            id: stored.id,
            username: stored.username().to_string(),
        })
    }

    /// Update a user's fields.
    ///
    /// Requires the editable capability on the target. The `username` key is
    /// stripped before any mutation. Validation failures come back through
    /// [`UpdateReply::Invalid`] with an Ok outcome.
    pub fn update(
        &self,
        principal: &Principal,
        id: UserId,
        patch: UserPatch,
    ) -> Result<UpdateReply, ServiceError> {
        let mut target = self.target(id)?;
        authorize(principal, Action::UpdateFields, Some(&target))?;

        // Usernames are immutable via this path regardless of payload contents.
        let mut patch = patch;
        patch.remove("username");

        let mut errors = ValidationErrors::new();
        for (key, value) in &patch {
            apply_field(&mut target, key, value, &mut errors);
        }
        if !errors.is_empty() {
            return Ok(UpdateReply::Invalid { errors });
        }
        if !patch.is_empty() {
            target.touch();
        }

        let stored = self.store().update(target)?;

        // Best-effort "show what changed": only single-field payloads get an
        // echo of the stored value.
        let changed = if patch.len() == 1 {
            patch.keys().next().and_then(|key| field_value(&stored, key))
        } else {
            None
        };
        Ok(UpdateReply::Updated { changed })
    }

    /// Replace a user's assigned roles.
    ///
    /// An absent list defaults to empty. The target's own role is appended
    /// unconditionally before applying, so it survives any caller input.
    /// Same success/failure/status contract as [`UserService::update`].
    pub fn update_roles(
        &self,
        principal: &Principal,
        id: UserId,
        role_ids: Option<Vec<RoleId>>,
    ) -> Result<UpdateReply, ServiceError> {
        let mut target = self.target(id)?;
        authorize(principal, Action::UpdateRoles, Some(&target))?;

        let requested = role_ids.unwrap_or_default();

        let mut errors = ValidationErrors::new();
        for role_id in &requested {
            if *role_id != target.own_role() && self.store().role(*role_id)?.is_none() {
                errors.add("roles", format!("unknown role {role_id}"));
            }
        }
        if !errors.is_empty() {
            return Ok(UpdateReply::Invalid { errors });
        }

        target.set_roles(requested);
        let stored = self.store().update(target)?;

        let changed = Value::Array(
            stored
                .roles()
                .iter()
                .map(|r| Value::String(r.to_string()))
                .collect(),
        );
        Ok(UpdateReply::Updated {
            changed: Some(changed),
        })
    }

    /// Re-enable every help tip for the target user.
    ///
    /// Reuses the editable predicate (no dedicated one exists). No validation
    /// path; idempotent.
    pub fn clear_help_tips(
        &self,
        principal: &Principal,
        id: UserId,
    ) -> Result<Confirmation, ServiceError> {
        let mut target = self.target(id)?;
        authorize(principal, Action::ClearHelpTips, Some(&target))?;

        let username = target.username().to_string();
        if !target.dismissed_tips().is_empty() {
            target.clear_dismissed_tips();
            self.store().update(target)?;
        }
        Ok(Confirmation::new(format!(
            "Help tips were re-enabled for user {username}"
        )))
    }

    /// Un-dismiss one help tip for the acting principal.
    ///
    /// Always permitted and always scoped to the principal's own record; any
    /// id a transport layer carried alongside the request is ignored.
    pub fn enable_help_tip(&self, principal: &Principal, key: &str) -> Result<(), ServiceError> {
        authorize(principal, Action::EnableHelpTip, None)?;

        let mut own = self.target(principal.id)?;
        if own.restore_tip(key) {
            self.store().update(own)?;
        }
        Ok(())
    }

    /// Dismiss one help tip for the acting principal.
    pub fn disable_help_tip(&self, principal: &Principal, key: &str) -> Result<(), ServiceError> {
        authorize(principal, Action::DisableHelpTip, None)?;

        let mut own = self.target(principal.id)?;
        if own.dismiss_tip(key) {
            self.store().update(own)?;
        }
        Ok(())
    }

    /// Destroy a user account. Terminal; no soft-delete state exists.
    pub fn destroy(
        &self,
        principal: &Principal,
        id: UserId,
    ) -> Result<Confirmation, ServiceError> {
        let target = self.target(id)?;
        authorize(principal, Action::Destroy, Some(&target))?;

        if target.id == principal.id {
            return Err(ServiceError::Invalid(ValidationErrors::single(
                "base",
                "cannot delete the account you are currently logged in as",
            )));
        }

        let removed = self.store().remove(target.id)?;
        tracing::info!(user = %removed.id, username = %removed.username(), "user destroyed");
        Ok(Confirmation::new(format!(
            "User {} was deleted",
            removed.username()
        )))
    }
}

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn valid_mail(mail: &str) -> bool {
    let mail = mail.trim();
    !mail.is_empty() && mail.contains('@') && !mail.contains(char::is_whitespace)
}

/// Either `Some(text)` / `None` for string/null JSON values, or `Err`-like
/// outer `None` for anything else.
fn string_or_null(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        _ => None,
    }
}

fn set_text(
    slot: &mut Option<String>,
    value: &Value,
    field: &str,
    errors: &mut ValidationErrors,
) {
    match string_or_null(value) {
        Some(v) => *slot = v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        None => errors.add(field, "must be text"),
    }
}

fn apply_field(user: &mut User, key: &str, value: &Value, errors: &mut ValidationErrors) {
    match key {
        "mail" => match string_or_null(value) {
            Some(Some(mail)) if !valid_mail(&mail) => errors.add("mail", "is invalid"),
            Some(mail) => user.mail = mail.map(|m| m.trim().to_lowercase()),
            None => errors.add("mail", "must be text"),
        },
        "firstname" => set_text(&mut user.firstname, value, "firstname", errors),
        "lastname" => set_text(&mut user.lastname, value, "lastname", errors),
        "description" => set_text(&mut user.description, value, "description", errors),
        "per_page" => match value {
            Value::Null => user.per_page = None,
            Value::Number(n) => match n.as_u64().filter(|n| (1..=u64::from(u32::MAX)).contains(n)) {
                Some(n) => user.per_page = Some(n as u32),
                None => errors.add("per_page", "must be a positive number"),
            },
            _ => errors.add("per_page", "must be a positive number"),
        },
        other => errors.add(other, "unknown field"),
    }
}

/// Stored value of one patchable field, for the single-field echo.
fn field_value(user: &User, key: &str) -> Option<Value> {
    let text = |v: &Option<String>| {
        v.as_ref()
            .map(|s| Value::String(s.clone()))
            .unwrap_or(Value::Null)
    };
    match key {
        "mail" => Some(text(&user.mail)),
        "firstname" => Some(text(&user.firstname)),
        "lastname" => Some(text(&user.lastname)),
        "description" => Some(text(&user.description)),
        "per_page" => Some(
            user.per_page
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::Null),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use userward_access::{DEFAULT_PER_PAGE, Permission, permission};
    use userward_store::InMemoryUserStore;

    fn service() -> UserService<InMemoryUserStore> {
        UserService::new(InMemoryUserStore::new())
    }

    fn admin() -> Principal {
        Principal::new(UserId::new(), "admin", [Permission::wildcard()], DEFAULT_PER_PAGE)
    }

    fn editor() -> Principal {
        Principal::new(
            UserId::new(),
            "editor",
            [Permission::new(permission::EDIT_USERS)],
            DEFAULT_PER_PAGE,
        )
    }

    fn seed(service: &UserService<InMemoryUserStore>, username: &str) -> CreatedUser {
        service
            .create(
                &admin(),
                NewUser {
                    username: username.to_string(),
                    ..NewUser::default()
                },
            )
            .unwrap()
    }

    #[test]
    fn username_is_stripped_from_update_payloads() {
        let svc = service();
        let created = seed(&svc, "original");

        let patch: UserPatch = [("username".to_string(), json!("hijacked"))].into();
        let reply = svc.update(&editor(), created.id, patch).unwrap();

        // Post-strip the payload is empty, so there is no echo either.
        assert_eq!(reply, UpdateReply::Updated { changed: None });
        let stored = svc.store().find_by_id(created.id).unwrap().unwrap();
        assert_eq!(stored.username(), "original");
    }

    #[test]
    fn single_field_update_echoes_the_stored_value() {
        let svc = service();
        let created = seed(&svc, "writer");

        let patch: UserPatch = [("description".to_string(), json!("hi"))].into();
        let reply = svc.update(&editor(), created.id, patch).unwrap();
        assert_eq!(
            reply,
            UpdateReply::Updated {
                changed: Some(json!("hi"))
            }
        );
    }

    #[test]
    fn multi_field_update_echoes_nothing() {
        let svc = service();
        let created = seed(&svc, "writer");

        let patch: UserPatch = [
            ("description".to_string(), json!("hi")),
            ("firstname".to_string(), json!("Wri")),
        ]
        .into();
        let reply = svc.update(&editor(), created.id, patch).unwrap();
        assert_eq!(reply, UpdateReply::Updated { changed: None });
    }

    #[test]
    fn unknown_fields_are_validation_errors_with_ok_outcome() {
        let svc = service();
        let created = seed(&svc, "writer");

        let patch: UserPatch = [("shoesize".to_string(), json!(9))].into();
        let reply = svc.update(&editor(), created.id, patch).unwrap();

        let UpdateReply::Invalid { errors } = reply else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.messages("shoesize"), ["unknown field".to_string()]);
    }

    #[test]
    fn field_updates_refresh_the_audit_timestamp() {
        let svc = service();
        let created = seed(&svc, "timely");
        let before = svc.store().find_by_id(created.id).unwrap().unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(2));
        let patch: UserPatch = [("description".to_string(), json!("hi"))].into();
        svc.update(&editor(), created.id, patch).unwrap();

        let after = svc.store().find_by_id(created.id).unwrap().unwrap().updated_at;
        assert!(after > before);
    }

    #[test]
    fn create_validates_username_charset() {
        let svc = service();
        let err = svc
            .create(
                &admin(),
                NewUser {
                    username: "no spaces!".to_string(),
                    ..NewUser::default()
                },
            )
            .unwrap_err();
        assert!(err.validation_errors().is_some());
    }

    #[test]
    fn update_roles_rejects_unknown_roles() {
        let svc = service();
        let created = seed(&svc, "rolled");

        let reply = svc
            .update_roles(&editor(), created.id, Some(vec![RoleId::new()]))
            .unwrap();
        assert!(matches!(reply, UpdateReply::Invalid { .. }));

        // The target keeps its previous role set.
        let stored = svc.store().find_by_id(created.id).unwrap().unwrap();
        assert_eq!(stored.roles(), [stored.own_role()]);
    }
}
