//! Response payloads handed to the render step, and the service error model.

use serde::Serialize;
use thiserror::Error;

use userward_access::AccessError;
use userward_core::{RoleId, User, UserId, ValidationErrors};
use userward_store::StoreError;

/// Request outcome code, the HTTP-status equivalent of this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    ClientError,
    NotFound,
}

/// Terminal request failure.
///
/// Store failures are wrapped here so the underlying error never reaches a
/// caller raw; the display string is the generic client-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Denied(#[from] AccessError),

    #[error("user not found")]
    NotFound,

    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("the operation could not be completed")]
    Store(StoreError),
}

impl ServiceError {
    pub fn outcome(&self) -> Outcome {
        match self {
            ServiceError::NotFound => Outcome::NotFound,
            ServiceError::Denied(_) | ServiceError::Invalid(_) | ServiceError::Store(_) => {
                Outcome::ClientError
            }
        }
    }

    /// Field-keyed errors, when this failure carries them.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // A target that vanished mid-request (e.g. concurrent destroy)
            // surfaces as NotFound, not as a backend failure.
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}

/// Identity fragment returned by a successful create, for optimistic UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
    pub username: String,
}

/// Free-text confirmation for destructive/reset operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Full user view for form rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub mail: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub description: Option<String>,
    pub role_ids: Vec<RoleId>,
    pub dismissed_tips: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username().to_string(),
            mail: user.mail.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            description: user.description.clone(),
            role_ids: user.roles().to_vec(),
            dismissed_tips: user.dismissed_tips().iter().cloned().collect(),
        }
    }
}

/// Empty form template for the "new user" view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTemplate {
    pub username: String,
    pub mail: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub description: Option<String>,
}

/// One listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub mail: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username().to_string(),
            display_name: user.display_name(),
            mail: user.mail.clone(),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListPage {
    pub users: Vec<UserSummary>,
    /// Total matches before pagination.
    pub total: usize,
    /// Non-fatal notice (e.g. the malformed-search fallback); rendered
    /// inline, never as an error page.
    pub warning: Option<String>,
}

/// Result of update/update_roles.
///
/// Validation failures here are part of the *success* channel: the UI depends
/// on receiving them with an Ok outcome for in-place error rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UpdateReply {
    /// The write committed. `changed` echoes the stored value of the single
    /// patched field when the payload held exactly one key, else nothing.
    Updated { changed: Option<serde_json::Value> },
    /// The write was rejected by validation.
    Invalid { errors: ValidationErrors },
}

impl UpdateReply {
    pub fn outcome(&self) -> Outcome {
        Outcome::Ok
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateReply::Updated { .. })
    }
}
