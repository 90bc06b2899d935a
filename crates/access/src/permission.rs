use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permissions this subsystem gates on.
pub const VIEW_USERS: &str = "users.view";
pub const CREATE_USERS: &str = "users.create";
pub const EDIT_USERS: &str = "users.edit";
pub const DESTROY_USERS: &str = "users.destroy";

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. `"users.edit"`). A special
/// wildcard permission `"*"` can be used by policy layers to indicate
/// "allow all" without hardcoding domain permissions into role definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The allow-all wildcard.
    pub fn wildcard() -> Self {
        Self::new("*")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
