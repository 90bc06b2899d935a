//! User account record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{RoleId, UserId};

/// A stored user account.
///
/// # Invariants
/// - `username` is immutable after creation (no mutator exists for it).
/// - `roles` always contains `own_role`; [`User::set_roles`] re-appends it
///   regardless of the input, so no role update can strip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    username: String,
    pub mail: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub description: Option<String>,
    /// Listing page-size preference for this user.
    pub per_page: Option<u32>,
    roles: Vec<RoleId>,
    own_role: RoleId,
    dismissed_tips: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every committed write (optimistic concurrency).
    pub version: u64,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, own_role: RoleId) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            mail: None,
            firstname: None,
            lastname: None,
            description: None,
            per_page: None,
            roles: vec![own_role],
            own_role,
            dismissed_tips: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[RoleId] {
        &self.roles
    }

    pub fn own_role(&self) -> RoleId {
        self.own_role
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }

    /// Replace the assigned role set.
    ///
    /// The own role is appended unconditionally and duplicates are dropped,
    /// so the result always contains `own_role` exactly once.
    pub fn set_roles(&mut self, role_ids: Vec<RoleId>) {
        let mut roles = role_ids;
        roles.push(self.own_role);

        let mut seen = BTreeSet::new();
        roles.retain(|id| seen.insert(*id));

        self.roles = roles;
        self.touch();
    }

    pub fn dismissed_tips(&self) -> &BTreeSet<String> {
        &self.dismissed_tips
    }

    /// Mark a help tip as dismissed. Returns `false` if it already was.
    pub fn dismiss_tip(&mut self, key: impl Into<String>) -> bool {
        let changed = self.dismissed_tips.insert(key.into());
        if changed {
            self.touch();
        }
        changed
    }

    /// Un-dismiss a help tip. Returns `false` if it was not dismissed.
    pub fn restore_tip(&mut self, key: &str) -> bool {
        let changed = self.dismissed_tips.remove(key);
        if changed {
            self.touch();
        }
        changed
    }

    /// Re-enable every help tip for this user. Idempotent.
    pub fn clear_dismissed_tips(&mut self) {
        if !self.dismissed_tips.is_empty() {
            self.dismissed_tips.clear();
            self.touch();
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
