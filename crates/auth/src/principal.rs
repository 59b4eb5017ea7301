use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appealwall_core::UserId;

use crate::Role;

/// A user record as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name to show in the UI; falls back to the login uid.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.uid)
    }
}

/// One entry of the server's authority list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub authority: String,
}

/// Response body of `GET user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrincipal {
    pub user: User,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub authorities: Vec<Authority>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub credentials_non_expired: bool,
    #[serde(default = "default_true")]
    pub account_non_expired: bool,
    #[serde(default = "default_true")]
    pub account_non_locked: bool,
}

fn default_true() -> bool {
    true
}

/// The authenticated user plus the flattened set of roles they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: User,
    pub roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(user: User, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

impl From<UserPrincipal> for Principal {
    fn from(value: UserPrincipal) -> Self {
        let roles = value
            .authorities
            .into_iter()
            .map(|a| Role::from(a.authority));
        Self::new(value.user, roles)
    }
}
