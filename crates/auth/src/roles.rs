use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role (authority) string granted to a user.
///
/// Roles are opaque strings at this layer; the server decides which exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Administrators manage categories, carousels and other admins.
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
