use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in a credential.
///
/// Roles are opaque strings at this layer. Exactly one role (by default
/// `ADMIN`) is configured as the universal override; every other role is
/// judged purely on its permission set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));
    pub const TA: Role = Role(Cow::Borrowed("TA"));
    pub const GUEST: Role = Role(Cow::Borrowed("GUEST"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::GUEST
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
