use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Capability identifier carried in a credential and required by route rules.
///
/// Capabilities are opaque strings (e.g. "CREATE_PAYMENT"). Matching is exact
/// and case-sensitive; there is no wildcard at this layer, universal access is
/// expressed through the admin role instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const CREATE_USER: Permission = Permission(Cow::Borrowed("CREATE_USER"));
    pub const CREATE_STUDENT: Permission = Permission(Cow::Borrowed("CREATE_STUDENT"));
    pub const CREATE_CLASS: Permission = Permission(Cow::Borrowed("CREATE_CLASS"));
    pub const CREATE_ATTENDANCE: Permission = Permission(Cow::Borrowed("CREATE_ATTENDANCE"));
    pub const CREATE_PAYMENT: Permission = Permission(Cow::Borrowed("CREATE_PAYMENT"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}
