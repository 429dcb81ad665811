use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AccessError, Permission, Role, SubjectId};

/// Decoded credential payload.
///
/// Only produced by a [`CredentialCodec`](crate::CredentialCodec) after the
/// token's integrity check passed; there is no partially trusted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireClaims")]
pub struct Claims {
    /// Subject / user identifier (`sub`, or `userId` as issued by the app backend).
    #[serde(rename = "sub")]
    pub subject: SubjectId,

    /// Role of the caller. A token without a role is treated as a guest.
    pub role: Role,

    /// Granted capabilities; absent in the token means none.
    pub permissions: BTreeSet<Permission>,

    /// Expiration as unix seconds. `None` means the token never expires.
    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload as issuers actually emit it: `sub` and/or `userId`, nullable
/// role and permissions.
#[derive(Deserialize)]
struct WireClaims {
    #[serde(default)]
    sub: Option<SubjectId>,
    #[serde(default, rename = "userId")]
    user_id: Option<SubjectId>,
    #[serde(default, deserialize_with = "null_as_default")]
    role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    permissions: BTreeSet<Permission>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    email: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<WireClaims> for Claims {
    type Error = String;

    /// `sub` wins when both subject claims are present.
    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let subject = wire
            .sub
            .or(wire.user_id)
            .ok_or_else(|| "missing subject claim (`sub` or `userId`)".to_string())?;
        Ok(Self {
            subject,
            role: wire.role,
            permissions: wire.permissions,
            expires_at: wire.exp,
            issued_at: wire.iat,
            email: wire.email,
        })
    }
}

impl Claims {
    pub fn new(subject: impl Into<SubjectId>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
            permissions: BTreeSet::new(),
            expires_at: None,
            issued_at: None,
            email: None,
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at.timestamp());
        self
    }

    /// Strictly past: a token expiring in the current second is still valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now.timestamp())
    }

    pub fn has_any(&self, required: &BTreeSet<Permission>) -> bool {
        !self.permissions.is_disjoint(required)
    }
}

/// Deterministic expiry check over already-verified claims.
///
/// This runs in addition to whatever expiry handling the codec performs, so
/// the outcome never depends on codec leeway or its clock.
pub fn check_expiry(claims: &Claims, now: DateTime<Utc>) -> Result<(), AccessError> {
    if claims.is_expired(now) {
        return Err(AccessError::ExpiredCredential);
    }
    Ok(())
}
