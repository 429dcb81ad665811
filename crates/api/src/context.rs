use serde::Serialize;

use gatekeeper_auth::{Claims, Permission, Role, SubjectId};

/// Verified caller identity, inserted into request extensions for
/// downstream handlers when the gate allows a credentialed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalContext {
    subject: SubjectId,
    role: Role,
    permissions: Vec<Permission>,
}

impl PrincipalContext {
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }
}

impl From<Claims> for PrincipalContext {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.subject,
            role: claims.role,
            permissions: claims.permissions.into_iter().collect(),
        }
    }
}
