//! Per-request decision values and the recoverable error taxonomy.

use serde::Serialize;
use thiserror::Error;

use crate::{Claims, Permission, PolicyTable, VerificationError};

/// Outcome of evaluating one request. A pure value; applying it (forwarding,
/// redirecting, clearing the stored credential) is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Allow { clear_credential: bool },
    Redirect { target: String, clear_credential: bool },
    /// Rendered as "not found" so callers cannot probe which routes exist.
    Deny { target: String },
}

impl Decision {
    pub fn allow() -> Self {
        Self::Allow {
            clear_credential: false,
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn clears_credential(&self) -> bool {
        match self {
            Self::Allow { clear_credential } | Self::Redirect { clear_credential, .. } => {
                *clear_credential
            }
            Self::Deny { .. } => false,
        }
    }

    /// Where the caller is sent, if anywhere.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Allow { .. } => None,
            Self::Redirect { target, .. } | Self::Deny { target } => Some(target),
        }
    }
}

/// Which terminal state of the evaluation produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    PublicRoute,
    NoCredential,
    MalformedCredential,
    ExpiredCredential,
    AdminOverride,
    NoMatchingRule,
    NoCapabilityRequired,
    CapabilityHeld,
    InsufficientCapability,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::PublicRoute => "public_route",
            Reason::NoCredential => "no_credential",
            Reason::MalformedCredential => "malformed_credential",
            Reason::ExpiredCredential => "expired_credential",
            Reason::AdminOverride => "admin_override",
            Reason::NoMatchingRule => "no_matching_rule",
            Reason::NoCapabilityRequired => "no_capability_required",
            Reason::CapabilityHeld => "capability_held",
            Reason::InsufficientCapability => "insufficient_capability",
        }
    }
}

impl core::fmt::Display for Reason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recoverable access failures. Every variant is absorbed into a [`Decision`];
/// none escapes the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("no credential presented")]
    NoCredential,

    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    #[error("credential has expired")]
    ExpiredCredential,

    #[error("missing any of the required capabilities {required:?}")]
    InsufficientCapability { required: Vec<Permission> },
}

impl From<VerificationError> for AccessError {
    fn from(value: VerificationError) -> Self {
        match value {
            VerificationError::Malformed(msg) => Self::MalformedCredential(msg),
            VerificationError::Expired => Self::ExpiredCredential,
        }
    }
}

impl AccessError {
    pub fn reason(&self) -> Reason {
        match self {
            AccessError::NoCredential => Reason::NoCredential,
            AccessError::MalformedCredential(_) => Reason::MalformedCredential,
            AccessError::ExpiredCredential => Reason::ExpiredCredential,
            AccessError::InsufficientCapability { .. } => Reason::InsufficientCapability,
        }
    }

    pub fn into_decision(self, policy: &PolicyTable) -> Decision {
        match self {
            AccessError::NoCredential => Decision::Redirect {
                target: policy.login_path().to_string(),
                clear_credential: false,
            },
            AccessError::MalformedCredential(_) | AccessError::ExpiredCredential => {
                Decision::Redirect {
                    target: policy.login_path().to_string(),
                    clear_credential: true,
                }
            }
            AccessError::InsufficientCapability { .. } => Decision::Deny {
                target: policy.not_found_path().to_string(),
            },
        }
    }
}

/// Decision plus the context that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub reason: Reason,
    /// Verified claims; set whenever the credential verified and was not
    /// expired, including denials.
    pub claims: Option<Claims>,
}
