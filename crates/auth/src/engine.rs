//! The per-request access decision.
//!
//! Evaluation order is fixed:
//!
//! ```text
//! public route?          -> Allow (clear stored credential)
//! credential present?    -> no: Redirect(login)
//! verifies?              -> no: Redirect(login, clear)
//! expired?               -> yes: Redirect(login, clear)
//! admin role?            -> Allow
//! rule for path?         -> none / empty set: Allow
//! holds any required?    -> Allow, else Deny(not-found)
//! ```
//!
//! - No IO
//! - No panics
//! - No state between evaluations

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    AccessError, Claims, CredentialCodec, CredentialStore, Decision, Evaluation, PolicyTable,
    Reason, check_expiry,
};

#[derive(Clone)]
pub struct DecisionEngine {
    policy: Arc<PolicyTable>,
    codec: Arc<dyn CredentialCodec>,
}

impl DecisionEngine {
    pub fn new(policy: PolicyTable, codec: impl CredentialCodec + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            codec: Arc::new(codec),
        }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Decide for `path` given the raw credential (if any). An empty string
    /// counts as no credential.
    pub fn decide(&self, path: &str, raw: Option<&str>, now: DateTime<Utc>) -> Decision {
        self.evaluate(path, raw, now).decision
    }

    /// Like [`decide`](Self::decide), also returning the reason and the
    /// verified claims.
    pub fn evaluate(&self, path: &str, raw: Option<&str>, now: DateTime<Utc>) -> Evaluation {
        let evaluation = self.run(path, raw, now);
        log_evaluation(path, &evaluation);
        evaluation
    }

    /// Read the credential from `store`, decide, and apply the clear instruction.
    pub fn enforce<S>(&self, path: &str, store: &mut S, now: DateTime<Utc>) -> Evaluation
    where
        S: CredentialStore + ?Sized,
    {
        let raw = store.read();
        let evaluation = self.evaluate(path, raw.as_deref(), now);
        if evaluation.decision.clears_credential() {
            store.clear();
        }
        evaluation
    }

    fn run(&self, path: &str, raw: Option<&str>, now: DateTime<Utc>) -> Evaluation {
        if self.policy.is_public(path) {
            return Evaluation {
                decision: Decision::Allow {
                    clear_credential: true,
                },
                reason: Reason::PublicRoute,
                claims: None,
            };
        }

        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return self.reject(AccessError::NoCredential, None);
        };

        let claims = match self.codec.verify(raw) {
            Ok(claims) => claims,
            Err(e) => return self.reject(e.into(), None),
        };

        if let Err(e) = check_expiry(&claims, now) {
            return self.reject(e, None);
        }

        if self.policy.is_admin(&claims.role) {
            return allow(Reason::AdminOverride, claims);
        }

        match self.policy.required_capabilities(path) {
            None => allow(Reason::NoMatchingRule, claims),
            Some(required) if required.is_empty() => allow(Reason::NoCapabilityRequired, claims),
            Some(required) if claims.has_any(required) => allow(Reason::CapabilityHeld, claims),
            Some(required) => {
                let err = AccessError::InsufficientCapability {
                    required: required.iter().cloned().collect(),
                };
                self.reject(err, Some(claims))
            }
        }
    }

    fn reject(&self, err: AccessError, claims: Option<Claims>) -> Evaluation {
        Evaluation {
            reason: err.reason(),
            decision: err.into_decision(&self.policy),
            claims,
        }
    }
}

fn allow(reason: Reason, claims: Claims) -> Evaluation {
    Evaluation {
        decision: Decision::allow(),
        reason,
        claims: Some(claims),
    }
}

fn log_evaluation(path: &str, evaluation: &Evaluation) {
    let subject = evaluation.claims.as_ref().map(|c| c.subject.as_str());
    match &evaluation.decision {
        Decision::Allow { clear_credential } => tracing::debug!(
            path,
            reason = %evaluation.reason,
            subject,
            clear_credential,
            "access allowed"
        ),
        Decision::Redirect {
            target,
            clear_credential,
        } => tracing::info!(
            path,
            reason = %evaluation.reason,
            subject,
            target = %target,
            clear_credential,
            "redirecting to login"
        ),
        Decision::Deny { target } => tracing::info!(
            path,
            reason = %evaluation.reason,
            subject,
            target = %target,
            "access denied"
        ),
    }
}

impl core::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
