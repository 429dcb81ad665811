//! `gatekeeper-auth` — pure access-decision boundary.
//!
//! This crate is intentionally decoupled from HTTP: it verifies credentials,
//! holds the static route policy and turns both into a [`Decision`].

pub mod claims;
pub mod codec;
pub mod decision;
pub mod engine;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod store;

pub use claims::{Claims, check_expiry};
pub use codec::{CredentialCodec, HmacJwtCodec, VerificationError};
pub use decision::{AccessError, Decision, Evaluation, Reason};
pub use engine::DecisionEngine;
pub use permissions::Permission;
pub use policy::{PolicyConfig, PolicyError, PolicyRule, PolicyTable};
pub use principal::SubjectId;
pub use roles::Role;
pub use store::{CredentialStore, InMemoryCredentialStore};

pub use jsonwebtoken::Algorithm;
