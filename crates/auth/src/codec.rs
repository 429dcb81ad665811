//! Credential verification: signature check + claim decoding.

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::Claims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Unparseable token, bad signature, wrong key or algorithm, bad claim shape.
    #[error("malformed credential: {0}")]
    Malformed(String),

    /// Rejected by the codec's own expiry check.
    #[error("credential rejected as expired by codec")]
    Expired,
}

/// Verifies an opaque credential and decodes its claims.
///
/// Implementations must be pure in-memory computations: no I/O, no blocking.
pub trait CredentialCodec: Send + Sync {
    fn verify(&self, raw: &str) -> Result<Claims, VerificationError>;
}

/// Shared-secret (HMAC) JWT codec.
///
/// `exp` is optional in the token; when present the library checks it with its
/// default leeway. The decision engine re-checks expiry strictly afterwards.
pub struct HmacJwtCodec {
    key: DecodingKey,
    validation: Validation,
}

impl HmacJwtCodec {
    /// HS256 codec keyed by `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self::with_algorithm(secret, Algorithm::HS256)
    }

    /// Only the HMAC family is accepted; anything else falls back to HS256.
    pub fn with_algorithm(secret: impl AsRef<[u8]>, algorithm: Algorithm) -> Self {
        let algorithm = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => algorithm,
            other => {
                tracing::warn!(?other, "non-HMAC algorithm requested; using HS256");
                Algorithm::HS256
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.validation.algorithms[0]
    }
}

impl core::fmt::Debug for HmacJwtCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacJwtCodec")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

impl CredentialCodec for HmacJwtCodec {
    fn verify(&self, raw: &str) -> Result<Claims, VerificationError> {
        jsonwebtoken::decode::<Claims>(raw, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                _ => VerificationError::Malformed(e.to_string()),
            })
    }
}
