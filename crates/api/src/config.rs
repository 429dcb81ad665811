//! Process configuration, read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use gatekeeper_auth::{Algorithm, PolicyConfig, PolicyError};

use crate::credentials::DEFAULT_COOKIE_NAME;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("invalid bind address '{0}'")]
    InvalidBindAddr(String),

    #[error("unsupported JWT algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid cookie name '{0}'")]
    InvalidCookieName(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Everything the gatekeeper needs to start.
#[derive(Clone)]
pub struct GatekeeperConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub bind_addr: SocketAddr,
    pub cookie_name: String,
    pub policy: PolicyConfig,
}

impl GatekeeperConfig {
    /// Defaults for everything except the secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_algorithm: Algorithm::HS256,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            policy: PolicyConfig::standard(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// - `JWT_SECRET` (required)
    /// - `GATEKEEPER_ADDR`
    /// - `GATEKEEPER_POLICY` (JSON policy file path)
    /// - `GATEKEEPER_COOKIE`
    /// - `GATEKEEPER_JWT_ALGORITHM`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(jwt_secret);

        if let Some(addr) = lookup("GATEKEEPER_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(addr.clone()))?;
        }

        if let Some(algorithm) = lookup("GATEKEEPER_JWT_ALGORITHM") {
            config.jwt_algorithm = parse_algorithm(&algorithm)?;
        }

        if let Some(name) = lookup("GATEKEEPER_COOKIE") {
            config.cookie_name = name;
        }
        validate_cookie_name(&config.cookie_name)?;

        if let Some(path) = lookup("GATEKEEPER_POLICY") {
            let path = PathBuf::from(path);
            tracing::info!(path = %path.display(), "loading policy file");
            config.policy = PolicyConfig::from_path(&path)?;
        }

        Ok(config)
    }
}

impl core::fmt::Debug for GatekeeperConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GatekeeperConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("bind_addr", &self.bind_addr)
            .field("cookie_name", &self.cookie_name)
            .field("policy", &self.policy)
            .finish()
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(raw.to_string())),
    }
}

/// RFC 6265 cookie-name token characters.
pub(crate) fn validate_cookie_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        });
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCookieName(name.to_string()))
    }
}
