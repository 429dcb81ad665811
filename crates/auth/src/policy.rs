//! Static route policy: public prefixes and ordered capability rules.
//!
//! The table is built once at process start and never mutated afterwards.
//! All structural problems are reported by [`PolicyTable::from_config`] so a
//! misconfigured process fails to start instead of misrouting requests.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Permission, Role};

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_NOT_FOUND_PATH: &str = "/not-found";

/// One `(route-prefix, required-capabilities)` entry.
///
/// An empty capability set means "any authenticated caller".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub prefix: String,
    #[serde(default)]
    pub capabilities: BTreeSet<Permission>,
}

impl PolicyRule {
    pub fn new(prefix: impl Into<String>, capabilities: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            prefix: prefix.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    pub fn authenticated_only(prefix: impl Into<String>) -> Self {
        Self::new(prefix, [])
    }
}

/// Serializable policy configuration (JSON file or built-in default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub public_route_prefixes: Vec<String>,

    /// Declaration order is match order.
    #[serde(default)]
    pub route_permissions: Vec<PolicyRule>,

    #[serde(default = "default_admin_role")]
    pub admin_role: Role,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_not_found_path")]
    pub not_found_path: String,
}

fn default_admin_role() -> Role {
    Role::ADMIN
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_not_found_path() -> String {
    DEFAULT_NOT_FOUND_PATH.to_string()
}

impl PolicyConfig {
    /// The learning-center application's route table.
    pub fn standard() -> Self {
        Self {
            public_route_prefixes: vec![
                "/auth/login".to_string(),
                "/auth/reset-password".to_string(),
                "/auth/register".to_string(),
            ],
            route_permissions: vec![
                PolicyRule::authenticated_only("/assistant"),
                PolicyRule::new("/attendance", [Permission::CREATE_ATTENDANCE]),
                PolicyRule::new("/calendar", [Permission::CREATE_CLASS]),
                PolicyRule::new("/classes", [Permission::CREATE_CLASS]),
                PolicyRule::authenticated_only("/histories"),
                PolicyRule::authenticated_only("/notifications"),
                PolicyRule::new("/payments", [Permission::CREATE_PAYMENT]),
                PolicyRule::new("/students", [Permission::CREATE_STUDENT]),
                PolicyRule::new("/users", [Permission::CREATE_USER]),
            ],
            admin_role: default_admin_role(),
            login_path: default_login_path(),
            not_found_path: default_not_found_path(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(raw).map_err(|e| PolicyError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Startup-time policy misconfiguration. Always fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("failed to read policy file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("failed to parse policy: {0}")]
    Parse(String),

    #[error("invalid route prefix '{0}': must be non-empty and start with '/'")]
    InvalidPrefix(String),

    #[error("duplicate public route prefix '{0}'")]
    DuplicatePublicPrefix(String),

    #[error("duplicate rule prefix '{0}'")]
    DuplicateRulePrefix(String),

    #[error("rule '{shadowed}' is unreachable: earlier rule '{by}' matches first")]
    ShadowedRule { shadowed: String, by: String },

    #[error("{which} target '{path}' is invalid, not public, or requires a capability (redirect loop)")]
    InvalidTarget { which: &'static str, path: String },
}

/// Validated, immutable policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    public_prefixes: Vec<String>,
    rules: Vec<PolicyRule>,
    admin_role: Role,
    login_path: String,
    not_found_path: String,
}

impl PolicyTable {
    pub fn from_config(config: PolicyConfig) -> Result<Self, PolicyError> {
        let mut seen = HashSet::new();
        for prefix in &config.public_route_prefixes {
            validate_prefix(prefix)?;
            if !seen.insert(prefix.as_str()) {
                return Err(PolicyError::DuplicatePublicPrefix(prefix.clone()));
            }
        }

        for (i, rule) in config.route_permissions.iter().enumerate() {
            validate_prefix(&rule.prefix)?;
            for earlier in &config.route_permissions[..i] {
                if earlier.prefix == rule.prefix {
                    return Err(PolicyError::DuplicateRulePrefix(rule.prefix.clone()));
                }
                if rule.prefix.starts_with(&earlier.prefix) {
                    return Err(PolicyError::ShadowedRule {
                        shadowed: rule.prefix.clone(),
                        by: earlier.prefix.clone(),
                    });
                }
            }
            if let Some(public) = config
                .public_route_prefixes
                .iter()
                .find(|p| rule.prefix.starts_with(p.as_str()) || p.starts_with(&rule.prefix))
            {
                tracing::warn!(
                    rule = %rule.prefix,
                    public = %public,
                    "rule overlaps a public prefix; public prefix takes precedence"
                );
            }
        }

        let table = Self {
            public_prefixes: config.public_route_prefixes,
            rules: config.route_permissions,
            admin_role: config.admin_role,
            login_path: config.login_path,
            not_found_path: config.not_found_path,
        };

        table.validate_target("login", &table.login_path)?;
        table.validate_target("not-found", &table.not_found_path)?;

        tracing::debug!(
            public = table.public_prefixes.len(),
            rules = table.rules.len(),
            admin_role = %table.admin_role,
            "policy table loaded"
        );

        Ok(table)
    }

    /// Redirect targets must be reachable by the callers sent there. Callers
    /// redirected to login may hold no credential at all, so login must be public.
    fn validate_target(&self, which: &'static str, path: &str) -> Result<(), PolicyError> {
        let invalid = || PolicyError::InvalidTarget {
            which,
            path: path.to_string(),
        };
        if !path.starts_with('/') {
            return Err(invalid());
        }
        if self.is_public(path) {
            return Ok(());
        }
        if which == "login" {
            return Err(invalid());
        }
        match self.required_capabilities(path) {
            Some(required) if !required.is_empty() => Err(invalid()),
            _ => Ok(()),
        }
    }

    /// True if `path` starts with any public prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Capabilities of the first rule (in declaration order) whose prefix
    /// matches `path`. `None` means no rule matched, which is distinct from a
    /// matching rule with an empty set.
    ///
    /// Unmatched paths are open to every authenticated caller: a route added
    /// without a rule is reachable by all non-admin roles.
    pub fn required_capabilities(&self, path: &str) -> Option<&BTreeSet<Permission>> {
        self.matching_rule(path).map(|rule| &rule.capabilities)
    }

    pub fn matching_rule(&self, path: &str) -> Option<&PolicyRule> {
        self.rules.iter().find(|rule| path.starts_with(rule.prefix.as_str()))
    }

    pub fn is_admin(&self, role: &Role) -> bool {
        *role == self.admin_role
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn not_found_path(&self) -> &str {
        &self.not_found_path
    }

    pub fn public_prefixes(&self) -> &[String] {
        &self.public_prefixes
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }
}

fn validate_prefix(prefix: &str) -> Result<(), PolicyError> {
    if prefix.is_empty() || !prefix.starts_with('/') {
        return Err(PolicyError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}
