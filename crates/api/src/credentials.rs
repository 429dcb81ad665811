//! HTTP credential store: `Authentication` cookie, with bearer header fallback.

use axum::http::{HeaderMap, HeaderValue, header};

use gatekeeper_auth::CredentialStore;

use crate::config::{ConfigError, validate_cookie_name};

pub const DEFAULT_COOKIE_NAME: &str = "Authentication";

/// Credential attached to one request.
///
/// `clear` cannot touch the client directly; it records that the response must
/// carry the expiring `Set-Cookie` built by [`clearing_cookie`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    credential: Option<String>,
    clear_requested: bool,
}

impl RequestCredentials {
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        let credential = cookie_value(headers, cookie_name).or_else(|| bearer_token(headers));
        Self {
            credential,
            clear_requested: false,
        }
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_requested
    }
}

impl CredentialStore for RequestCredentials {
    fn read(&self) -> Option<String> {
        self.credential.clone()
    }

    fn clear(&mut self) {
        self.credential = None;
        self.clear_requested = true;
    }
}

/// `Set-Cookie` value that removes `cookie_name` from the client.
pub fn clearing_cookie(cookie_name: &str) -> Result<HeaderValue, ConfigError> {
    validate_cookie_name(cookie_name)?;
    HeaderValue::from_str(&format!(
        "{cookie_name}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    ))
    .map_err(|_| ConfigError::InvalidCookieName(cookie_name.to_string()))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reads_named_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; Authentication=abc.def.ghi; lang=vi")]);
        let creds = RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME);
        assert_eq!(creds.read().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_cookie_across_multiple_headers() {
        let map = headers(&[
            (header::COOKIE, "theme=dark"),
            (header::COOKIE, "Authentication=tok"),
        ]);
        let creds = RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME);
        assert_eq!(creds.read().as_deref(), Some("tok"));
    }

    #[test]
    fn cookie_name_match_is_exact() {
        let map = headers(&[(header::COOKIE, "XAuthentication=tok; authentication=tok2")]);
        let creds = RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME);
        assert_eq!(creds.read(), None);
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer  tok ")]);
        let creds = RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME);
        assert_eq!(creds.read().as_deref(), Some("tok"));

        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME).read(), None);
    }

    #[test]
    fn cookie_wins_over_header() {
        let map = headers(&[
            (header::COOKIE, "Authentication=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        let creds = RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME);
        assert_eq!(creds.read().as_deref(), Some("from-cookie"));
    }

    #[test]
    fn empty_cookie_is_absent() {
        let map = headers(&[(header::COOKIE, "Authentication=")]);
        assert_eq!(RequestCredentials::from_headers(&map, DEFAULT_COOKIE_NAME).read(), None);
    }

    #[test]
    fn clear_is_idempotent_and_recorded() {
        let mut creds = RequestCredentials::default();
        assert!(!creds.clear_requested());
        creds.clear();
        creds.clear();
        assert!(creds.clear_requested());
        assert_eq!(creds.read(), None);
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let value = clearing_cookie(DEFAULT_COOKIE_NAME).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("Authentication=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Path=/"));

        assert!(clearing_cookie("bad;name").is_err());
    }
}
