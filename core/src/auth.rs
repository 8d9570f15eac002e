//! Request authentication.
//!
//! An `Authenticator` decorates a fully built request with credentials just
//! before it is dispatched. Token acquisition and refresh for the IAM token
//! service are not handled here; callers that need them plug in their own
//! implementation.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ApiError, ConfigError};
use crate::http::HttpRequest;

const AUTHORIZATION: &str = "Authorization";

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: &mut HttpRequest) -> Result<(), ApiError>;

    /// Short name used in logs and configuration (`noauth`, `bearertoken`, ...).
    fn auth_type(&self) -> &'static str;
}

/// Sends requests without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthAuthenticator;

impl Authenticator for NoAuthAuthenticator {
    fn authenticate(&self, _request: &mut HttpRequest) -> Result<(), ApiError> {
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "noauth"
    }
}

/// Sends a caller-managed bearer token.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::MissingCredential("bearer token".to_string()));
        }
        Ok(Self { token })
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest) -> Result<(), ApiError> {
        request.set_header(AUTHORIZATION, format!("Bearer {}", self.token));
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "bearertoken"
    }
}

/// HTTP basic authentication.
#[derive(Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(ConfigError::MissingCredential("username".to_string()));
        }
        if password.is_empty() {
            return Err(ConfigError::MissingCredential("password".to_string()));
        }
        Ok(Self { username, password })
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BasicAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest) -> Result<(), ApiError> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        request.set_header(AUTHORIZATION, format!("Basic {encoded}"));
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/v1/apikeys".to_string(),
            headers: vec![("authorization".to_string(), "stale".to_string())],
            body: None,
        }
    }

    #[test]
    fn bearer_replaces_existing_authorization() {
        let mut req = request();
        BearerTokenAuthenticator::new("tok").unwrap().authenticate(&mut req).unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn basic_encodes_credentials() {
        let mut req = request();
        BasicAuthenticator::new("user", "pass").unwrap().authenticate(&mut req).unwrap();
        assert_eq!(req.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(BearerTokenAuthenticator::new("").is_err());
        assert_eq!(
            BasicAuthenticator::new("user", "").unwrap_err(),
            ConfigError::MissingCredential("password".to_string())
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let auth = BearerTokenAuthenticator::new("super-secret").unwrap();
        assert!(!format!("{auth:?}").contains("super-secret"));
    }

    #[test]
    fn no_auth_leaves_request_untouched() {
        let mut req = request();
        NoAuthAuthenticator.authenticate(&mut req).unwrap();
        assert_eq!(req, request());
    }
}
