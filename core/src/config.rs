//! Service configuration.
//!
//! # Design
//! `ServiceConfig` is an immutable value resolved once and handed to
//! `IamIdentityService::new`; nothing reads process-wide state after
//! construction. `from_env` reads `<SERVICE_NAME>_URL`, `_AUTH_TYPE`,
//! `_BEARER_TOKEN`, `_USERNAME` and `_PASSWORD`; `from_lookup` takes the
//! lookup as a closure so the same logic runs in tests without touching the
//! environment.

use std::fmt;
use std::sync::Arc;

use crate::auth::{Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator};
use crate::error::ConfigError;

pub const DEFAULT_SERVICE_URL: &str = "https://iam.test.cloud.ibm.com";
pub const DEFAULT_SERVICE_NAME: &str = "iam_identity";

/// Credentials used to build the service's authenticator.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthConfig {
    #[default]
    NoAuth,
    BearerToken(String),
    Basic { username: String, password: String },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::NoAuth => f.write_str("NoAuth"),
            AuthConfig::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl AuthConfig {
    pub fn authenticator(&self) -> Result<Arc<dyn Authenticator>, ConfigError> {
        Ok(match self {
            AuthConfig::NoAuth => Arc::new(NoAuthAuthenticator),
            AuthConfig::BearerToken(token) => Arc::new(BearerTokenAuthenticator::new(token.clone())?),
            AuthConfig::Basic { username, password } => {
                Arc::new(BasicAuthenticator::new(username.clone(), password.clone())?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub service_name: String,
    pub url: String,
    pub auth: AuthConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            url: DEFAULT_SERVICE_URL.to_string(),
            auth: AuthConfig::NoAuth,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the service URL after checking that it parses.
    pub fn with_url(mut self, url: &str) -> Result<Self, ConfigError> {
        validate_url(url)?;
        self.url = url.to_string();
        Ok(self)
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Read the configuration for `service_name` from the process environment.
    pub fn from_env(service_name: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Read the configuration for `service_name` through `lookup`.
    ///
    /// Without an `_AUTH_TYPE`, a configured `_BEARER_TOKEN` selects bearer
    /// authentication and anything else falls back to no authentication.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = service_name.to_ascii_uppercase().replace('-', "_");
        let get = |suffix: &str| lookup(&format!("{prefix}_{suffix}")).filter(|v| !v.is_empty());

        let url = match get("URL") {
            Some(url) => {
                validate_url(&url)?;
                url
            }
            None => DEFAULT_SERVICE_URL.to_string(),
        };

        let auth_type = get("AUTH_TYPE").map(|t| t.to_ascii_lowercase());
        let auth = match auth_type.as_deref() {
            Some("noauth") => AuthConfig::NoAuth,
            Some("bearertoken") => AuthConfig::BearerToken(
                get("BEARER_TOKEN").ok_or_else(|| ConfigError::MissingCredential(format!("{prefix}_BEARER_TOKEN")))?,
            ),
            Some("basic") => AuthConfig::Basic {
                username: get("USERNAME").ok_or_else(|| ConfigError::MissingCredential(format!("{prefix}_USERNAME")))?,
                password: get("PASSWORD").ok_or_else(|| ConfigError::MissingCredential(format!("{prefix}_PASSWORD")))?,
            },
            Some(other) => return Err(ConfigError::UnsupportedAuthType(other.to_string())),
            None => match get("BEARER_TOKEN") {
                Some(token) => AuthConfig::BearerToken(token),
                None => AuthConfig::NoAuth,
            },
        };

        tracing::debug!(service = %service_name, url = %url, auth = ?auth, "loaded service configuration");
        Ok(Self {
            service_name: service_name.to_string(),
            url,
            auth,
        })
    }
}

/// Service URLs must be absolute `http` or `https` URLs.
pub fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
