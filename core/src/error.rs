//! Error types for the IAM Identity client.
//!
//! # Design
//! Every failure an operation can produce lands in exactly one `ApiError`
//! variant, so callers can tell "we never sent anything" (`Validation`) from
//! "the network failed" (`Transport`), "the service said no" (`HttpStatus`)
//! and "the service answered with something we cannot read" (`Decoding`).
//! Response metadata (status and headers) travels with the last two.

use crate::models::ServiceErrorBody;

/// Errors returned by `IamIdentityClient` and `IamIdentityService`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required parameter was missing or empty. Raised before any I/O.
    #[error("missing required parameter {field}")]
    Validation { field: String },

    /// The transport failed to complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {}", describe_failure(.detail.as_ref(), .body))]
    HttpStatus {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
        detail: Option<ServiceErrorBody>,
    },

    /// The response body could not be decoded into the expected model.
    #[error("cannot decode response (HTTP {status}): {message}")]
    Decoding {
        status: u16,
        headers: Vec<(String, String)>,
        message: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The authenticator could not decorate the request.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ApiError {
    pub(crate) fn missing(field: &str) -> Self {
        ApiError::Validation {
            field: field.to_string(),
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } | ApiError::Decoding { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Response headers, when a response was received.
    pub fn headers(&self) -> Option<&[(String, String)]> {
        match self {
            ApiError::HttpStatus { headers, .. } | ApiError::Decoding { headers, .. } => {
                Some(headers)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn describe_failure(detail: Option<&ServiceErrorBody>, body: &str) -> String {
    match detail.and_then(|d| d.errors.first()) {
        Some(first) => format!("{}: {}", first.code, first.message),
        None => body.to_string(),
    }
}

/// A failure below the HTTP layer: connection, TLS, timeout, I/O.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised while building a `ServiceConfig` or an authenticator.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid service URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported authentication type {0:?}")]
    UnsupportedAuthType(String),

    #[error("missing credential {0}")]
    MissingCredential(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceErrorItem;

    #[test]
    fn http_status_display_prefers_service_payload() {
        let err = ApiError::HttpStatus {
            status: 404,
            headers: Vec::new(),
            body: "{...}".to_string(),
            detail: Some(ServiceErrorBody {
                trace: Some("abc".to_string()),
                status_code: Some(404),
                errors: vec![ServiceErrorItem {
                    code: "not_found".to_string(),
                    message: "API key not found".to_string(),
                    more_info: None,
                }],
            }),
        };
        assert_eq!(err.to_string(), "HTTP 404: not_found: API key not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn http_status_display_falls_back_to_raw_body() {
        let err = ApiError::HttpStatus {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 500: internal error");
        assert!(!err.is_not_found());
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ApiError::missing("if_match");
        assert_eq!(err.to_string(), "missing required parameter if_match");
        assert_eq!(err.status(), None);
        assert!(err.headers().is_none());
    }
}
