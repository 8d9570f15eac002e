//! Blocking client for the IAM Identity API (API keys and service IDs).
//!
//! # Overview
//! Every operation validates its options, builds an `HttpRequest`, lets an
//! `Authenticator` add credentials, sends the request through a `Transport`,
//! and decodes the JSON response into a typed model wrapped in a
//! `DetailedResponse` that keeps the status and headers.
//!
//! # Design
//! - `IamIdentityClient` is stateless: `build_*` produces requests and
//!   `parse_*` consumes responses, so the I/O boundary is explicit.
//! - `IamIdentityService` runs one operation end to end over a transport.
//! - Models are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod options;
pub mod request;
pub mod service;
pub mod transport;

pub use auth::{Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator};
pub use client::IamIdentityClient;
pub use config::{AuthConfig, ServiceConfig, DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_URL};
pub use error::{ApiError, ConfigError, TransportError};
pub use http::{DetailedResponse, HttpMethod, HttpRequest, HttpResponse};
pub use models::{
    ApiKey, ApiKeyList, CreateApiKeyRequest, EntityHistoryRecord, ResponseContext, ServiceErrorBody,
    ServiceErrorItem, ServiceId, ServiceIdList,
};
pub use options::*;
pub use service::IamIdentityService;
pub use transport::{Transport, UreqTransport};
