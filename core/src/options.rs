//! Per-operation parameters.
//!
//! # Design
//! One struct per operation. Required parameters are plain `String`s and
//! are checked non-empty by `Validate` before a request is built; optional
//! parameters are `Option`s and are left out of the request entirely when
//! `None`. Options that carry a JSON body derive `Serialize` for exactly the
//! body fields; path, header and query parameters are skipped. Every struct
//! has a `headers` bag for caller-supplied headers.

use serde::Serialize;

use crate::error::ApiError;
use crate::models::CreateApiKeyRequest;
use crate::request::QueryValue;

/// Checks required parameters before any request is built.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::missing(field));
    }
    Ok(())
}

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Which API keys `list_api_keys` returns: those of one entity or of the
/// whole account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyScope {
    Entity,
    Account,
}

impl ApiKeyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyScope::Entity => "entity",
            ApiKeyScope::Account => "account",
        }
    }
}

/// Owner kind filter for `list_api_keys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyType {
    User,
    ServiceId,
}

impl ApiKeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyType::User => "user",
            ApiKeyType::ServiceId => "serviceid",
        }
    }
}

impl QueryValue for SortOrder {
    fn to_query_value(&self) -> String {
        self.as_str().to_string()
    }
}

impl QueryValue for ApiKeyScope {
    fn to_query_value(&self) -> String {
        self.as_str().to_string()
    }
}

impl QueryValue for ApiKeyType {
    fn to_query_value(&self) -> String {
        self.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// API keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ListApiKeysOptions {
    pub account_id: Option<String>,
    pub iam_id: Option<String>,
    pub pagesize: Option<i64>,
    pub pagetoken: Option<String>,
    pub scope: Option<ApiKeyScope>,
    pub key_type: Option<ApiKeyType>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub include_history: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl Validate for ListApiKeysOptions {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateApiKeyOptions {
    pub name: String,
    pub iam_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Supply your own key value instead of having one generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_value: Option<bool>,
    /// Sent as the `Entity-Lock` header.
    #[serde(skip)]
    pub entity_lock: Option<String>,
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

impl CreateApiKeyOptions {
    pub fn new(name: impl Into<String>, iam_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iam_id: iam_id.into(),
            ..Default::default()
        }
    }
}

impl Validate for CreateApiKeyOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        require("iam_id", &self.iam_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetApiKeysDetailsOptions {
    /// The key value to look up; sent as the `IAM-ApiKey` header.
    pub iam_api_key: Option<String>,
    pub include_history: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl Validate for GetApiKeysDetailsOptions {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetApiKeyOptions {
    pub id: String,
    pub include_history: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl GetApiKeyOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Validate for GetApiKeyOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("id", &self.id)
    }
}

/// An empty-string `name` or `description` clears that property; `None`
/// leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateApiKeyOptions {
    #[serde(skip)]
    pub id: String,
    /// Current `entity_tag` of the key.
    #[serde(skip)]
    pub if_match: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

impl UpdateApiKeyOptions {
    pub fn new(id: impl Into<String>, if_match: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            if_match: if_match.into(),
            ..Default::default()
        }
    }
}

impl Validate for UpdateApiKeyOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("id", &self.id)?;
        require("if_match", &self.if_match)
    }
}

/// Options shared by the operations that only take an entity ID: delete,
/// lock and unlock.
#[derive(Debug, Clone, Default)]
pub struct EntityIdOptions {
    pub id: String,
    pub headers: Vec<(String, String)>,
}

impl EntityIdOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            headers: Vec::new(),
        }
    }
}

impl Validate for EntityIdOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("id", &self.id)
    }
}

pub type DeleteApiKeyOptions = EntityIdOptions;
pub type LockApiKeyOptions = EntityIdOptions;
pub type UnlockApiKeyOptions = EntityIdOptions;

// ---------------------------------------------------------------------------
// Service IDs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ListServiceIdsOptions {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub pagesize: Option<i64>,
    pub pagetoken: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub include_history: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl Validate for ListServiceIdsOptions {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServiceIdOptions {
    pub account_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_instance_crns: Option<Vec<String>>,
    /// API key created together with the service ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<CreateApiKeyRequest>,
    #[serde(skip)]
    pub entity_lock: Option<String>,
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

impl CreateServiceIdOptions {
    pub fn new(account_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Validate for CreateServiceIdOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("account_id", &self.account_id)?;
        require("name", &self.name)?;
        if let Some(apikey) = &self.apikey {
            require("apikey.name", &apikey.name)?;
            require("apikey.iam_id", &apikey.iam_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetServiceIdOptions {
    pub id: String,
    pub include_history: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl GetServiceIdOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Validate for GetServiceIdOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("id", &self.id)
    }
}

/// Same partial-update rules as `UpdateApiKeyOptions`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateServiceIdOptions {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub if_match: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_instance_crns: Option<Vec<String>>,
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

impl UpdateServiceIdOptions {
    pub fn new(id: impl Into<String>, if_match: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            if_match: if_match.into(),
            ..Default::default()
        }
    }
}

impl Validate for UpdateServiceIdOptions {
    fn validate(&self) -> Result<(), ApiError> {
        require("id", &self.id)?;
        require("if_match", &self.if_match)
    }
}

pub type DeleteServiceIdOptions = EntityIdOptions;
pub type LockServiceIdOptions = EntityIdOptions;
pub type UnlockServiceIdOptions = EntityIdOptions;
