//! Response models returned by the IAM Identity API.
//!
//! # Design
//! Fields the service always returns are plain values, so a response that
//! omits one fails to decode instead of producing an empty default. Fields
//! the service may leave out are `Option` (or a defaulted `Vec`). Models are
//! defined independently from the mock-server crate; the integration tests
//! catch schema drift.

use serde::{Deserialize, Serialize};

/// Context with key properties for problem determination.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
}

/// One entry of an entity's change history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityHistoryRecord {
    pub timestamp: String,
    pub iam_id: String,
    pub iam_id_account: String,
    pub action: String,
    pub params: Vec<String>,
    pub message: String,
}

/// An API key as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResponseContext>,
    pub id: String,
    /// Version token; pass it as `if_match` when updating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_tag: Option<String>,
    pub crn: String,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub iam_id: String,
    pub account_id: String,
    /// The key value. Only populated on create, or when the key was created
    /// with `store_value`.
    pub apikey: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<EntityHistoryRecord>,
}

/// A service ID as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResponseContext>,
    pub id: String,
    pub iam_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_tag: Option<String>,
    pub crn: String,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    pub account_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_instance_crns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<EntityHistoryRecord>,
    /// The API key bound to the service ID.
    pub apikey: ApiKey,
}

/// One page of API keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeyList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResponseContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub apikeys: Vec<ApiKey>,
}

impl ApiKeyList {
    /// The `pagetoken` to pass to the next `list_api_keys` call, if any.
    pub fn next_page_token(&self) -> Option<String> {
        self.next.as_deref().and_then(page_token)
    }
}

/// One page of service IDs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceIdList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResponseContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub serviceids: Vec<ServiceId>,
}

impl ServiceIdList {
    /// The `pagetoken` to pass to the next `list_service_ids` call, if any.
    pub fn next_page_token(&self) -> Option<String> {
        self.next.as_deref().and_then(page_token)
    }
}

/// Extract the `pagetoken` query parameter from a continuation link.
///
/// Links may be absolute or relative to the service URL.
fn page_token(link: &str) -> Option<String> {
    let base = url::Url::parse("http://localhost/").ok()?;
    let parsed = base.join(link).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "pagetoken")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Parameters of the API key created together with a service ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub iam_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_value: Option<bool>,
}

impl CreateApiKeyRequest {
    pub fn new(name: impl Into<String>, iam_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iam_id: iam_id.into(),
            ..Default::default()
        }
    }
}

/// Error payload sent by the service with non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub errors: Vec<ServiceErrorItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceErrorItem {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_KEY_JSON: &str = r#"{
        "id": "ApiKey-1",
        "entity_tag": "1-abc",
        "crn": "crn:v1:bluemix:public:iam-identity::a/acct-1::apikey:ApiKey-1",
        "locked": false,
        "created_by": "iam-1",
        "name": "k1",
        "iam_id": "iam-1",
        "account_id": "acct-1",
        "apikey": "secret"
    }"#;

    #[test]
    fn api_key_decodes_with_optional_fields_absent() {
        let key: ApiKey = serde_json::from_str(API_KEY_JSON).unwrap();
        assert_eq!(key.id, "ApiKey-1");
        assert_eq!(key.entity_tag.as_deref(), Some("1-abc"));
        assert!(key.description.is_none());
        assert!(key.history.is_empty());
        assert!(key.context.is_none());
    }

    #[test]
    fn api_key_missing_required_field_is_an_error() {
        let mut value: serde_json::Value = serde_json::from_str(API_KEY_JSON).unwrap();
        value.as_object_mut().unwrap().remove("crn");
        let result: Result<ApiKey, _> = serde_json::from_value(value);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("crn"), "{err}");
    }

    #[test]
    fn service_id_requires_nested_api_key() {
        let without_key = r#"{
            "id": "ServiceId-1", "iam_id": "iam-ServiceId-1", "crn": "crn", "locked": false,
            "account_id": "acct-1", "name": "svc"
        }"#;
        let err = serde_json::from_str::<ServiceId>(without_key).unwrap_err();
        assert!(err.to_string().contains("apikey"), "{err}");

        let with_partial_key = r#"{
            "id": "ServiceId-1", "iam_id": "iam-ServiceId-1", "crn": "crn", "locked": false,
            "account_id": "acct-1", "name": "svc", "apikey": {"id": "ApiKey-1"}
        }"#;
        assert!(serde_json::from_str::<ServiceId>(with_partial_key).is_err());

        let with_key = format!(
            r#"{{"id": "ServiceId-1", "iam_id": "iam-ServiceId-1", "crn": "crn", "locked": false,
                "account_id": "acct-1", "name": "svc", "apikey": {API_KEY_JSON}}}"#
        );
        let service_id: ServiceId = serde_json::from_str(&with_key).unwrap();
        assert_eq!(service_id.apikey.id, "ApiKey-1");
    }

    #[test]
    fn list_requires_item_collection() {
        let result: Result<ApiKeyList, _> = serde_json::from_str(r#"{"limit": 10}"#);
        assert!(result.is_err());

        let list: ApiKeyList = serde_json::from_str(r#"{"apikeys": []}"#).unwrap();
        assert!(list.apikeys.is_empty());
    }

    #[test]
    fn next_page_token_from_absolute_and_relative_links() {
        let mut list: ServiceIdList = serde_json::from_str(r#"{"serviceids": []}"#).unwrap();
        assert_eq!(list.next_page_token(), None);

        list.next = Some("https://iam.cloud.ibm.com/v1/serviceids/?pagesize=2&pagetoken=4".into());
        assert_eq!(list.next_page_token().as_deref(), Some("4"));

        list.next = Some("/v1/serviceids/?pagetoken=a%20b".into());
        assert_eq!(list.next_page_token().as_deref(), Some("a b"));

        list.next = Some("/v1/serviceids/?pagesize=2".into());
        assert_eq!(list.next_page_token(), None);
    }

    #[test]
    fn create_api_key_request_omits_absent_fields() {
        let body = serde_json::to_value(CreateApiKeyRequest::new("k", "iam-1")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "k", "iam_id": "iam-1"}));
    }

    #[test]
    fn service_error_body_tolerates_missing_fields() {
        let body: ServiceErrorBody =
            serde_json::from_str(r#"{"errors":[{"code":"x","message":"y"}]}"#).unwrap();
        assert_eq!(body.errors[0].code, "x");
        assert!(body.trace.is_none());
    }
}
