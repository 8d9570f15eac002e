//! Stateless request builder and response parser for the IAM Identity API.
//!
//! # Design
//! `IamIdentityClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! validates its options and produces an `HttpRequest`, and a `parse_*`
//! method that consumes an `HttpResponse`. `IamIdentityService` wires the two
//! together around a transport; the split keeps every operation testable
//! without I/O.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{DetailedResponse, HttpMethod, HttpRequest, HttpResponse};
use crate::models::{ApiKey, ApiKeyList, ServiceErrorBody, ServiceId, ServiceIdList};
use crate::options::{
    CreateApiKeyOptions, CreateServiceIdOptions, DeleteApiKeyOptions, DeleteServiceIdOptions,
    GetApiKeyOptions, GetApiKeysDetailsOptions, GetServiceIdOptions, ListApiKeysOptions,
    ListServiceIdsOptions, LockApiKeyOptions, LockServiceIdOptions, UnlockApiKeyOptions,
    UnlockServiceIdOptions, UpdateApiKeyOptions, UpdateServiceIdOptions, Validate,
};
use crate::request::RequestBuilder;

const APIKEYS: &str = "/v1/apikeys";
const APIKEYS_DETAILS: &str = "/v1/apikeys/details";
const APIKEY: &str = "/v1/apikeys/{id}";
const APIKEY_LOCK: &str = "/v1/apikeys/{id}/lock";
const SERVICEIDS: &str = "/v1/serviceids/";
const SERVICEID: &str = "/v1/serviceids/{id}";
const SERVICEID_LOCK: &str = "/v1/serviceids/{id}/lock";

const JSON: &str = "application/json";

/// Synchronous, stateless client for the IAM Identity API.
#[derive(Debug, Clone)]
pub struct IamIdentityClient {
    base_url: String,
}

impl IamIdentityClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: HttpMethod,
        template: &str,
        id: Option<&str>,
        operation_id: &str,
        headers: &[(String, String)],
    ) -> Result<RequestBuilder, ApiError> {
        let params: Vec<(&str, &str)> = id.map(|id| ("id", id)).into_iter().collect();
        Ok(RequestBuilder::new(method, &self.base_url, template, &params, operation_id)?
            .caller_headers(headers))
    }

    // -----------------------------------------------------------------------
    // API keys
    // -----------------------------------------------------------------------

    pub fn build_list_api_keys(&self, options: &ListApiKeysOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Get, APIKEYS, None, "ListApiKeys", &options.headers)?
            .header("Accept", JSON)
            .query("account_id", options.account_id.as_ref())
            .query("iam_id", options.iam_id.as_ref())
            .query("pagesize", options.pagesize.as_ref())
            .query("pagetoken", options.pagetoken.as_ref())
            .query("scope", options.scope.as_ref())
            .query("type", options.key_type.as_ref())
            .query("sort", options.sort.as_ref())
            .query("order", options.order.as_ref())
            .query("include_history", options.include_history.as_ref())
            .build())
    }

    pub fn build_create_api_key(&self, options: &CreateApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Post, APIKEYS, None, "CreateApiKey", &options.headers)?
            .header("Accept", JSON)
            .optional_header("Entity-Lock", options.entity_lock.as_deref())
            .json_body(options)?
            .build())
    }

    pub fn build_get_api_keys_details(
        &self,
        options: &GetApiKeysDetailsOptions,
    ) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Get, APIKEYS_DETAILS, None, "GetApiKeysDetails", &options.headers)?
            .header("Accept", JSON)
            .optional_header("IAM-ApiKey", options.iam_api_key.as_deref())
            .query("include_history", options.include_history.as_ref())
            .build())
    }

    pub fn build_get_api_key(&self, options: &GetApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Get, APIKEY, Some(&options.id), "GetApiKey", &options.headers)?
            .header("Accept", JSON)
            .query("include_history", options.include_history.as_ref())
            .build())
    }

    pub fn build_update_api_key(&self, options: &UpdateApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Put, APIKEY, Some(&options.id), "UpdateApiKey", &options.headers)?
            .header("Accept", JSON)
            .header("If-Match", options.if_match.as_str())
            .json_body(options)?
            .build())
    }

    pub fn build_delete_api_key(&self, options: &DeleteApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Delete, APIKEY, Some(&options.id), "DeleteApiKey", &options.headers)?
            .build())
    }

    pub fn build_lock_api_key(&self, options: &LockApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Post, APIKEY_LOCK, Some(&options.id), "LockApiKey", &options.headers)?
            .build())
    }

    pub fn build_unlock_api_key(&self, options: &UnlockApiKeyOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Delete, APIKEY_LOCK, Some(&options.id), "UnlockApiKey", &options.headers)?
            .build())
    }

    pub fn parse_list_api_keys(&self, response: HttpResponse) -> Result<DetailedResponse<ApiKeyList>, ApiError> {
        decode(response)
    }

    pub fn parse_create_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<ApiKey>, ApiError> {
        decode(response)
    }

    pub fn parse_get_api_keys_details(&self, response: HttpResponse) -> Result<DetailedResponse<ApiKey>, ApiError> {
        decode(response)
    }

    pub fn parse_get_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<ApiKey>, ApiError> {
        decode(response)
    }

    pub fn parse_update_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<ApiKey>, ApiError> {
        decode(response)
    }

    pub fn parse_delete_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<()>, ApiError> {
        no_content(response)
    }

    pub fn parse_lock_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<()>, ApiError> {
        no_content(response)
    }

    pub fn parse_unlock_api_key(&self, response: HttpResponse) -> Result<DetailedResponse<()>, ApiError> {
        no_content(response)
    }

    // -----------------------------------------------------------------------
    // Service IDs
    // -----------------------------------------------------------------------

    pub fn build_list_service_ids(&self, options: &ListServiceIdsOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Get, SERVICEIDS, None, "ListServiceIds", &options.headers)?
            .header("Accept", JSON)
            .query("account_id", options.account_id.as_ref())
            .query("name", options.name.as_ref())
            .query("pagesize", options.pagesize.as_ref())
            .query("pagetoken", options.pagetoken.as_ref())
            .query("sort", options.sort.as_ref())
            .query("order", options.order.as_ref())
            .query("include_history", options.include_history.as_ref())
            .build())
    }

    pub fn build_create_service_id(&self, options: &CreateServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Post, SERVICEIDS, None, "CreateServiceID", &options.headers)?
            .header("Accept", JSON)
            .optional_header("Entity-Lock", options.entity_lock.as_deref())
            .json_body(options)?
            .build())
    }

    pub fn build_get_service_id(&self, options: &GetServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Get, SERVICEID, Some(&options.id), "GetServiceID", &options.headers)?
            .header("Accept", JSON)
            .query("include_history", options.include_history.as_ref())
            .build())
    }

    pub fn build_update_service_id(&self, options: &UpdateServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Put, SERVICEID, Some(&options.id), "UpdateServiceID", &options.headers)?
            .header("Accept", JSON)
            .header("If-Match", options.if_match.as_str())
            .json_body(options)?
            .build())
    }

    pub fn build_delete_service_id(&self, options: &DeleteServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Delete, SERVICEID, Some(&options.id), "DeleteServiceID", &options.headers)?
            .build())
    }

    pub fn build_lock_service_id(&self, options: &LockServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Post, SERVICEID_LOCK, Some(&options.id), "LockServiceID", &options.headers)?
            .header("Accept", JSON)
            .build())
    }

    pub fn build_unlock_service_id(&self, options: &UnlockServiceIdOptions) -> Result<HttpRequest, ApiError> {
        options.validate()?;
        Ok(self
            .request(HttpMethod::Delete, SERVICEID_LOCK, Some(&options.id), "UnlockServiceID", &options.headers)?
            .header("Accept", JSON)
            .build())
    }

    pub fn parse_list_service_ids(&self, response: HttpResponse) -> Result<DetailedResponse<ServiceIdList>, ApiError> {
        decode(response)
    }

    pub fn parse_create_service_id(&self, response: HttpResponse) -> Result<DetailedResponse<ServiceId>, ApiError> {
        decode(response)
    }

    pub fn parse_get_service_id(&self, response: HttpResponse) -> Result<DetailedResponse<ServiceId>, ApiError> {
        decode(response)
    }

    pub fn parse_update_service_id(&self, response: HttpResponse) -> Result<DetailedResponse<ServiceId>, ApiError> {
        decode(response)
    }

    pub fn parse_delete_service_id(&self, response: HttpResponse) -> Result<DetailedResponse<()>, ApiError> {
        no_content(response)
    }

    /// The service answers either 204 or 200 with the locked service ID.
    pub fn parse_lock_service_id(
        &self,
        response: HttpResponse,
    ) -> Result<DetailedResponse<Option<ServiceId>>, ApiError> {
        decode_optional(response)
    }

    pub fn parse_unlock_service_id(
        &self,
        response: HttpResponse,
    ) -> Result<DetailedResponse<Option<ServiceId>>, ApiError> {
        decode_optional(response)
    }
}

/// Map a non-2xx response to `ApiError::HttpStatus`, keeping the service's
/// error payload when it has one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_str::<ServiceErrorBody>(&response.body).ok();
    Err(ApiError::HttpStatus {
        status: response.status,
        headers: response.headers.clone(),
        body: response.body.clone(),
        detail,
    })
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<DetailedResponse<T>, ApiError> {
    check_status(&response)?;
    match serde_json::from_str(&response.body) {
        Ok(result) => Ok(DetailedResponse {
            status: response.status,
            headers: response.headers,
            result,
        }),
        Err(e) => Err(ApiError::Decoding {
            status: response.status,
            headers: response.headers,
            message: e.to_string(),
        }),
    }
}

fn decode_optional<T: DeserializeOwned>(
    response: HttpResponse,
) -> Result<DetailedResponse<Option<T>>, ApiError> {
    if response.is_success() && response.body.trim().is_empty() {
        return Ok(DetailedResponse {
            status: response.status,
            headers: response.headers,
            result: None,
        });
    }
    let decoded = decode::<T>(response)?;
    Ok(DetailedResponse {
        status: decoded.status,
        headers: decoded.headers,
        result: Some(decoded.result),
    })
}

fn no_content(response: HttpResponse) -> Result<DetailedResponse<()>, ApiError> {
    check_status(&response)?;
    Ok(DetailedResponse {
        status: response.status,
        headers: response.headers,
        result: (),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ApiKeyScope, ApiKeyType, EntityIdOptions, SortOrder};

    const API_KEY_BODY: &str = r#"{"id":"ApiKey-1","entity_tag":"1-a","crn":"crn:1","locked":false,"created_by":"iam-1","name":"k1","iam_id":"iam-1","account_id":"acct-1","apikey":"secret"}"#;

    fn client() -> IamIdentityClient {
        IamIdentityClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_api_keys_with_every_filter() {
        let options = ListApiKeysOptions {
            account_id: Some("acct-1".to_string()),
            iam_id: Some("iam-1".to_string()),
            pagesize: Some(10),
            pagetoken: Some("20".to_string()),
            scope: Some(ApiKeyScope::Entity),
            key_type: Some(ApiKeyType::User),
            sort: Some("name".to_string()),
            order: Some(SortOrder::Asc),
            include_history: Some(true),
            headers: Vec::new(),
        };
        let req = client().build_list_api_keys(&options).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/v1/apikeys?account_id=acct-1&iam_id=iam-1&pagesize=10&pagetoken=20\
             &scope=entity&type=user&sort=name&order=asc&include_history=true"
        );
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_api_keys_without_filters_has_no_query() {
        let req = client().build_list_api_keys(&ListApiKeysOptions::default()).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/apikeys");
    }

    #[test]
    fn build_create_api_key_sends_entity_lock() {
        let mut options = CreateApiKeyOptions::new("k1", "iam-1");
        options.entity_lock = Some("true".to_string());
        options.description = Some("first key".to_string());
        let req = client().build_create_api_key(&options).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v1/apikeys");
        assert_eq!(req.header("Entity-Lock"), Some("true"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "k1", "iam_id": "iam-1", "description": "first key"})
        );
    }

    #[test]
    fn build_get_api_keys_details_sends_key_in_header() {
        let options = GetApiKeysDetailsOptions {
            iam_api_key: Some("secret".to_string()),
            include_history: Some(false),
            headers: Vec::new(),
        };
        let req = client().build_get_api_keys_details(&options).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/apikeys/details?include_history=false");
        assert_eq!(req.header("IAM-ApiKey"), Some("secret"));
    }

    #[test]
    fn build_update_api_key_requires_if_match() {
        let options = UpdateApiKeyOptions {
            id: "ApiKey-1".to_string(),
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        let err = client().build_update_api_key(&options).unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field } if field == "if_match"));
    }

    #[test]
    fn build_update_api_key_produces_correct_request() {
        let mut options = UpdateApiKeyOptions::new("ApiKey-1", "1-a");
        options.description = Some(String::new());
        let req = client().build_update_api_key(&options).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/v1/apikeys/ApiKey-1");
        assert_eq!(req.header("If-Match"), Some("1-a"));
        assert_eq!(req.body.as_deref(), Some(r#"{"description":""}"#));
    }

    #[test]
    fn build_lock_and_unlock_share_a_path() {
        let options = EntityIdOptions::new("ApiKey-1");
        let lock = client().build_lock_api_key(&options).unwrap();
        let unlock = client().build_unlock_api_key(&options).unwrap();
        assert_eq!(lock.method, HttpMethod::Post);
        assert_eq!(unlock.method, HttpMethod::Delete);
        assert_eq!(lock.url, "http://localhost:3000/v1/apikeys/ApiKey-1/lock");
        assert_eq!(lock.url, unlock.url);
        assert!(lock.header("Accept").is_none());
    }

    #[test]
    fn build_list_service_ids_keeps_collection_slash() {
        let options = ListServiceIdsOptions {
            account_id: Some("acct-1".to_string()),
            ..Default::default()
        };
        let req = client().build_list_service_ids(&options).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/serviceids/?account_id=acct-1");
    }

    #[test]
    fn build_create_service_id_with_nested_api_key() {
        let mut options = CreateServiceIdOptions::new("acct-1", "svc");
        options.unique_instance_crns = Some(vec!["crn:a".to_string()]);
        options.apikey = Some(crate::models::CreateApiKeyRequest::new("svc-key", "iam-x"));
        let req = client().build_create_service_id(&options).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/serviceids/");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["apikey"], serde_json::json!({"name": "svc-key", "iam_id": "iam-x"}));
        assert_eq!(body["unique_instance_crns"], serde_json::json!(["crn:a"]));
    }

    #[test]
    fn build_delete_service_id_encodes_id() {
        let req = client().build_delete_service_id(&EntityIdOptions::new("ServiceId-a b")).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/serviceids/ServiceId-a%20b");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_create_api_key_success() {
        let parsed = client().parse_create_api_key(response(201, API_KEY_BODY)).unwrap();
        assert_eq!(parsed.status, 201);
        assert_eq!(parsed.result.name, "k1");
    }

    #[test]
    fn parse_get_api_key_not_found_keeps_payload() {
        let body = r#"{"trace":"t-1","errors":[{"code":"not_found","message":"no such key"}],"status_code":404}"#;
        let err = client().parse_get_api_key(response(404, body)).unwrap_err();
        assert!(err.is_not_found());
        match err {
            ApiError::HttpStatus { detail: Some(detail), .. } => {
                assert_eq!(detail.trace.as_deref(), Some("t-1"));
                assert_eq!(detail.errors[0].code, "not_found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parse_wrong_status_without_payload() {
        let err = client().parse_update_api_key(response(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 500, detail: None, .. }));
    }

    #[test]
    fn parse_bad_json_is_a_decoding_error() {
        let err = client().parse_list_api_keys(response(200, "} this is not valid json {")).unwrap_err();
        assert!(matches!(err, ApiError::Decoding { status: 200, .. }));
    }

    #[test]
    fn parse_delete_api_key_no_content() {
        let parsed = client().parse_delete_api_key(response(204, "")).unwrap();
        assert_eq!(parsed.status, 204);
    }

    #[test]
    fn parse_lock_service_id_with_and_without_body() {
        let empty = client().parse_lock_service_id(response(204, "")).unwrap();
        assert!(empty.result.is_none());

        let body = format!(
            r#"{{"id":"ServiceId-1","iam_id":"iam-ServiceId-1","crn":"crn:s","locked":true,"account_id":"acct-1","name":"svc","apikey":{API_KEY_BODY}}}"#
        );
        let full = client().parse_lock_service_id(response(200, &body)).unwrap();
        assert!(full.result.unwrap().locked);
    }

    #[test]
    fn parse_get_service_id_without_api_key_is_a_decoding_error() {
        let body = r#"{"id":"ServiceId-1","iam_id":"iam-ServiceId-1","crn":"crn:s","locked":false,"account_id":"acct-1","name":"svc"}"#;
        let err = client().parse_get_service_id(response(200, body)).unwrap_err();
        match err {
            ApiError::Decoding { status, message, .. } => {
                assert_eq!(status, 200);
                assert!(message.contains("apikey"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = IamIdentityClient::new("http://localhost:3000/");
        let req = client.build_get_api_key(&GetApiKeyOptions::new("ApiKey-1")).unwrap();
        assert_eq!(req.url, "http://localhost:3000/v1/apikeys/ApiKey-1");
    }
}
