//! Request assembly shared by every operation.
//!
//! # Design
//! `RequestBuilder` turns one operation's parameters into an `HttpRequest`:
//! the path template is resolved against the base URL, headers are merged in
//! a fixed order, and only present query parameters are appended. The
//! identification headers added first are protected: a caller-supplied
//! header of the same name is dropped instead of replacing them.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

pub const SERVICE_NAME: &str = "iam_identity";
pub const SERVICE_VERSION: &str = "V1";
pub const SDK_ANALYTICS_HEADER: &str = "X-IBMCloud-SDK-Analytics";
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query key or value.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`');

/// Identification headers sent with every request.
pub fn sdk_headers(operation_id: &str) -> Vec<(String, String)> {
    vec![
        (
            USER_AGENT_HEADER.to_string(),
            format!("iam-identity-rust-sdk/{}", env!("CARGO_PKG_VERSION")),
        ),
        (
            SDK_ANALYTICS_HEADER.to_string(),
            format!(
                "service_name={SERVICE_NAME};service_version={SERVICE_VERSION};operation_id={operation_id}"
            ),
        ),
    ]
}

/// Percent-encode a value for use as one path segment.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Substitute `{name}` placeholders in `template` and join it to `base_url`.
///
/// Every placeholder needs a non-empty binding. A trailing slash on the
/// template is kept; a trailing slash on the base URL is not.
pub fn resolve_url(
    base_url: &str,
    template: &str,
    path_params: &[(&str, &str)],
) -> Result<String, ApiError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|i| open + i)
            .ok_or_else(|| ApiError::missing(&rest[open..]))?;
        let name = &rest[open + 1..close];
        let value = path_params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::missing(name))?;
        path.push_str(&rest[..open]);
        path.push_str(&encode_path_segment(value));
        rest = &rest[close + 1..];
    }
    path.push_str(rest);

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        Ok(format!("{base}{path}"))
    } else {
        Ok(format!("{base}/{path}"))
    }
}

/// Something that can be rendered as a query-string value.
pub trait QueryValue {
    fn to_query_value(&self) -> String;
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }
}

impl QueryValue for &str {
    fn to_query_value(&self) -> String {
        (*self).to_string()
    }
}

impl QueryValue for bool {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for i64 {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

/// Assembles one `HttpRequest`.
#[derive(Debug)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    protected: Vec<String>,
    body: Option<String>,
}

impl RequestBuilder {
    /// Start a request for `operation_id`; the identification headers are
    /// added immediately.
    pub fn new(
        method: HttpMethod,
        base_url: &str,
        template: &str,
        path_params: &[(&str, &str)],
        operation_id: &str,
    ) -> Result<Self, ApiError> {
        let url = resolve_url(base_url, template, path_params)?;
        let headers = sdk_headers(operation_id);
        let protected = headers.iter().map(|(n, _)| n.clone()).collect();
        Ok(Self {
            method,
            url,
            query: Vec::new(),
            headers,
            protected,
            body: None,
        })
    }

    fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Append caller-supplied headers. Headers that would override an
    /// identification header are dropped.
    pub fn caller_headers(mut self, headers: &[(String, String)]) -> Self {
        for (name, value) in headers {
            if self.is_protected(name) {
                tracing::warn!(header = %name, "ignoring caller header that overrides an SDK header");
                continue;
            }
            self.headers.push((name.clone(), value.clone()));
        }
        self
    }

    /// Set an operation header, replacing any caller header of the same name.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        if self.is_protected(name) {
            return self;
        }
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Set an operation header only when `value` is present.
    pub fn optional_header(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.header(name, v),
            None => self,
        }
    }

    /// Append `name=value` when `value` is present. An absent value adds
    /// nothing, not even the key.
    pub fn query<T: QueryValue>(mut self, name: &str, value: Option<&T>) -> Self {
        if let Some(v) = value {
            self.query.push((name.to_string(), v.to_query_value()));
        }
        self
    }

    /// Serialize `body` as the JSON payload and set `Content-Type`.
    pub fn json_body<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let encoded =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(encoded);
        Ok(self.header("Content-Type", "application/json"))
    }

    pub fn build(self) -> HttpRequest {
        let mut url = self.url;
        if !self.query.is_empty() {
            let encoded: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(k, QUERY_COMPONENT),
                        utf8_percent_encode(v, QUERY_COMPONENT)
                    )
                })
                .collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }
        HttpRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://iam.cloud.ibm.com";

    #[test]
    fn resolve_url_substitutes_and_encodes() {
        let url = resolve_url(BASE, "/v1/apikeys/{id}/lock", &[("id", "a/b c")]).unwrap();
        assert_eq!(url, "https://iam.cloud.ibm.com/v1/apikeys/a%2Fb%20c/lock");
    }

    #[test]
    fn resolve_url_keeps_template_trailing_slash_only() {
        let url = resolve_url("https://iam.cloud.ibm.com/", "/v1/serviceids/", &[]).unwrap();
        assert_eq!(url, "https://iam.cloud.ibm.com/v1/serviceids/");
    }

    #[test]
    fn resolve_url_rejects_missing_or_empty_binding() {
        let err = resolve_url(BASE, "/v1/apikeys/{id}", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field } if field == "id"));

        let err = resolve_url(BASE, "/v1/apikeys/{id}", &[("id", "")]).unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field } if field == "id"));
    }

    #[test]
    fn absent_query_parameters_leave_no_trace() {
        let req = RequestBuilder::new(HttpMethod::Get, BASE, "/v1/apikeys", &[], "ListApiKeys")
            .unwrap()
            .query::<String>("account_id", None)
            .query("pagesize", Some(&10_i64))
            .query::<bool>("include_history", None)
            .build();
        assert_eq!(req.url, "https://iam.cloud.ibm.com/v1/apikeys?pagesize=10");
    }

    #[test]
    fn false_flag_is_transmitted() {
        let req = RequestBuilder::new(HttpMethod::Get, BASE, "/v1/apikeys", &[], "ListApiKeys")
            .unwrap()
            .query("include_history", Some(&false))
            .build();
        assert!(req.url.ends_with("?include_history=false"), "{}", req.url);
    }

    #[test]
    fn query_values_are_encoded() {
        let req = RequestBuilder::new(HttpMethod::Get, BASE, "/v1/serviceids/", &[], "ListServiceIds")
            .unwrap()
            .query("name", Some(&"a&b=c d".to_string()))
            .build();
        assert!(req.url.ends_with("?name=a%26b%3Dc%20d"), "{}", req.url);
    }

    #[test]
    fn caller_cannot_override_identification_headers() {
        let caller = vec![
            ("user-agent".to_string(), "spoofed".to_string()),
            ("X-Request-Id".to_string(), "r-1".to_string()),
        ];
        let req = RequestBuilder::new(HttpMethod::Get, BASE, "/v1/apikeys", &[], "ListApiKeys")
            .unwrap()
            .caller_headers(&caller)
            .header("Accept", "application/json")
            .build();
        assert!(req.header("User-Agent").unwrap().starts_with("iam-identity-rust-sdk/"));
        assert_eq!(
            req.header(SDK_ANALYTICS_HEADER),
            Some("service_name=iam_identity;service_version=V1;operation_id=ListApiKeys")
        );
        assert_eq!(req.header("x-request-id"), Some("r-1"));
        assert_eq!(req.headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case("user-agent")).count(), 1);
    }

    #[test]
    fn operation_header_replaces_caller_header() {
        let caller = vec![("accept".to_string(), "text/plain".to_string())];
        let req = RequestBuilder::new(HttpMethod::Get, BASE, "/v1/apikeys", &[], "ListApiKeys")
            .unwrap()
            .caller_headers(&caller)
            .header("Accept", "application/json")
            .build();
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.headers.len(), 3);
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = RequestBuilder::new(HttpMethod::Post, BASE, "/v1/apikeys", &[], "CreateApiKey")
            .unwrap()
            .json_body(&serde_json::json!({"name": "k1"}))
            .unwrap()
            .build();
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"k1"}"#));
    }
}
