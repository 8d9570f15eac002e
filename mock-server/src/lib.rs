//! In-memory IAM Identity API used by the client's integration tests.
//!
//! Entity tags change on every write and `If-Match` must carry the current
//! one. Locked entities reject updates and deletes. Lists are paged with
//! offset tokens.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_ACCOUNT_ID: &str = "mock-account";
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub iam_id: String,
    pub iam_id_account: String,
    pub action: String,
    pub params: Vec<String>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub entity_tag: String,
    pub crn: String,
    pub locked: bool,
    pub created_at: String,
    pub created_by: String,
    pub modified_at: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub iam_id: String,
    pub account_id: String,
    pub apikey: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceId {
    pub id: String,
    pub iam_id: String,
    pub entity_tag: String,
    pub crn: String,
    pub locked: bool,
    pub created_at: String,
    pub modified_at: String,
    pub account_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_instance_crns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryRecord>,
    pub apikey: ApiKey,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyList {
    pub offset: usize,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub apikeys: Vec<ApiKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceIdList {
    pub offset: usize,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub serviceids: Vec<ServiceId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub trace: String,
    pub status_code: u16,
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorItem {
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct CreateApiKey {
    pub name: String,
    pub iam_id: String,
    pub description: Option<String>,
    pub account_id: Option<String>,
    pub apikey: Option<String>,
    pub store_value: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateApiKey {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateServiceId {
    pub account_id: String,
    pub name: String,
    pub description: Option<String>,
    pub unique_instance_crns: Option<Vec<String>>,
    pub apikey: Option<CreateApiKey>,
}

#[derive(Deserialize)]
pub struct UpdateServiceId {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unique_instance_crns: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ListApiKeysQuery {
    pub account_id: Option<String>,
    pub iam_id: Option<String>,
    pub pagesize: Option<usize>,
    pub pagetoken: Option<String>,
    pub scope: Option<String>,
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub include_history: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListServiceIdsQuery {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub pagesize: Option<usize>,
    pub pagetoken: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub include_history: Option<bool>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub include_history: Option<bool>,
}

/// An error response in the service's error payload shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn not_found(kind: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("{kind} {id} not found"))
    }

    fn locked(kind: &str, id: &str) -> Self {
        Self::new(StatusCode::CONFLICT, "entity_locked", format!("{kind} {id} is locked"))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            trace: Uuid::new_v4().simple().to_string(),
            status_code: self.status.as_u16(),
            errors: vec![ErrorItem {
                code: self.code.to_string(),
                message: self.message,
            }],
        };
        (self.status, Json(body)).into_response()
    }
}

struct StoredApiKey {
    key: ApiKey,
    version: u64,
    store_value: bool,
}

impl StoredApiKey {
    fn view(&self, reveal: bool, include_history: bool) -> ApiKey {
        let mut key = self.key.clone();
        if !reveal && !self.store_value {
            key.apikey = String::new();
        }
        if !include_history {
            key.history.clear();
        }
        key
    }

    fn touch(&mut self, action: &str, message: &str) {
        self.version += 1;
        self.key.entity_tag = entity_tag(self.version);
        self.key.modified_at = now();
        self.key.history.push(history(&self.key.iam_id, &self.key.account_id, action, message));
    }
}

/// `service_id.apikey` holds the last known view of the bound key, which
/// outlives the key itself if it is deleted on its own.
struct StoredServiceId {
    service_id: ServiceId,
    version: u64,
}

impl StoredServiceId {
    fn touch(&mut self, action: &str, message: &str) {
        self.version += 1;
        self.service_id.entity_tag = entity_tag(self.version);
        self.service_id.modified_at = now();
        let record = history(&self.service_id.iam_id, &self.service_id.account_id, action, message);
        self.service_id.history.push(record);
    }
}

#[derive(Default)]
pub struct Store {
    apikeys: HashMap<String, StoredApiKey>,
    serviceids: HashMap<String, StoredServiceId>,
}

impl Store {
    fn service_id_view(&self, stored: &StoredServiceId, include_history: bool) -> ServiceId {
        let mut service_id = stored.service_id.clone();
        if !include_history {
            service_id.history.clear();
        }
        if let Some(key) = self.apikeys.get(&stored.service_id.apikey.id) {
            service_id.apikey = key.view(false, include_history);
        } else if !include_history {
            service_id.apikey.history.clear();
        }
        service_id
    }

    fn insert_api_key(&mut self, input: CreateApiKey, locked: bool) -> ApiKey {
        let id = format!("ApiKey-{}", Uuid::new_v4());
        let account_id = input
            .account_id
            .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.to_string());
        let timestamp = now();
        let key = ApiKey {
            crn: format!("crn:v1:bluemix:public:iam-identity::a/{account_id}::apikey:{id}"),
            id: id.clone(),
            entity_tag: entity_tag(1),
            locked,
            created_at: timestamp.clone(),
            created_by: input.iam_id.clone(),
            modified_at: timestamp,
            name: input.name,
            description: input.description.filter(|d| !d.is_empty()),
            history: vec![history(&input.iam_id, &account_id, "create", "Created API key")],
            iam_id: input.iam_id,
            account_id,
            apikey: input
                .apikey
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        };
        self.apikeys.insert(
            id,
            StoredApiKey {
                key: key.clone(),
                version: 1,
                store_value: input.store_value.unwrap_or(false),
            },
        );
        key
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/apikeys", get(list_api_keys).post(create_api_key))
        .route("/v1/apikeys/details", get(get_api_keys_details))
        .route(
            "/v1/apikeys/{id}",
            get(get_api_key).put(update_api_key).delete(delete_api_key),
        )
        .route("/v1/apikeys/{id}/lock", post(lock_api_key).delete(unlock_api_key))
        .route("/v1/serviceids/", get(list_service_ids).post(create_service_id))
        .route(
            "/v1/serviceids/{id}",
            get(get_service_id).put(update_service_id).delete(delete_service_id),
        )
        .route(
            "/v1/serviceids/{id}/lock",
            post(lock_service_id).delete(unlock_service_id),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

fn entity_tag(version: u64) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{version}-{}", &nonce[..8])
}

fn history(iam_id: &str, account_id: &str, action: &str, message: &str) -> HistoryRecord {
    HistoryRecord {
        timestamp: now(),
        iam_id: iam_id.to_string(),
        iam_id_account: account_id.to_string(),
        action: action.to_string(),
        params: Vec::new(),
        message: message.to_string(),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn entity_lock_requested(headers: &HeaderMap) -> bool {
    header(headers, "Entity-Lock").is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// `If-Match` is mandatory on updates and must match the current tag
/// unless it is `*`.
fn check_if_match(headers: &HeaderMap, current: &str) -> Result<(), ApiFailure> {
    match header(headers, "If-Match") {
        None | Some("") => Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "missing_if_match",
            "If-Match header is required",
        )),
        Some("*") => Ok(()),
        Some(tag) if tag == current => Ok(()),
        Some(_) => Err(ApiFailure::new(
            StatusCode::PRECONDITION_FAILED,
            "entity_tag_mismatch",
            "If-Match does not match the current entity tag",
        )),
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiFailure> {
    if value.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "missing_parameter",
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

struct Page<T> {
    items: Vec<T>,
    offset: usize,
    limit: usize,
    first: Option<String>,
    previous: Option<String>,
    next: Option<String>,
}

/// Cut one page out of `items`. Page tokens are plain offsets.
fn paginate<T>(
    items: Vec<T>,
    pagesize: Option<usize>,
    pagetoken: Option<&str>,
    path: &str,
) -> Result<Page<T>, ApiFailure> {
    let limit = pagesize.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = match pagetoken {
        None | Some("") => 0,
        Some(token) => token.parse::<usize>().map_err(|_| {
            ApiFailure::new(StatusCode::BAD_REQUEST, "invalid_pagetoken", format!("invalid pagetoken {token}"))
        })?,
    };
    let total = items.len();
    let next = (offset + limit < total).then(|| format!("{path}?pagesize={limit}&pagetoken={}", offset + limit));
    let previous = (offset > 0).then(|| {
        format!("{path}?pagesize={limit}&pagetoken={}", offset.saturating_sub(limit))
    });
    let items = items.into_iter().skip(offset).take(limit).collect();
    Ok(Page {
        items,
        offset,
        limit,
        first: Some(format!("{path}?pagesize={limit}")),
        previous,
        next,
    })
}

fn sort_by_key<T, F>(items: &mut [T], sort: Option<&str>, order: Option<&str>, key: F)
where
    F: Fn(&T, &str) -> (String, String),
{
    let field = sort.unwrap_or("name");
    items.sort_by_key(|item| key(item, field));
    if order == Some("desc") {
        items.reverse();
    }
}

// ---------------------------------------------------------------------------
// API keys
// ---------------------------------------------------------------------------

async fn list_api_keys(
    State(db): State<Db>,
    Query(query): Query<ListApiKeysQuery>,
) -> Result<Json<ApiKeyList>, ApiFailure> {
    let store = db.read().await;
    let include_history = query.include_history == Some(true);
    let scope_account = query.scope.as_deref() == Some("account");

    let mut keys: Vec<ApiKey> = store
        .apikeys
        .values()
        .filter(|k| query.account_id.as_ref().is_none_or(|a| &k.key.account_id == a))
        .filter(|k| scope_account || query.iam_id.as_ref().is_none_or(|i| &k.key.iam_id == i))
        .filter(|k| match query.key_type.as_deref() {
            Some("serviceid") => k.key.iam_id.starts_with("iam-ServiceId-"),
            Some("user") => !k.key.iam_id.starts_with("iam-ServiceId-"),
            _ => true,
        })
        .map(|k| k.view(false, include_history))
        .collect();
    sort_by_key(&mut keys, query.sort.as_deref(), query.order.as_deref(), |k, field| {
        let primary = match field {
            "created_at" => k.created_at.clone(),
            "modified_at" => k.modified_at.clone(),
            _ => k.name.clone(),
        };
        (primary, k.id.clone())
    });

    let page = paginate(keys, query.pagesize, query.pagetoken.as_deref(), "/v1/apikeys")?;
    tracing::debug!(count = page.items.len(), offset = page.offset, "listed API keys");
    Ok(Json(ApiKeyList {
        offset: page.offset,
        limit: page.limit,
        first: page.first,
        previous: page.previous,
        next: page.next,
        apikeys: page.items,
    }))
}

async fn create_api_key(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateApiKey>,
) -> Result<(StatusCode, Json<ApiKey>), ApiFailure> {
    require_non_empty("name", &input.name)?;
    require_non_empty("iam_id", &input.iam_id)?;
    let mut store = db.write().await;
    let key = store.insert_api_key(input, entity_lock_requested(&headers));
    tracing::info!(id = %key.id, "created API key");
    let mut view = key;
    view.history.clear();
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_api_keys_details(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiKey>, ApiFailure> {
    let value = header(&headers, "IAM-ApiKey").ok_or_else(|| {
        ApiFailure::new(StatusCode::BAD_REQUEST, "missing_apikey", "IAM-ApiKey header is required")
    })?;
    let store = db.read().await;
    store
        .apikeys
        .values()
        .find(|k| k.key.apikey == value)
        .map(|k| Json(k.view(false, query.include_history == Some(true))))
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, "not_found", "API key not found"))
}

async fn get_api_key(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiKey>, ApiFailure> {
    let store = db.read().await;
    store
        .apikeys
        .get(&id)
        .map(|k| Json(k.view(false, query.include_history == Some(true))))
        .ok_or_else(|| ApiFailure::not_found("API key", &id))
}

async fn update_api_key(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<UpdateApiKey>,
) -> Result<Json<ApiKey>, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .apikeys
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("API key", &id))?;
    check_if_match(&headers, &stored.key.entity_tag)?;
    if stored.key.locked {
        return Err(ApiFailure::locked("API key", &id));
    }
    if let Some(name) = input.name.filter(|n| !n.is_empty()) {
        stored.key.name = name;
    }
    if let Some(description) = input.description {
        stored.key.description = (!description.is_empty()).then_some(description);
    }
    stored.touch("update", "Updated API key");
    Ok(Json(stored.view(false, false)))
}

async fn delete_api_key(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .apikeys
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("API key", &id))?;
    if stored.key.locked {
        return Err(ApiFailure::locked("API key", &id));
    }
    store.apikeys.remove(&id);
    tracing::info!(%id, "deleted API key");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_api_key_lock(db: Db, id: String, locked: bool) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .apikeys
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("API key", &id))?;
    stored.key.locked = locked;
    if locked {
        stored.touch("lock", "Locked API key");
    } else {
        stored.touch("unlock", "Unlocked API key");
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn lock_api_key(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiFailure> {
    set_api_key_lock(db, id, true).await
}

async fn unlock_api_key(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiFailure> {
    set_api_key_lock(db, id, false).await
}

// ---------------------------------------------------------------------------
// Service IDs
// ---------------------------------------------------------------------------

async fn list_service_ids(
    State(db): State<Db>,
    Query(query): Query<ListServiceIdsQuery>,
) -> Result<Json<ServiceIdList>, ApiFailure> {
    let store = db.read().await;
    let include_history = query.include_history == Some(true);

    let mut ids: Vec<ServiceId> = store
        .serviceids
        .values()
        .filter(|s| query.account_id.as_ref().is_none_or(|a| &s.service_id.account_id == a))
        .filter(|s| query.name.as_ref().is_none_or(|n| &s.service_id.name == n))
        .map(|s| store.service_id_view(s, include_history))
        .collect();
    sort_by_key(&mut ids, query.sort.as_deref(), query.order.as_deref(), |s, field| {
        let primary = match field {
            "created_at" => s.created_at.clone(),
            "modified_at" => s.modified_at.clone(),
            _ => s.name.clone(),
        };
        (primary, s.id.clone())
    });

    let page = paginate(ids, query.pagesize, query.pagetoken.as_deref(), "/v1/serviceids/")?;
    Ok(Json(ServiceIdList {
        offset: page.offset,
        limit: page.limit,
        first: page.first,
        previous: page.previous,
        next: page.next,
        serviceids: page.items,
    }))
}

async fn create_service_id(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateServiceId>,
) -> Result<(StatusCode, Json<ServiceId>), ApiFailure> {
    require_non_empty("account_id", &input.account_id)?;
    require_non_empty("name", &input.name)?;
    if let Some(apikey) = &input.apikey {
        require_non_empty("apikey.name", &apikey.name)?;
    }

    let locked = entity_lock_requested(&headers);
    let uid = Uuid::new_v4();
    let id = format!("ServiceId-{uid}");
    let iam_id = format!("iam-ServiceId-{uid}");
    let timestamp = now();

    // Every service ID is bound to a key; one named after the service ID is
    // created when the request does not describe it.
    let key_request = match input.apikey {
        Some(apikey) => CreateApiKey {
            iam_id: iam_id.clone(),
            account_id: Some(input.account_id.clone()),
            ..apikey
        },
        None => CreateApiKey {
            name: input.name.clone(),
            iam_id: iam_id.clone(),
            description: None,
            account_id: Some(input.account_id.clone()),
            apikey: None,
            store_value: None,
        },
    };

    let mut store = db.write().await;
    let created_key = store.insert_api_key(key_request, false);
    let hidden_key = ApiKey {
        apikey: String::new(),
        history: Vec::new(),
        ..created_key.clone()
    };

    let service_id = ServiceId {
        crn: format!(
            "crn:v1:bluemix:public:iam-identity::a/{}::serviceid:{id}",
            input.account_id
        ),
        id: id.clone(),
        entity_tag: entity_tag(1),
        locked,
        created_at: timestamp.clone(),
        modified_at: timestamp,
        history: vec![history(&iam_id, &input.account_id, "create", "Created service ID")],
        iam_id,
        account_id: input.account_id,
        name: input.name,
        description: input.description.filter(|d| !d.is_empty()),
        unique_instance_crns: input.unique_instance_crns.unwrap_or_default(),
        apikey: hidden_key,
    };
    let stored = StoredServiceId {
        service_id,
        version: 1,
    };
    let mut view = store.service_id_view(&stored, false);
    // The create response is the only time a generated key value is shown.
    view.apikey.apikey = created_key.apikey;
    store.serviceids.insert(id.clone(), stored);
    tracing::info!(%id, "created service ID");
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_service_id(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ServiceId>, ApiFailure> {
    let store = db.read().await;
    store
        .serviceids
        .get(&id)
        .map(|s| Json(store.service_id_view(s, query.include_history == Some(true))))
        .ok_or_else(|| ApiFailure::not_found("service ID", &id))
}

async fn update_service_id(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<UpdateServiceId>,
) -> Result<Json<ServiceId>, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .serviceids
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("service ID", &id))?;
    check_if_match(&headers, &stored.service_id.entity_tag)?;
    if stored.service_id.locked {
        return Err(ApiFailure::locked("service ID", &id));
    }
    if let Some(name) = input.name.filter(|n| !n.is_empty()) {
        stored.service_id.name = name;
    }
    if let Some(description) = input.description {
        stored.service_id.description = (!description.is_empty()).then_some(description);
    }
    if let Some(crns) = input.unique_instance_crns {
        stored.service_id.unique_instance_crns = crns;
    }
    stored.touch("update", "Updated service ID");

    let store = &*store;
    let stored = store
        .serviceids
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("service ID", &id))?;
    Ok(Json(store.service_id_view(stored, false)))
}

async fn delete_service_id(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .serviceids
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("service ID", &id))?;
    if stored.service_id.locked {
        return Err(ApiFailure::locked("service ID", &id));
    }
    let iam_id = stored.service_id.iam_id.clone();
    store.apikeys.retain(|_, k| k.key.iam_id != iam_id);
    store.serviceids.remove(&id);
    tracing::info!(%id, "deleted service ID and its API keys");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_service_id_lock(db: Db, id: String, locked: bool) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let stored = store
        .serviceids
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("service ID", &id))?;
    stored.service_id.locked = locked;
    if locked {
        stored.touch("lock", "Locked service ID");
    } else {
        stored.touch("unlock", "Unlocked service ID");
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn lock_service_id(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiFailure> {
    set_service_id_lock(db, id, true).await
}

async fn unlock_service_id(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiFailure> {
    set_service_id_lock(db, id, false).await
}
