//! The IAM Identity service: one blocking call per operation.
//!
//! # Design
//! `IamIdentityService` runs every operation through the same steps:
//! validate and build the request (`IamIdentityClient::build_*`), let the
//! authenticator add credentials, hand the request to the `Transport`, and
//! decode the response (`IamIdentityClient::parse_*`). Nothing is retried
//! and no state is shared between calls, so one service can be used from
//! many threads at once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::Authenticator;
use crate::client::IamIdentityClient;
use crate::config::{validate_url, ServiceConfig, DEFAULT_SERVICE_NAME};
use crate::error::{ApiError, ConfigError};
use crate::http::{DetailedResponse, HttpRequest, HttpResponse};
use crate::models::{ApiKey, ApiKeyList, ServiceId, ServiceIdList};
use crate::options::{
    CreateApiKeyOptions, CreateServiceIdOptions, DeleteApiKeyOptions, DeleteServiceIdOptions,
    GetApiKeyOptions, GetApiKeysDetailsOptions, GetServiceIdOptions, ListApiKeysOptions,
    ListServiceIdsOptions, LockApiKeyOptions, LockServiceIdOptions, UnlockApiKeyOptions,
    UnlockServiceIdOptions, UpdateApiKeyOptions, UpdateServiceIdOptions,
};
use crate::transport::{Transport, UreqTransport};

pub struct IamIdentityService<T = UreqTransport> {
    client: IamIdentityClient,
    authenticator: Arc<dyn Authenticator>,
    transport: T,
}

impl IamIdentityService<UreqTransport> {
    /// A service using the default blocking transport.
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, UreqTransport::new())
    }

    /// A service configured from the `IAM_IDENTITY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(&ServiceConfig::from_env(DEFAULT_SERVICE_NAME)?)
    }
}

impl<T: Transport> IamIdentityService<T> {
    pub fn with_transport(config: &ServiceConfig, transport: T) -> Result<Self, ConfigError> {
        validate_url(&config.url)?;
        let authenticator = config.auth.authenticator()?;
        tracing::debug!(
            service = %config.service_name,
            url = %config.url,
            auth = authenticator.auth_type(),
            "created IAM Identity service"
        );
        Ok(Self {
            client: IamIdentityClient::new(&config.url),
            authenticator,
            transport,
        })
    }

    /// Replace the authenticator, e.g. with one that manages IAM tokens.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn service_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn set_service_url(&mut self, url: &str) -> Result<(), ConfigError> {
        validate_url(url)?;
        self.client = IamIdentityClient::new(url);
        Ok(())
    }

    pub fn client(&self) -> &IamIdentityClient {
        &self.client
    }

    fn execute<R>(
        &self,
        operation: &str,
        mut request: HttpRequest,
        parse: impl FnOnce(&IamIdentityClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        self.authenticator.authenticate(&mut request)?;
        tracing::debug!(operation, method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(&request)?;
        tracing::debug!(operation, status = response.status, "received response");
        parse(&self.client, response)
    }

    // -----------------------------------------------------------------------
    // API keys
    // -----------------------------------------------------------------------

    /// List the API keys of an IAM ID or account, one page at a time.
    pub fn list_api_keys(&self, options: &ListApiKeysOptions) -> Result<DetailedResponse<ApiKeyList>, ApiError> {
        let request = self.client.build_list_api_keys(options)?;
        self.execute("ListApiKeys", request, IamIdentityClient::parse_list_api_keys)
    }

    /// Follow `next` links until every API key matching `options` is read.
    /// Stops at the first page token that was already requested.
    pub fn list_all_api_keys(&self, options: &ListApiKeysOptions) -> Result<Vec<ApiKey>, ApiError> {
        let mut options = options.clone();
        let mut keys = Vec::new();
        let mut seen: HashSet<String> = options.pagetoken.iter().cloned().collect();
        loop {
            let page = self.list_api_keys(&options)?.result;
            keys.extend(page.apikeys.iter().cloned());
            match page.next_page_token() {
                Some(token) if seen.insert(token.clone()) => options.pagetoken = Some(token),
                _ => return Ok(keys),
            }
        }
    }

    pub fn create_api_key(&self, options: &CreateApiKeyOptions) -> Result<DetailedResponse<ApiKey>, ApiError> {
        let request = self.client.build_create_api_key(options)?;
        self.execute("CreateApiKey", request, IamIdentityClient::parse_create_api_key)
    }

    /// Look up an API key by its value.
    pub fn get_api_keys_details(
        &self,
        options: &GetApiKeysDetailsOptions,
    ) -> Result<DetailedResponse<ApiKey>, ApiError> {
        let request = self.client.build_get_api_keys_details(options)?;
        self.execute("GetApiKeysDetails", request, IamIdentityClient::parse_get_api_keys_details)
    }

    pub fn get_api_key(&self, options: &GetApiKeyOptions) -> Result<DetailedResponse<ApiKey>, ApiError> {
        let request = self.client.build_get_api_key(options)?;
        self.execute("GetApiKey", request, IamIdentityClient::parse_get_api_key)
    }

    pub fn update_api_key(&self, options: &UpdateApiKeyOptions) -> Result<DetailedResponse<ApiKey>, ApiError> {
        let request = self.client.build_update_api_key(options)?;
        self.execute("UpdateApiKey", request, IamIdentityClient::parse_update_api_key)
    }

    pub fn delete_api_key(&self, options: &DeleteApiKeyOptions) -> Result<DetailedResponse<()>, ApiError> {
        let request = self.client.build_delete_api_key(options)?;
        self.execute("DeleteApiKey", request, IamIdentityClient::parse_delete_api_key)
    }

    pub fn lock_api_key(&self, options: &LockApiKeyOptions) -> Result<DetailedResponse<()>, ApiError> {
        let request = self.client.build_lock_api_key(options)?;
        self.execute("LockApiKey", request, IamIdentityClient::parse_lock_api_key)
    }

    pub fn unlock_api_key(&self, options: &UnlockApiKeyOptions) -> Result<DetailedResponse<()>, ApiError> {
        let request = self.client.build_unlock_api_key(options)?;
        self.execute("UnlockApiKey", request, IamIdentityClient::parse_unlock_api_key)
    }

    // -----------------------------------------------------------------------
    // Service IDs
    // -----------------------------------------------------------------------

    pub fn list_service_ids(
        &self,
        options: &ListServiceIdsOptions,
    ) -> Result<DetailedResponse<ServiceIdList>, ApiError> {
        let request = self.client.build_list_service_ids(options)?;
        self.execute("ListServiceIds", request, IamIdentityClient::parse_list_service_ids)
    }

    pub fn list_all_service_ids(&self, options: &ListServiceIdsOptions) -> Result<Vec<ServiceId>, ApiError> {
        let mut options = options.clone();
        let mut ids = Vec::new();
        let mut seen: HashSet<String> = options.pagetoken.iter().cloned().collect();
        loop {
            let page = self.list_service_ids(&options)?.result;
            ids.extend(page.serviceids.iter().cloned());
            match page.next_page_token() {
                Some(token) if seen.insert(token.clone()) => options.pagetoken = Some(token),
                _ => return Ok(ids),
            }
        }
    }

    pub fn create_service_id(
        &self,
        options: &CreateServiceIdOptions,
    ) -> Result<DetailedResponse<ServiceId>, ApiError> {
        let request = self.client.build_create_service_id(options)?;
        self.execute("CreateServiceID", request, IamIdentityClient::parse_create_service_id)
    }

    pub fn get_service_id(&self, options: &GetServiceIdOptions) -> Result<DetailedResponse<ServiceId>, ApiError> {
        let request = self.client.build_get_service_id(options)?;
        self.execute("GetServiceID", request, IamIdentityClient::parse_get_service_id)
    }

    pub fn update_service_id(
        &self,
        options: &UpdateServiceIdOptions,
    ) -> Result<DetailedResponse<ServiceId>, ApiError> {
        let request = self.client.build_update_service_id(options)?;
        self.execute("UpdateServiceID", request, IamIdentityClient::parse_update_service_id)
    }

    /// Deletes the service ID together with its API keys.
    pub fn delete_service_id(&self, options: &DeleteServiceIdOptions) -> Result<DetailedResponse<()>, ApiError> {
        let request = self.client.build_delete_service_id(options)?;
        self.execute("DeleteServiceID", request, IamIdentityClient::parse_delete_service_id)
    }

    pub fn lock_service_id(
        &self,
        options: &LockServiceIdOptions,
    ) -> Result<DetailedResponse<Option<ServiceId>>, ApiError> {
        let request = self.client.build_lock_service_id(options)?;
        self.execute("LockServiceID", request, IamIdentityClient::parse_lock_service_id)
    }

    pub fn unlock_service_id(
        &self,
        options: &UnlockServiceIdOptions,
    ) -> Result<DetailedResponse<Option<ServiceId>>, ApiError> {
        let request = self.client.build_unlock_service_id(options)?;
        self.execute("UnlockServiceID", request, IamIdentityClient::parse_unlock_service_id)
    }
}
