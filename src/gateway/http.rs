//! `reqwest` implementation of [`Gateway`] against the app-store REST API.

use reqwest::header;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::GlobalConfig;
use crate::gateway::{Gateway, GatewayFuture, Page};
use crate::models::{
    AccessRequest, AccessRequestStatus, AccessRequestSubmission, App, AppSettings, Permission,
    User,
};
use crate::{AppError, Result};

/// Page size used when a listing is not driven by an interactive search.
const LIST_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    items: Vec<T>,
    total: usize,
}

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    #[serde(default)]
    provisioning: AppSettings,
}

#[derive(Debug, Default, Deserialize)]
struct FulfillmentConfig {
    #[serde(default)]
    time_based_access: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RequestConfig {
    #[serde(default)]
    request_fulfillment_config: FulfillmentConfig,
}

/// Permission as served by the backend; access lengths are nested.
#[derive(Debug, Deserialize)]
struct PermissionResponse {
    id: Uuid,
    label: String,
    app_id: Uuid,
    #[serde(default)]
    app_class_id: String,
    #[serde(default)]
    request_config: RequestConfig,
}

impl From<PermissionResponse> for Permission {
    fn from(raw: PermissionResponse) -> Self {
        Self {
            id: raw.id,
            label: raw.label,
            app_id: raw.app_id,
            app_class_id: raw.app_class_id,
            duration_options: raw.request_config.request_fulfillment_config.time_based_access,
        }
    }
}

#[derive(Debug, Serialize)]
struct CancelBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// HTTP client for the access-governance backend.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpGateway {
    /// Build a gateway from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be constructed.
    pub fn new(config: &GlobalConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("lumos-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|err| AppError::Config(format!("invalid api_url: {err}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and return the raw response body.
    ///
    /// `Ok(None)` is returned for `404 Not Found`.
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Option<Vec<u8>>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path, query)?;
        debug!(%method, path, "calling backend");

        let mut builder = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AppError::Api(format!("failed to call {path}: {err}")))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "backend responded");
        match status {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED => {
                return Err(AppError::Unauthorized(
                    "credentials were rejected; try `lumos login` again".into(),
                ))
            }
            StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized(
                    "you don't have permission to do that".into(),
                ))
            }
            _ => {}
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Api(format!(
                "{path} returned status {}: {body}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| AppError::Api(format!("failed to read {path} response: {err}")))?;
        Ok(Some(bytes.to_vec()))
    }

    /// Send a request and decode the JSON body.
    ///
    /// `Ok(None)` is returned for `404 Not Found` and for an empty body.
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.execute(method, path, query, body).await? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(serde_json::from_slice(&bytes)?)),
            _ => Ok(None),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        self.send::<T, ()>(Method::GET, path, query, None).await
    }

    /// GET a listing endpoint; a missing listing is an API failure.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<PagedResponse<T>> {
        self.get(path, query)
            .await?
            .ok_or_else(|| AppError::Api(format!("{path} is not available")))
    }
}

fn search_query(
    key: &'static str,
    filter: Option<String>,
    page_size: usize,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("size", page_size.to_string())];
    if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
        query.push((key, filter));
    }
    query
}

impl Gateway for HttpGateway {
    fn current_user(&self) -> GatewayFuture<'_, User> {
        Box::pin(async move {
            self.get("users/current", &[])
                .await?
                .ok_or_else(|| AppError::Unauthorized("you are not logged in".into()))
        })
    }

    fn search_apps(
        &self,
        filter: Option<String>,
        page_size: usize,
    ) -> GatewayFuture<'_, Page<App>> {
        Box::pin(async move {
            let query = search_query("name_search", filter, page_size);
            let page: PagedResponse<App> = self.get_page("appstore/apps", &query).await?;
            Ok(Page::new(page.items, page.total))
        })
    }

    fn get_app(&self, app_id: Uuid) -> GatewayFuture<'_, Option<App>> {
        Box::pin(async move { self.get(&format!("appstore/apps/{app_id}"), &[]).await })
    }

    fn get_app_settings(&self, app_id: Uuid) -> GatewayFuture<'_, Option<AppSettings>> {
        Box::pin(async move {
            let settings: Option<SettingsResponse> = self
                .get(&format!("appstore/apps/{app_id}/settings"), &[])
                .await?;
            Ok(settings.map(|s| s.provisioning))
        })
    }

    fn search_permissions(
        &self,
        app_id: Uuid,
        filter: Option<String>,
        page_size: usize,
    ) -> GatewayFuture<'_, Page<Permission>> {
        Box::pin(async move {
            let mut query = search_query("search_term", filter, page_size);
            query.push(("app_id", app_id.to_string()));
            let page: PagedResponse<PermissionResponse> =
                self.get_page("appstore/requestable_permissions", &query).await?;
            let items = page.items.into_iter().map(Permission::from).collect();
            Ok(Page::new(items, page.total))
        })
    }

    fn get_permission(&self, permission_id: Uuid) -> GatewayFuture<'_, Option<Permission>> {
        Box::pin(async move {
            let raw: Option<PermissionResponse> = self
                .get(&format!("appstore/requestable_permissions/{permission_id}"), &[])
                .await?;
            Ok(raw.map(Permission::from))
        })
    }

    fn search_users(
        &self,
        filter: Option<String>,
        page_size: usize,
    ) -> GatewayFuture<'_, Page<User>> {
        Box::pin(async move {
            let query = search_query("search_term", filter, page_size);
            let page: PagedResponse<User> = self.get_page("users", &query).await?;
            Ok(Page::new(page.items, page.total))
        })
    }

    fn create_access_request(
        &self,
        submission: AccessRequestSubmission,
    ) -> GatewayFuture<'_, Option<AccessRequest>> {
        Box::pin(async move {
            let created: Option<Vec<AccessRequest>> = self
                .send(Method::POST, "appstore/access_request", &[], Some(&submission))
                .await?;
            Ok(created.and_then(|requests| requests.into_iter().next()))
        })
    }

    fn get_access_request(&self, request_id: Uuid) -> GatewayFuture<'_, Option<AccessRequest>> {
        Box::pin(async move {
            self.get(&format!("appstore/access_requests/{request_id}"), &[])
                .await
        })
    }

    fn list_access_requests(
        &self,
        target_user_id: Uuid,
        statuses: Vec<AccessRequestStatus>,
    ) -> GatewayFuture<'_, Vec<AccessRequest>> {
        Box::pin(async move {
            let mut query = vec![
                ("size", LIST_PAGE_SIZE.to_string()),
                ("target_user_id", target_user_id.to_string()),
            ];
            query.extend(statuses.iter().map(|s| ("statuses", s.as_str().to_owned())));
            let page: PagedResponse<AccessRequest> =
                self.get_page("appstore/access_requests", &query).await?;
            let mut requests = page.items;
            requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
            Ok(requests)
        })
    }

    fn cancel_access_request(
        &self,
        request_id: Uuid,
        reason: Option<String>,
    ) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            let path = format!("appstore/access_requests/{request_id}/cancel");
            self.execute(Method::POST, &path, &[], Some(&CancelBody { reason }))
                .await?
                .ok_or_else(|| AppError::NotFound(format!("request {request_id}")))?;
            Ok(())
        })
    }
}
