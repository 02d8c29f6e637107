//! Backend gateway abstraction.
//!
//! The [`Gateway`] trait is the only way the resolvers, the request
//! builder, and the poller talk to the access-governance backend. Each
//! call either yields a value or fails; none of them retry. The HTTP
//! implementation lives in [`http`]; tests substitute an in-memory fake.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use crate::models::{
    AccessRequest, AccessRequestStatus, AccessRequestSubmission, App, AppSettings, Permission,
    User,
};
use crate::Result;

/// Boxed future returned by every [`Gateway`] method.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// One page of search results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Number of matches across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Build a page from its items and the overall match count.
    #[must_use]
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    /// Whether more matches exist than this page carries.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.items.len() < self.total
    }
}

/// Operations consumed from the access-governance backend.
pub trait Gateway: Send + Sync {
    /// Fetch the user the current credentials belong to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`](crate::AppError::Unauthorized) when
    /// the credentials are rejected.
    fn current_user(&self) -> GatewayFuture<'_, User>;

    /// Search requestable apps by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn search_apps(&self, filter: Option<String>, page_size: usize) -> GatewayFuture<'_, Page<App>>;

    /// Fetch one app; `Ok(None)` when the ID does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn get_app(&self, app_id: Uuid) -> GatewayFuture<'_, Option<App>>;

    /// Fetch the request settings of an app; `Ok(None)` when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn get_app_settings(&self, app_id: Uuid) -> GatewayFuture<'_, Option<AppSettings>>;

    /// Search the requestable permissions of one app.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn search_permissions(
        &self,
        app_id: Uuid,
        filter: Option<String>,
        page_size: usize,
    ) -> GatewayFuture<'_, Page<Permission>>;

    /// Fetch one permission; `Ok(None)` when the ID does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn get_permission(&self, permission_id: Uuid) -> GatewayFuture<'_, Option<Permission>>;

    /// Search users by name or email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn search_users(&self, filter: Option<String>, page_size: usize)
        -> GatewayFuture<'_, Page<User>>;

    /// Create an access request; `Ok(None)` when the backend returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn create_access_request(
        &self,
        submission: AccessRequestSubmission,
    ) -> GatewayFuture<'_, Option<AccessRequest>>;

    /// Fetch one access request; `Ok(None)` when the ID does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn get_access_request(&self, request_id: Uuid) -> GatewayFuture<'_, Option<AccessRequest>>;

    /// List requests targeting a user, newest first.
    ///
    /// An empty `statuses` slice means every status.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) on transport failure.
    fn list_access_requests(
        &self,
        target_user_id: Uuid,
        statuses: Vec<AccessRequestStatus>,
    ) -> GatewayFuture<'_, Vec<AccessRequest>>;

    /// Cancel an access request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`](crate::AppError::Api) when the backend
    /// refuses the cancellation.
    fn cancel_access_request(
        &self,
        request_id: Uuid,
        reason: Option<String>,
    ) -> GatewayFuture<'_, ()>;
}
