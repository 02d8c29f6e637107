//! Per-process session context.
//!
//! A [`Session`] is built once at startup and passed explicitly to every
//! flow. It owns the backend gateway, the loaded configuration, and the
//! memoized identity of the caller.

use std::sync::Arc;

use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::GlobalConfig;
use crate::gateway::Gateway;
use crate::models::User;
use crate::Result;

/// Explicit replacement for process-global session state.
pub struct Session {
    config: GlobalConfig,
    gateway: Arc<dyn Gateway>,
    current_user: OnceCell<User>,
}

impl Session {
    /// Create a session around a gateway.
    #[must_use]
    pub fn new(config: GlobalConfig, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            config,
            gateway,
            current_user: OnceCell::new(),
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Backend gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    /// Page size for interactive searches.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// The authenticated caller, fetched at most once per process.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure when the caller cannot be identified.
    pub async fn current_user(&self) -> Result<&User> {
        self.current_user
            .get_or_try_init(|| self.gateway.current_user())
            .await
    }

    /// Identifier of the authenticated caller.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure when the caller cannot be identified.
    pub async fn current_user_id(&self) -> Result<Uuid> {
        Ok(self.current_user().await?.id)
    }
}
