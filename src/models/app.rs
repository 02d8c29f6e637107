//! Requestable app model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolve::Choice;

/// An app in the app store that access can be requested for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct App {
    /// Unique app identifier.
    pub id: Uuid,
    /// Display name shown to operators.
    pub user_friendly_label: String,
    /// Integration class the app is an instance of.
    #[serde(default)]
    pub app_class_id: String,
    /// Integration instance identifier.
    #[serde(default)]
    pub instance_id: String,
    /// Whether a single request may carry more than one permission.
    #[serde(default, alias = "allow_multiple_permission_selection")]
    pub allows_multiple_permission_selection: bool,
}

impl App {
    /// Return this app with its request settings applied.
    #[must_use]
    pub fn with_settings(mut self, settings: &AppSettings) -> Self {
        self.allows_multiple_permission_selection = settings.allow_multiple_permission_selection;
        self
    }
}

impl Choice for App {
    fn choice_id(&self) -> Uuid {
        self.id
    }

    fn choice_label(&self) -> String {
        self.user_friendly_label.clone()
    }
}

/// Request configuration attached to an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AppSettings {
    /// Whether a single request may carry more than one permission.
    #[serde(default)]
    pub allow_multiple_permission_selection: bool,
    /// Access-length labels offered for app-only requests.
    #[serde(default)]
    pub time_based_access: Vec<String>,
    /// How granted access is provisioned, and whether permissions are shown.
    #[serde(default)]
    pub groups_provisioning: GroupsProvisioning,
}

impl AppSettings {
    /// Whether requesters pick individual permissions for this app.
    #[must_use]
    pub fn exposes_permissions(&self) -> bool {
        self.groups_provisioning == GroupsProvisioning::GroupsAndVisible
    }
}

/// Provisioning mode of an app's request settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupsProvisioning {
    /// Access goes through groups the requester can see and pick.
    #[default]
    GroupsAndVisible,
    /// Access goes through groups hidden from the requester.
    GroupsAndHidden,
    /// Access is granted to the user directly.
    DirectToUser,
    /// A mode this client does not know; permissions stay hidden.
    #[serde(other)]
    Other,
}
