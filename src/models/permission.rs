//! Requestable permission model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolve::Choice;

/// A requestable permission (role or entitlement) scoped to one app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Permission {
    /// Unique permission identifier.
    pub id: Uuid,
    /// Display name shown to operators.
    pub label: String,
    /// Identifier of the owning app.
    pub app_id: Uuid,
    /// Integration class of the owning app.
    #[serde(default)]
    pub app_class_id: String,
    /// Access-length labels, e.g. `"1 hour"`, `"3 days"`, `"unlimited"`.
    #[serde(default)]
    pub duration_options: Vec<String>,
}

impl Permission {
    /// Whether this permission is owned by the app with `app_id`.
    #[must_use]
    pub fn belongs_to(&self, app_id: Uuid) -> bool {
        self.app_id == app_id
    }
}

impl Choice for Permission {
    fn choice_id(&self) -> Uuid {
        self.id
    }

    fn choice_label(&self) -> String {
        self.label.clone()
    }
}
