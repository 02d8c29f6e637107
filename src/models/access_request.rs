//! Access request model and lifecycle status.

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Permission, User};
use crate::resolve::Choice;

/// Lifecycle status of an access request, as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRequestStatus {
    /// Just created; nothing has happened yet.
    Pending,
    /// Waiting on the requester's manager.
    PendingManagerApproval,
    /// Manager approved.
    ManagerApproved,
    /// Manager denied.
    ManagerDenied,
    /// Waiting on an app approver.
    PendingApproval,
    /// Approved by an approver or automatically.
    Approved,
    /// Denied by an approver.
    Denied,
    /// Nobody acted on the request in time.
    Expired,
    /// Cancelled by the requester.
    Cancelled,
    /// Entered provisioning; manual or automatic is not yet known.
    PendingProvisioning,
    /// Waiting on an admin to provision manually.
    PendingManualProvisioning,
    /// Admin refused to provision.
    DeniedProvisioning,
    /// Provisioned; waiting on final cleanup.
    Provisioned,
    /// Time-bounded access elapsed but automatic removal failed.
    PendingManualDeprovisioning,
    /// Time-bounded access elapsed and was removed.
    TimeBasedExpired,
    /// Fully finalized.
    Completed,
    /// Undo requested; revert in progress.
    Reverting,
    /// Undo finished.
    Reverted,
}

impl AccessRequestStatus {
    /// Every status, in backend contract order.
    pub const ALL: [Self; 18] = [
        Self::Pending,
        Self::PendingManagerApproval,
        Self::ManagerApproved,
        Self::ManagerDenied,
        Self::PendingApproval,
        Self::Approved,
        Self::Denied,
        Self::Expired,
        Self::Cancelled,
        Self::PendingProvisioning,
        Self::PendingManualProvisioning,
        Self::DeniedProvisioning,
        Self::Provisioned,
        Self::PendingManualDeprovisioning,
        Self::TimeBasedExpired,
        Self::Completed,
        Self::Reverting,
        Self::Reverted,
    ];

    /// Whether the request has not yet reached an outcome.
    ///
    /// This is the only place the in-flight set is defined; polling,
    /// cancellation, and request filters all derive from it.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::PendingManagerApproval
                | Self::PendingApproval
                | Self::PendingProvisioning
        )
    }

    /// All in-flight statuses, in contract order.
    #[must_use]
    pub fn in_flight() -> Vec<Self> {
        Self::ALL.into_iter().filter(|s| s.is_in_flight()).collect()
    }

    /// Wire representation, e.g. `PENDING_APPROVAL`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PendingManagerApproval => "PENDING_MANAGER_APPROVAL",
            Self::ManagerApproved => "MANAGER_APPROVED",
            Self::ManagerDenied => "MANAGER_DENIED",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
            Self::PendingProvisioning => "PENDING_PROVISIONING",
            Self::PendingManualProvisioning => "PENDING_MANUAL_PROVISIONING",
            Self::DeniedProvisioning => "DENIED_PROVISIONING",
            Self::Provisioned => "PROVISIONED",
            Self::PendingManualDeprovisioning => "PENDING_MANUAL_DEPROVISIONING",
            Self::TimeBasedExpired => "TIME_BASED_EXPIRED",
            Self::Completed => "COMPLETED",
            Self::Reverting => "REVERTING",
            Self::Reverted => "REVERTED",
        }
    }
}

impl Display for AccessRequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An access request tracked by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AccessRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Display name of the requested app.
    pub app_name: String,
    /// Current lifecycle status.
    pub status: AccessRequestStatus,
    /// Creation time (UTC).
    pub requested_at: NaiveDateTime,
    /// Time at which granted access lapses, if time-bounded.
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
    /// User who filed the request.
    pub requester_user: User,
    /// Approver or admin who handled the request.
    #[serde(default)]
    pub supporter_user: Option<User>,
    /// User who receives the access.
    pub target_user: User,
    /// Identifiers of the requested permissions.
    #[serde(default)]
    pub requestable_permission_ids: Vec<Uuid>,
    /// Resolved permissions, attached client-side after fetch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

impl AccessRequest {
    /// Whether the request targets someone other than its requester.
    #[must_use]
    pub fn is_for_other_user(&self) -> bool {
        self.requester_user.id != self.target_user.id
    }
}

impl Choice for AccessRequest {
    fn choice_id(&self) -> Uuid {
        self.id
    }

    fn choice_label(&self) -> String {
        format!(
            "{} ({}) requested {}",
            self.app_name,
            self.status,
            self.requested_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Payload for creating an access request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AccessRequestSubmission {
    /// App to request.
    pub app_id: Uuid,
    /// Business justification.
    pub note: String,
    /// Permissions to request; absent for app-only requests.
    #[serde(
        rename = "requestable_permission_ids",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub permission_ids: Option<Vec<Uuid>>,
    /// Access length in seconds; absent means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_in_seconds: Option<u64>,
    /// User who receives the access; absent means the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<Uuid>,
}
