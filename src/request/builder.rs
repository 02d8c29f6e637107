//! Request assembly, confirmation rendering, and submission.

use tracing::{info, warn};
use uuid::Uuid;

use crate::console::Console;
use crate::duration::{parse_duration_label, ResolvedDuration};
use crate::models::{AccessRequest, AccessRequestSubmission, App, Permission};
use crate::session::Session;
use crate::Result;

/// Who receives the requested access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The authenticated caller.
    Caller,
    /// Another user.
    User {
        /// Identifier of the user.
        id: Uuid,
        /// Human-readable name, when it was resolved by search.
        display: Option<String>,
    },
}

impl Target {
    fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Caller => None,
            Self::User { id, .. } => Some(*id),
        }
    }
}

/// A fully resolved access request, ready to confirm and submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// App to request.
    pub app: App,
    /// Permissions to request; `None` for app-only requests.
    pub permissions: Option<Vec<Permission>>,
    /// Access length.
    pub duration: ResolvedDuration,
    /// Business justification.
    pub reason: String,
    /// Who receives the access.
    pub target: Target,
    /// Whether to poll after submitting.
    pub wait: bool,
}

/// Quote `text` for a POSIX shell double-quoted string.
fn shell_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl RequestPlan {
    /// Permissions requested, or an empty slice for app-only requests.
    #[must_use]
    pub fn permission_slice(&self) -> &[Permission] {
        self.permissions.as_deref().unwrap_or_default()
    }

    /// Human-readable summary printed before submitting.
    #[must_use]
    pub fn confirmation(&self) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            "APP".to_owned(),
            format!("   {} [{}]", self.app.user_friendly_label, self.app.id),
        ];

        if !self.permission_slice().is_empty() {
            lines.push(String::new());
            lines.push("PERMISSIONS".to_owned());
            for permission in self.permission_slice() {
                lines.push(format!("   {} [{}]", permission.label, permission.id));
            }
        }

        lines.push(String::new());
        lines.push("DURATION".to_owned());
        lines.push(format!("   {}", self.duration.describe()));
        lines.push(String::new());
        lines.push("REASON".to_owned());
        lines.push(format!("   {}", self.reason));

        if let Target::User { id, display } = &self.target {
            lines.push(String::new());
            lines.push("TARGET USER".to_owned());
            match display {
                Some(display) => lines.push(format!("   {display} [{id}]")),
                None => lines.push(format!("   {id}")),
            }
        }
        lines
    }

    /// Command line that repeats this exact request without prompts.
    #[must_use]
    pub fn equivalent_command(&self) -> String {
        let mut parts = vec![
            "lumos request".to_owned(),
            format!("--app {}", self.app.id),
        ];
        for permission in self.permission_slice() {
            parts.push(format!("--permission {}", permission.id));
        }
        parts.push(format!("--reason {}", shell_quote(&self.reason)));

        match self.duration.seconds {
            Some(seconds) => parts.push(format!("--length {seconds}")),
            None if self.duration != ResolvedDuration::unlimited() => {
                let (_, key) = parse_duration_label(&self.duration.label);
                parts.push(format!("--length {}", shell_quote(&key)));
            }
            None => {}
        }

        match &self.target {
            Target::Caller => parts.push("--for-me".to_owned()),
            Target::User { id, .. } => parts.push(format!("--for-user {id}")),
        }
        parts.push(if self.wait { "--wait" } else { "--no-wait" }.to_owned());
        parts.join(" ")
    }

    /// Payload for the create call.
    #[must_use]
    pub fn submission(&self) -> AccessRequestSubmission {
        let permission_ids: Vec<Uuid> = self.permission_slice().iter().map(|p| p.id).collect();
        AccessRequestSubmission {
            app_id: self.app.id,
            note: self.reason.clone(),
            permission_ids: (!permission_ids.is_empty()).then_some(permission_ids),
            expiration_in_seconds: self.duration.seconds,
            target_user_id: self.target.user_id(),
        }
    }
}

/// Submit `plan` to the backend.
///
/// `Ok(None)` means the backend created nothing; the operator is told
/// the request failed and there is no request ID to follow up on.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn submit(
    session: &Session,
    console: &mut dyn Console,
    plan: &RequestPlan,
) -> Result<Option<AccessRequest>> {
    let created = session
        .gateway()
        .create_access_request(plan.submission())
        .await?;

    let Some(request) = created else {
        warn!(app_id = %plan.app.id, "backend created no access request");
        console.say("\n ❌ Request failed");
        return Ok(None);
    };

    info!(request_id = %request.id, app_id = %plan.app.id, "access request created");
    console.say(&format!(
        "\nYour request (ID {}) is in progress! 🏃🌴\n",
        request.id
    ));
    Ok(Some(request))
}
