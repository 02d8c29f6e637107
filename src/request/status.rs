//! Request inspection.

use uuid::Uuid;

use crate::console::Console;
use crate::models::AccessRequest;
use crate::session::Session;
use crate::{AppError, Result};

/// Which part of a request to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusView {
    /// Every field.
    #[default]
    Full,
    /// The status only.
    StatusOnly,
    /// Permission labels only, one per line.
    PermissionsOnly,
    /// The request ID only.
    IdOnly,
}

/// Fetch a request by ID with its permissions attached.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the request does not exist.
pub async fn fetch_request(session: &Session, request_id: Uuid) -> Result<AccessRequest> {
    let gateway = session.gateway();
    let mut request = gateway
        .get_access_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("request {request_id}")))?;

    let mut permissions = Vec::with_capacity(request.requestable_permission_ids.len());
    for permission_id in &request.requestable_permission_ids {
        if let Some(permission) = gateway.get_permission(*permission_id).await? {
            permissions.push(permission);
        }
    }
    request.permissions = permissions;
    Ok(request)
}

/// Print a request, chosen by ID or as the caller's most recent one.
///
/// With `last`, the caller's newest request is shown; having none is not
/// an error.
///
/// # Errors
///
/// Returns `AppError::NotFound` if an explicit request ID does not exist.
pub async fn show_status(
    session: &Session,
    console: &mut dyn Console,
    request_id: Option<Uuid>,
    last: bool,
    view: StatusView,
) -> Result<Option<AccessRequest>> {
    let request_id = if last {
        let caller = session.current_user_id().await?;
        let requests = session
            .gateway()
            .list_access_requests(caller, Vec::new())
            .await?;
        let Some(newest) = requests.into_iter().max_by_key(|r| r.requested_at) else {
            console.say("No requests found");
            return Ok(None);
        };
        newest.id
    } else {
        match request_id {
            Some(id) => id,
            None => super::prompt_request_id(console, None)?,
        }
    };

    let request = fetch_request(session, request_id).await?;
    render(console, &request, view);
    Ok(Some(request))
}

fn render(console: &mut dyn Console, request: &AccessRequest, view: StatusView) {
    match view {
        StatusView::StatusOnly => console.say(request.status.as_str()),
        StatusView::IdOnly => console.say(&request.id.to_string()),
        StatusView::PermissionsOnly => {
            for permission in &request.permissions {
                console.say(&permission.label);
            }
        }
        StatusView::Full => {
            let permissions = if request.permissions.is_empty() {
                "-----".to_owned()
            } else {
                request
                    .permissions
                    .iter()
                    .map(|p| p.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let target = if request.is_for_other_user() {
                request.target_user.full_name()
            } else {
                "(self)".to_owned()
            };
            let expires = request
                .expires_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_default();

            console.say(&format!("ID:           {}", request.id));
            console.say(&format!("App:          {}", request.app_name));
            console.say(&format!("Permissions:  {permissions}"));
            console.say(&format!("Requester:    {}", request.requester_user.full_name()));
            console.say(&format!("For:          {target}"));
            console.say(&format!("Status:       {}", request.status));
            console.say(&format!(
                "Requested at: {}",
                request.requested_at.format("%Y-%m-%d %H:%M UTC")
            ));
            console.say(&format!("Expires at:   {expires}"));
        }
    }
}
