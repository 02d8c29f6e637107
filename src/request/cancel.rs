//! Request cancellation.

use tracing::info;
use uuid::Uuid;

use crate::console::Console;
use crate::models::AccessRequestStatus;
use crate::resolve::Choice;
use crate::session::Session;
use crate::{AppError, Result};

/// Cancel an in-flight request.
///
/// Without `request_id` the operator may type one, or press enter to pick
/// from their in-flight requests. Requests that already left the
/// in-flight set are refused without contacting the cancel endpoint.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the request does not exist or there is
/// nothing to pick, and `AppError::Validation` if it is no longer pending.
pub async fn cancel_request(
    session: &Session,
    console: &mut dyn Console,
    request_id: Option<String>,
    reason: Option<String>,
) -> Result<Uuid> {
    let request_id = match request_id {
        Some(raw) => super::prompt_request_id(console, Some(raw))?,
        None => match console
            .input_optional("Please provide a request ID or press enter to look up a request")?
        {
            Some(raw) => super::prompt_request_id(console, Some(raw))?,
            None => pick_pending(session, console).await?,
        },
    };

    let gateway = session.gateway();
    let request = gateway
        .get_access_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("request {request_id}")))?;

    if !request.status.is_in_flight() {
        return Err(AppError::Validation(format!(
            "request is not pending, cannot cancel; status is {}",
            request.status
        )));
    }

    gateway.cancel_access_request(request_id, reason).await?;
    info!(%request_id, "access request cancelled");
    console.say("Request cancelled! 🚫");
    Ok(request_id)
}

async fn pick_pending(session: &Session, console: &mut dyn Console) -> Result<Uuid> {
    let caller = session.current_user_id().await?;
    let pending = session
        .gateway()
        .list_access_requests(caller, AccessRequestStatus::in_flight())
        .await?;
    if pending.is_empty() {
        return Err(AppError::NotFound("no pending requests found".into()));
    }

    let options: Vec<String> = pending.iter().map(Choice::choice_label).collect();
    let index = console.select("Select a request to cancel", &options)?;
    pending
        .get(index)
        .map(Choice::choice_id)
        .ok_or_else(|| AppError::Prompt(format!("request choice {index} is out of range")))
}
