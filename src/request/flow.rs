//! End-to-end `request` flow: resolve, confirm, submit, optionally poll.

use tracing::debug;
use uuid::Uuid;

use crate::console::Console;
use crate::duration::{permissible_options, resolve_duration};
use crate::models::AccessRequest;
use crate::request::builder::{submit, RequestPlan, Target};
use crate::request::poller::{report_poll, PollOutcome, Poller};
use crate::resolve::{resolve_app, resolve_permissions, resolve_user};
use crate::session::Session;
use crate::Result;

/// Operator input for one `request` invocation; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    /// Explicit app ID; takes precedence over `app_like`.
    pub app_id: Option<Uuid>,
    /// App name hint.
    pub app_like: Option<String>,
    /// Explicit permission IDs; take precedence over `permission_like`.
    pub permission_ids: Vec<Uuid>,
    /// Permission name hint.
    pub permission_like: Option<String>,
    /// Access length as seconds or label text, e.g. `"12 hours"`, `"2d"`.
    pub length: Option<String>,
    /// Business justification.
    pub reason: Option<String>,
    /// Explicit target user ID.
    pub for_user: Option<Uuid>,
    /// Request for the caller without asking.
    pub for_me: bool,
    /// Target user name or email hint.
    pub user_like: Option<String>,
    /// Whether to poll after submitting; asked when `None`.
    pub wait: Option<bool>,
    /// Print the plan and stop before submitting.
    pub dry_run: bool,
}

/// How a `request` invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Nothing was submitted.
    DryRun(RequestPlan),
    /// The backend created nothing; there is no request to follow up on.
    Failed(RequestPlan),
    /// The request was created; `poll` is set when the flow waited on it.
    Submitted {
        /// The created request.
        request: AccessRequest,
        /// Result of waiting, if requested.
        poll: Option<PollOutcome>,
    },
}

/// Resolve every part of a request, confirm it, and submit it.
///
/// # Errors
///
/// Propagates resolution, validation, gateway, and polling failures. A
/// create call that yields nothing is [`RequestOutcome::Failed`], not an
/// error.
pub async fn run_request(
    session: &Session,
    console: &mut dyn Console,
    args: RequestArgs,
) -> Result<RequestOutcome> {
    let gateway = session.gateway();

    let app = resolve_app(session, console, args.app_id, args.app_like).await?;
    let settings = gateway.get_app_settings(app.id).await?;
    let (app, app_durations, visible) = match settings {
        Some(settings) => {
            let visible = settings.exposes_permissions();
            let durations = settings.time_based_access.clone();
            (app.with_settings(&settings), durations, visible)
        }
        None => (app, Vec::new(), true),
    };
    debug!(
        app_id = %app.id,
        multiple = app.allows_multiple_permission_selection,
        visible,
        "app settings applied"
    );

    let permissions = if visible {
        resolve_permissions(
            session,
            console,
            &app,
            &args.permission_ids,
            args.permission_like,
        )
        .await?
    } else {
        if !args.permission_ids.is_empty() || args.permission_like.is_some() {
            console.say(&format!(
                "{} does not expose permissions; requesting the app only",
                app.user_friendly_label
            ));
        }
        None
    };

    let options = permissible_options(&app_durations, permissions.as_deref())?;
    let duration = resolve_duration(console, &options, args.length.as_deref())?;

    let target = resolve_target(
        session,
        console,
        args.for_me,
        args.for_user,
        args.user_like,
    )
    .await?;

    let mut reason = args.reason.unwrap_or_default().trim().to_owned();
    while reason.is_empty() {
        reason = console
            .input("\nEnter your business justification for the request")?
            .trim()
            .to_owned();
    }

    let wait = match args.wait {
        Some(wait) => wait,
        None => console.confirm("Do you want to wait for the request to complete?", true)?,
    };

    let plan = RequestPlan {
        app,
        permissions,
        duration,
        reason,
        target,
        wait,
    };

    for line in plan.confirmation() {
        console.say(&line);
    }
    let command = plan.equivalent_command();
    if args.dry_run {
        console.say("\nCOMMAND");
        console.say(&format!("   {command}"));
        return Ok(RequestOutcome::DryRun(plan));
    }
    console.say("\nIf you need to make this same request in the future, use:");
    console.say(&format!("\n   `{command}`\n"));

    let Some(request) = submit(session, console, &plan).await? else {
        return Ok(RequestOutcome::Failed(plan));
    };
    if !plan.wait {
        return Ok(RequestOutcome::Submitted {
            request,
            poll: None,
        });
    }

    let polling = &session.config().polling;
    let outcome = Poller::from_config(polling)
        .poll(gateway, console, request.id, polling.default_wait_seconds)
        .await?;
    report_poll(console, &outcome);
    Ok(RequestOutcome::Submitted {
        request,
        poll: Some(outcome),
    })
}

async fn resolve_target(
    session: &Session,
    console: &mut dyn Console,
    for_me: bool,
    for_user: Option<Uuid>,
    user_like: Option<String>,
) -> Result<Target> {
    if for_me {
        return Ok(Target::Caller);
    }
    if let Some(id) = for_user {
        return Ok(Target::User { id, display: None });
    }
    if user_like.is_none() && console.confirm("This request is for you?", true)? {
        return Ok(Target::Caller);
    }

    let user = resolve_user(session, console, user_like).await?;
    if user.id == session.current_user_id().await? {
        return Ok(Target::Caller);
    }
    Ok(Target::User {
        id: user.id,
        display: Some(user.to_string()),
    })
}
