//! Permission resolution and validation against the selected app.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::console::Console;
use crate::models::{App, Permission};
use crate::resolve::{
    normalize_filter, search_and_select, Narrowed, SearchLabels, SelectionMode, SEARCH_PROMPT,
};
use crate::session::Session;
use crate::{AppError, Result};

/// Fetch explicitly named permissions and check they fit `app`.
///
/// The whole set is rejected (an empty vector is returned) when any ID
/// does not resolve, any permission belongs to another app, or more than
/// one ID is given (repeats included) for an app that allows only one
/// permission per request.
///
/// # Errors
///
/// Propagates gateway transport failures.
pub async fn validate_permission_ids(
    session: &Session,
    app: &App,
    permission_ids: &[Uuid],
) -> Result<Vec<Permission>> {
    if permission_ids.is_empty() {
        return Ok(Vec::new());
    }
    if permission_ids.len() > 1 && !app.allows_multiple_permission_selection {
        debug!(app_id = %app.id, "app allows a single permission per request");
        return Ok(Vec::new());
    }

    let mut unique: Vec<Uuid> = Vec::with_capacity(permission_ids.len());
    for permission_id in permission_ids {
        if !unique.contains(permission_id) {
            unique.push(*permission_id);
        }
    }

    let mut valid: Vec<Permission> = Vec::with_capacity(unique.len());
    for permission_id in unique {
        let Some(permission) = session.gateway().get_permission(permission_id).await? else {
            debug!(%permission_id, "permission not found");
            return Ok(Vec::new());
        };
        if !permission.belongs_to(app.id) {
            debug!(%permission_id, app_id = %app.id, "permission belongs to another app");
            return Ok(Vec::new());
        }
        valid.push(permission);
    }
    Ok(valid)
}

/// Resolve the permissions to request for `app`.
///
/// Valid explicit IDs are returned without searching. Otherwise
/// permissions are collected over one or more search rounds; apps that
/// allow several permissions per request keep offering rounds until the
/// operator is done. `Ok(None)` means the app has no requestable
/// permission and the request is for the app alone.
///
/// # Errors
///
/// Returns `AppError::Validation` if nothing selected belongs to `app`,
/// and propagates gateway and console failures.
pub async fn resolve_permissions(
    session: &Session,
    console: &mut dyn Console,
    app: &App,
    permission_ids: &[Uuid],
    permission_like: Option<String>,
) -> Result<Option<Vec<Permission>>> {
    let valid = validate_permission_ids(session, app, permission_ids).await?;
    if !valid.is_empty() {
        announce(console, &valid);
        return Ok(Some(valid));
    }
    if !permission_ids.is_empty() {
        console.say("The given permissions can't be requested for this app; select them below.");
    }

    let gateway = session.gateway();
    let page_size = session.page_size();
    let multiple = app.allows_multiple_permission_selection;
    let mode = if multiple {
        SelectionMode::Multiple
    } else {
        SelectionMode::Single
    };

    let mut filter = normalize_filter(permission_like);
    let mut selected: Vec<Permission> = Vec::new();

    loop {
        let title = pick_title(multiple, &selected);
        let labels = SearchLabels {
            noun: "permissions",
            loading: "⏳ Loading permissions for app ...",
            pick_title: &title,
        };
        let narrowed = search_and_select(console, labels, &mut filter, mode, |f| {
            gateway.search_permissions(app.id, f, page_size)
        })
        .await?;

        match narrowed {
            Narrowed::NoMatches if selected.is_empty() => {
                console.say("No permissions found (you're just requesting the app)");
                return Ok(None);
            }
            Narrowed::NoMatches => break,
            Narrowed::Auto(permission) => {
                accumulate(&mut selected, app, permission);
                filter = None;
            }
            Narrowed::Picked(permissions) => {
                for permission in permissions {
                    accumulate(&mut selected, app, permission);
                }
            }
        }

        announce(console, &selected);
        if filter.is_none() || !multiple {
            break;
        }
        if console.confirm("Done selecting permissions?", true)? {
            break;
        }
        filter = normalize_filter(Some(console.input(SEARCH_PROMPT)?));
    }

    if selected.is_empty() {
        return Err(AppError::Validation(format!(
            "no selected permission belongs to app {}",
            app.id
        )));
    }
    Ok(Some(selected))
}

fn pick_title(multiple: bool, selected: &[Permission]) -> String {
    if !multiple {
        return "Select permission (use ENTER to confirm)".to_owned();
    }
    let mut title = "Select at least one permission".to_owned();
    if !selected.is_empty() {
        let labels: Vec<&str> = selected.iter().map(|p| p.label.as_str()).collect();
        title.push_str(&format!("\n(already selected: {})", labels.join(", ")));
    }
    title
}

/// Add `permission` unless it is already selected or foreign to `app`.
fn accumulate(selected: &mut Vec<Permission>, app: &App, permission: Permission) {
    if !permission.belongs_to(app.id) {
        warn!(permission_id = %permission.id, app_id = %app.id, "dropping permission of another app");
        return;
    }
    if !selected.iter().any(|p| p.id == permission.id) {
        selected.push(permission);
    }
}

fn announce(console: &mut dyn Console, permissions: &[Permission]) {
    console.say("PERMISSIONS:");
    for permission in permissions {
        console.say(&format!("   {} [{}]", permission.label, permission.id));
    }
}
