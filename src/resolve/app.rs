//! App resolution.

use tracing::debug;
use uuid::Uuid;

use crate::console::Console;
use crate::models::App;
use crate::resolve::{normalize_filter, search_and_select, Narrowed, SearchLabels, SelectionMode};
use crate::session::Session;
use crate::{AppError, Result};

const APP_LABELS: SearchLabels<'static> = SearchLabels {
    noun: "apps",
    loading: "⏳ Loading your apps ...",
    pick_title: "Select an app (press ENTER to confirm)",
};

/// Resolve the app to request from an explicit ID or a name hint.
///
/// An explicit `app_id` that resolves is returned without searching.
/// Otherwise, including when `app_id` is unknown, apps are searched with
/// `app_like` and narrowed until one is chosen.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no app matches and there is no filter
/// left to change.
pub async fn resolve_app(
    session: &Session,
    console: &mut dyn Console,
    app_id: Option<Uuid>,
    app_like: Option<String>,
) -> Result<App> {
    let gateway = session.gateway();

    if let Some(app_id) = app_id {
        if let Some(app) = gateway.get_app(app_id).await? {
            announce(console, &app);
            return Ok(app);
        }
        console.say(&format!("App {app_id} not found, searching instead"));
    }

    let page_size = session.page_size();
    let mut filter = normalize_filter(app_like);
    let narrowed = search_and_select(
        console,
        APP_LABELS,
        &mut filter,
        SelectionMode::Single,
        |f| gateway.search_apps(f, page_size),
    )
    .await?;

    let app = match narrowed {
        Narrowed::NoMatches => return Err(AppError::NotFound("no apps found".into())),
        Narrowed::Auto(app) => app,
        Narrowed::Picked(apps) => apps
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Prompt("no app was selected".into()))?,
    };
    debug!(app_id = %app.id, filter = ?filter, "app resolved");
    announce(console, &app);
    Ok(app)
}

fn announce(console: &mut dyn Console, app: &App) {
    console.say(&format!("APP: {} [{}]\n", app.user_friendly_label, app.id));
}
