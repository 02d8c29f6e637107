//! Target-user resolution for requests made on someone else's behalf.

use crate::console::Console;
use crate::models::User;
use crate::resolve::{normalize_filter, search_and_select, Narrowed, SearchLabels, SelectionMode};
use crate::session::Session;
use crate::{AppError, Result};

const USER_LABELS: SearchLabels<'static> = SearchLabels {
    noun: "users",
    loading: "⏳ Loading users ...",
    pick_title: "Select user (use ENTER to confirm)",
};

/// Resolve the user a request is for from a name or email hint.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no user exists and there is no filter
/// left to change.
pub async fn resolve_user(
    session: &Session,
    console: &mut dyn Console,
    user_like: Option<String>,
) -> Result<User> {
    let gateway = session.gateway();
    let page_size = session.page_size();
    let mut filter = normalize_filter(user_like);

    let narrowed = search_and_select(
        console,
        USER_LABELS,
        &mut filter,
        SelectionMode::Single,
        |f| gateway.search_users(f, page_size),
    )
    .await?;

    let user = match narrowed {
        Narrowed::NoMatches => return Err(AppError::NotFound("no users found".into())),
        Narrowed::Auto(user) => user,
        Narrowed::Picked(users) => users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Prompt("no user was selected".into()))?,
    };
    console.say(&format!("USER: {} [{}]\n", user.email, user.id));
    Ok(user)
}
