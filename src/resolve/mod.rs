//! Interactive disambiguation of apps, users, and permissions.
//!
//! All three resolvers share [`search_and_select`]: search with the
//! current filter, then classify the page. No matches with a filter asks
//! for a different filter; a truncated page asks for a narrower one; a
//! single match is taken as-is; a complete page of several matches goes
//! to an interactive pick. A partial page is never offered for picking.

pub mod app;
pub mod permission;
pub mod user;

use std::future::Future;

use uuid::Uuid;

use crate::console::Console;
use crate::gateway::Page;
use crate::{AppError, Result};

pub use app::resolve_app;
pub use permission::{resolve_permissions, validate_permission_ids};
pub use user::resolve_user;

/// Prompt used whenever a new search filter is needed.
pub const SEARCH_PROMPT: &str = "🔍 Give me something to search on";

/// An entity that can be offered in a pick list.
pub trait Choice {
    /// Stable identifier.
    fn choice_id(&self) -> Uuid;
    /// One-line label shown to the operator.
    fn choice_label(&self) -> String;
}

/// How many items an interactive pick may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Exactly one item.
    Single,
    /// One or more items.
    Multiple,
}

/// Result of one search-and-select pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrowed<T> {
    /// Nothing matched and there was no filter left to change.
    NoMatches,
    /// Exactly one item matched and was taken without asking.
    Auto(T),
    /// The operator picked these items from a complete page.
    Picked(Vec<T>),
}

/// Labels for the prompts of one search-and-select pass.
#[derive(Debug, Clone, Copy)]
pub struct SearchLabels<'a> {
    /// Plural noun, e.g. `"apps"`.
    pub noun: &'a str,
    /// Progress line shown while searching.
    pub loading: &'a str,
    /// Title of the pick list.
    pub pick_title: &'a str,
}

/// Drop blank filters so that `Some("")` behaves like no filter.
#[must_use]
pub fn normalize_filter(filter: Option<String>) -> Option<String> {
    filter
        .map(|f| f.trim().to_owned())
        .filter(|f| !f.is_empty())
}

/// Search with `filter` until a page can be acted on, then select.
///
/// `filter` is updated in place with every filter the operator supplies,
/// so the caller can tell whether a filter is still active afterwards.
///
/// # Errors
///
/// Propagates gateway failures and `AppError::Prompt` from the console.
pub async fn search_and_select<T, S, Fut>(
    console: &mut dyn Console,
    labels: SearchLabels<'_>,
    filter: &mut Option<String>,
    mode: SelectionMode,
    mut search: S,
) -> Result<Narrowed<T>>
where
    T: Choice,
    S: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let page = loop {
        console.progress(labels.loading);
        let page = search(filter.clone()).await?;
        console.progress(&" ".repeat(labels.loading.chars().count()));

        if page.total == 0 {
            let Some(current) = filter.as_deref() else {
                return Ok(Narrowed::NoMatches);
            };
            console.say(&format!("No {} found for '{current}'", labels.noun));
            *filter = normalize_filter(Some(console.input(SEARCH_PROMPT)?));
        } else if page.is_truncated() {
            console.say(&format!(
                "Too many {} to show ({} of {}).",
                labels.noun,
                page.items.len(),
                page.total
            ));
            *filter = normalize_filter(Some(console.input(SEARCH_PROMPT)?));
        } else {
            break page;
        }
    };

    let mut items = page.items;
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return Ok(Narrowed::Auto(only));
        }
    }

    let options: Vec<String> = items.iter().map(Choice::choice_label).collect();
    let picked: Vec<usize> = match mode {
        SelectionMode::Single => vec![console.select(labels.pick_title, &options)?],
        SelectionMode::Multiple => console.multi_select(labels.pick_title, &options, 1)?,
    };

    let chosen: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter(|(index, _)| picked.contains(index))
        .map(|(_, item)| item)
        .collect();
    if chosen.is_empty() {
        return Err(AppError::Prompt(format!("no {} was selected", labels.noun)));
    }
    Ok(Narrowed::Picked(chosen))
}
