//! Access-length labels: parsing, intersection, and selection.
//!
//! The backend describes how long access may be granted with free-form
//! labels such as `"1 hour"`, `"3 days"`, or `"unlimited"`. A label is
//! scaled when it reads `<integer> <unit>` with unit `hour(s)` or
//! `day(s)` (case-insensitive). Labels without an amount, such as
//! `"unlimited"`, have no length and are submitted as unlimited; labels
//! with an amount in any other unit cannot be requested.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::console::Console;
use crate::models::Permission;
use crate::{AppError, Result};

const SECONDS_PER_HOUR: u64 = 3600;
const HOURS_PER_DAY: u64 = 24;

/// Label shown when no access length applies.
pub const UNLIMITED_LABEL: &str = "Unlimited";

fn label_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(\d+)\s+([A-Za-z]+)").ok())
        .as_ref()
}

/// Parse a label into its length in seconds and its normalized key.
///
/// The key is the label lowercased with all spaces removed; it is what
/// user-supplied `--length` text is prefix-matched against.
#[must_use]
pub fn parse_duration_label(label: &str) -> (Option<u64>, String) {
    let key = label.replace(' ', "").to_lowercase();
    let seconds = label_pattern()
        .and_then(|re| re.captures(label))
        .and_then(|caps| {
            let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            let hours = match unit.as_str() {
                "hour" | "hours" => amount,
                "day" | "days" => amount.checked_mul(HOURS_PER_DAY)?,
                _ => return None,
            };
            hours.checked_mul(SECONDS_PER_HOUR)
        });
    (seconds, key)
}

/// Whether `label` starts with an amount, e.g. `"30 minutes"`, whatever
/// its unit.
#[must_use]
pub fn has_amount(label: &str) -> bool {
    label_pattern().is_some_and(|re| re.is_match(label))
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (parse_duration_label(a).0, parse_duration_label(b).0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// De-duplicate labels and order them shortest first, unscaled labels last.
#[must_use]
pub fn canonical_options<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let unique: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
    let mut options: Vec<String> = unique.into_iter().collect();
    options.sort_by(|a, b| compare_labels(a, b));
    options
}

/// Labels legal for every permission in `permissions`.
///
/// Permissions without any label do not constrain the result. The output
/// is in canonical order, so it does not depend on the input order.
#[must_use]
pub fn intersect_duration_options(permissions: &[Permission]) -> Vec<String> {
    let mut constrained = permissions
        .iter()
        .filter(|p| !p.duration_options.is_empty())
        .map(|p| p.duration_options.iter().cloned().collect::<BTreeSet<String>>());

    let Some(first) = constrained.next() else {
        return Vec::new();
    };
    let common = constrained.fold(first, |acc, next| acc.intersection(&next).cloned().collect());
    canonical_options(common)
}

/// Labels a request may choose from.
///
/// App-only requests use the app-level labels. For permission requests the
/// labels are intersected; if the permissions declare labels but share
/// none, the combination cannot be requested.
///
/// # Errors
///
/// Returns `AppError::Validation` when the selected permissions have no
/// access length in common.
pub fn permissible_options(
    app_options: &[String],
    permissions: Option<&[Permission]>,
) -> Result<Vec<String>> {
    let Some(permissions) = permissions.filter(|p| !p.is_empty()) else {
        return Ok(canonical_options(app_options.iter().cloned()));
    };

    let common = intersect_duration_options(permissions);
    let constrained = permissions.iter().any(|p| !p.duration_options.is_empty());
    if constrained && common.is_empty() {
        let labels: Vec<&str> = permissions.iter().map(|p| p.label.as_str()).collect();
        return Err(AppError::Validation(format!(
            "permissions {} share no access length; request them separately",
            labels.join(", ")
        )));
    }
    Ok(common)
}

/// Find the option the caller asked for with `--length`.
///
/// Integer input matches an option of exactly that many seconds. Any
/// other input is prefix-matched, ignoring case and spaces, against the
/// normalized option keys; the first match in `options` order wins.
#[must_use]
pub fn match_requested_length(options: &[String], requested: &str) -> Option<String> {
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }

    if let Ok(seconds) = requested.parse::<u64>() {
        return options
            .iter()
            .find(|label| parse_duration_label(label).0 == Some(seconds))
            .cloned();
    }

    let wanted = requested.replace(' ', "").to_lowercase();
    options
        .iter()
        .find(|label| parse_duration_label(label).1.starts_with(&wanted))
        .cloned()
}

/// The access length chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDuration {
    /// Length in seconds; `None` means unlimited.
    pub seconds: Option<u64>,
    /// Label as offered by the backend.
    pub label: String,
}

impl ResolvedDuration {
    /// Duration with no end.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            seconds: None,
            label: UNLIMITED_LABEL.to_owned(),
        }
    }

    fn from_label(label: String) -> Self {
        Self {
            seconds: parse_duration_label(&label).0,
            label,
        }
    }

    /// Length rendered for humans, e.g. `"72 hours (259200 seconds)"`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.seconds {
            Some(seconds) => format!(
                "{} hours ({seconds} seconds)",
                seconds / SECONDS_PER_HOUR
            ),
            None => UNLIMITED_LABEL.to_owned(),
        }
    }
}

/// Choose an access length from `options`, asking only when needed.
///
/// # Errors
///
/// Returns `AppError::Prompt` if the operator's choice cannot be read,
/// and `AppError::Validation` if the chosen label has an amount in a unit
/// that cannot be converted to seconds.
pub fn resolve_duration(
    console: &mut dyn Console,
    options: &[String],
    requested: Option<&str>,
) -> Result<ResolvedDuration> {
    let options = canonical_options(options.iter().cloned());
    if options.is_empty() {
        if requested.is_some() {
            console.say("This request has no configurable access length; ignoring --length");
        }
        return Ok(ResolvedDuration::unlimited());
    }

    let matched = requested.and_then(|r| match_requested_length(&options, r));

    let label = if let [only] = options.as_slice() {
        only.clone()
    } else if let Some(label) = matched {
        label
    } else {
        let index = console.select("Select duration (use ENTER to confirm)", &options)?;
        options
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::Prompt(format!("duration choice {index} is out of range")))?
    };

    let resolved = ResolvedDuration::from_label(label);
    if resolved.seconds.is_none() && has_amount(&resolved.label) {
        return Err(AppError::Validation(format!(
            "access length '{}' uses an unsupported unit; only hours and days are understood",
            resolved.label
        )));
    }
    match resolved.seconds {
        Some(seconds) => console.say(&format!("DURATION: {} ({seconds} seconds)", resolved.label)),
        None => console.say(&format!("DURATION: {}", resolved.label)),
    }
    Ok(resolved)
}
