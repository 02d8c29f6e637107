//! Access request lifecycle: build, submit, poll, inspect, cancel.

pub mod builder;
pub mod cancel;
pub mod flow;
pub mod poller;
pub mod status;

use uuid::Uuid;

use crate::console::Console;
use crate::Result;

pub use builder::{RequestPlan, Target};
pub use cancel::cancel_request;
pub use flow::{run_request, RequestArgs, RequestOutcome};
pub use poller::{report_poll, PollOutcome, Poller};
pub use status::{show_status, StatusView};

/// Parse `raw` as a request ID, asking again until one parses.
///
/// # Errors
///
/// Returns `AppError::Prompt` when input is closed.
pub fn prompt_request_id(console: &mut dyn Console, raw: Option<String>) -> Result<Uuid> {
    let mut candidate = raw;
    loop {
        if let Some(text) = candidate.as_deref() {
            match Uuid::parse_str(text.trim()) {
                Ok(id) => return Ok(id),
                Err(_) => console.say("Invalid request ID"),
            }
        }
        candidate = Some(console.input("Please provide a request ID")?);
    }
}
