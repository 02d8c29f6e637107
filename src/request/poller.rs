//! Bounded polling of a request until it leaves the in-flight set.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::config::PollingConfig;
use crate::console::Console;
use crate::gateway::Gateway;
use crate::models::{AccessRequest, AccessRequestStatus};
use crate::{AppError, Result};

/// How a poll ended. A vanished request is an error, not an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The request reached `COMPLETED`.
    Completed(AccessRequest),
    /// The request left the in-flight set without completing.
    Settled(AccessRequest),
    /// The budget ran out while the request was still in flight.
    TimedOut(AccessRequest),
}

impl PollOutcome {
    /// Last observed state of the request.
    #[must_use]
    pub fn request(&self) -> &AccessRequest {
        match self {
            Self::Completed(r) | Self::Settled(r) | Self::TimedOut(r) => r,
        }
    }

    /// Whether the request completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Request status poller with a wall-clock budget.
#[derive(Debug, Clone)]
pub struct Poller {
    interval_seconds: u64,
    tick: Duration,
    default_wait_seconds: u64,
    min_wait_seconds: u64,
    max_wait_seconds: u64,
}

impl Poller {
    /// Poller using the configured cadence and bounds.
    #[must_use]
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds.max(1),
            tick: Duration::from_secs(1),
            default_wait_seconds: config.default_wait_seconds,
            min_wait_seconds: config.min_wait_seconds,
            max_wait_seconds: config.max_wait_seconds,
        }
    }

    /// Override the real time each one-second budget tick sleeps.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Budget actually used for a requested `max_wait_seconds`.
    ///
    /// Out-of-range budgets fall back to the default.
    #[must_use]
    pub fn clamp_wait(&self, max_wait_seconds: u64) -> u64 {
        if (self.min_wait_seconds..=self.max_wait_seconds).contains(&max_wait_seconds) {
            max_wait_seconds
        } else {
            self.default_wait_seconds
        }
    }

    /// Fetch the request repeatedly until it settles or the budget is spent.
    ///
    /// Time slept never exceeds the clamped budget.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RequestVanished` if the request cannot be found,
    /// and propagates gateway failures.
    pub async fn poll(
        &self,
        gateway: &dyn Gateway,
        console: &mut dyn Console,
        request_id: Uuid,
        max_wait_seconds: u64,
    ) -> Result<PollOutcome> {
        let mut remaining = self.clamp_wait(max_wait_seconds);
        debug!(%request_id, budget = remaining, "polling request");

        loop {
            let request = gateway
                .get_access_request(request_id)
                .await?
                .ok_or_else(|| AppError::RequestVanished(format!("request {request_id}")))?;

            if request.status == AccessRequestStatus::Completed {
                return Ok(PollOutcome::Completed(request));
            }
            if !request.status.is_in_flight() {
                return Ok(PollOutcome::Settled(request));
            }
            if remaining == 0 {
                return Ok(PollOutcome::TimedOut(request));
            }

            let step = self.interval_seconds.min(remaining);
            remaining -= step;
            debug!(%request_id, status = %request.status, remaining, "request still in flight");
            self.wait(console, step).await;
        }
    }

    async fn wait(&self, console: &mut dyn Console, seconds: u64) {
        let width = usize::try_from(self.interval_seconds).unwrap_or(usize::MAX).min(10);
        for tick in 0..seconds {
            tokio::time::sleep(self.tick).await;
            let dots = usize::try_from(tick).unwrap_or(0).min(width);
            console.progress(&format!(
                " ⏰ Waiting for request to complete{}{}",
                ".".repeat(dots),
                " ".repeat(width - dots)
            ));
        }
    }
}

/// Print the result of a poll and how to follow up.
pub fn report_poll(console: &mut dyn Console, outcome: &PollOutcome) {
    let request = outcome.request();
    if outcome.is_success() {
        console.say(" ✅ Request completed!");
        return;
    }
    console.say(&format!(
        " ⏰ Request status: {}{}\n",
        request.status,
        " ".repeat(20)
    ));
    console.say(&format!(
        "Use `lumos request status --request-id {}` to check the status later.",
        request.id
    ));
}
