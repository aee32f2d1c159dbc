//! Convergence polling
//!
//! Repeatedly queries an observable value until it matches a target or a
//! deadline passes. Query errors are treated as transient: they are logged
//! and retried until the deadline, never returned to the caller.

use crate::client::{InstanceStatus, ResourceClient, ResourceHandle};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Floor applied to the polling interval so a zero interval cannot spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline and spacing for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Total wall-clock budget
    pub timeout: Duration,

    /// Pause between queries
    pub interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Interval actually slept between queries
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            interval: Duration::from_secs(10),
        }
    }
}

/// How a wait ended
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Reached,
    TimedOut,
}

impl WaitOutcome {
    pub fn is_reached(self) -> bool {
        self == WaitOutcome::Reached
    }
}

/// Poll `accessor` until it yields `desired` or `config.timeout` elapses
///
/// A zero timeout returns [`WaitOutcome::TimedOut`] without calling the
/// accessor.
pub async fn wait_for<S, E, F, Fut>(mut accessor: F, desired: &S, config: &WaitConfig) -> WaitOutcome
where
    S: PartialEq + Display,
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, E>>,
{
    let start = Instant::now();
    let interval = config.effective_interval();
    let mut attempts: u32 = 0;

    loop {
        if start.elapsed() >= config.timeout {
            tracing::warn!(
                "Timed out after {} attempts waiting for '{}'",
                attempts,
                desired
            );
            return WaitOutcome::TimedOut;
        }

        attempts += 1;
        match accessor().await {
            Ok(current) if current == *desired => {
                tracing::debug!("Reached '{}' after {} attempts", desired, attempts);
                return WaitOutcome::Reached;
            }
            Ok(current) => {
                tracing::debug!("Current state: {}. Waiting for '{}'", current, desired);
            }
            Err(e) => {
                // Swallowed until the deadline
                tracing::warn!("Polling attempt {} failed: {}", attempts, e);
            }
        }

        sleep(interval).await;
    }
}

/// Wait until `instance_id` reports `desired`
pub async fn wait_for_instance_status<C>(
    client: &C,
    instance_id: &ResourceHandle,
    desired: InstanceStatus,
    config: &WaitConfig,
) -> WaitOutcome
where
    C: ResourceClient + ?Sized,
{
    tracing::info!(
        "Waiting for instance {} to reach '{}' (timeout {}s)",
        instance_id,
        desired,
        config.timeout.as_secs()
    );
    wait_for(|| client.describe_instance(instance_id), &desired, config).await
}
