//! Cloud provider and workflow error types

use crate::client::InstanceStatus;
use crate::context::WorkflowContext;
use crate::workflow::Step;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a [`ResourceClient`](crate::ResourceClient) implementation
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Why a single workflow step could not complete
#[derive(Error, Debug)]
pub enum StepFailure {
    /// The provider rejected or could not service the request
    #[error(transparent)]
    Remote(#[from] CloudError),

    /// The instance did not converge before the wait deadline
    #[error("instance {instance} did not reach '{desired}' within {}s", .timeout.as_secs())]
    TimedOut {
        instance: String,
        desired: InstanceStatus,
        timeout: Duration,
    },

    /// A step ran without a handle that an earlier step should have produced
    #[error("missing {0}: no earlier step produced it")]
    MissingHandle(&'static str),
}

/// A provisioning run aborted at `step`
///
/// `context` holds every resource created before the failure. Nothing is
/// released automatically; the identifiers are reported so they can be
/// cleaned up by hand.
#[derive(Error, Debug)]
#[error("step {}/{} ({step}) failed: {failure}; known resources: {context}", .step.number(), Step::ALL.len())]
pub struct WorkflowError {
    pub step: Step,
    #[source]
    pub failure: StepFailure,
    pub context: WorkflowContext,
}

impl WorkflowError {
    /// Whether the run stopped because a wait step hit its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self.failure, StepFailure::TimedOut { .. })
    }
}
