//! Resources accumulated by a single provisioning run

use crate::client::{FloatingIp, ResourceHandle, TargetKind};
use crate::error::StepFailure;
use crate::workflow::Step;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Handles produced so far by one workflow run
///
/// Each field is filled by exactly one step. Later steps read them through
/// the `require_*` accessors, which fail instead of proceeding without an id.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowContext {
    pub started_at: DateTime<Utc>,
    pub instance_id: Option<ResourceHandle>,
    pub primary_ip: Option<FloatingIp>,
    pub network_interface_id: Option<ResourceHandle>,
    pub secondary_ip: Option<FloatingIp>,
    pub associations: Vec<Association>,
    pub completed_steps: Vec<Step>,
}

/// A floating IP bound to its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub allocation_id: ResourceHandle,
    pub target_id: ResourceHandle,
    pub target: TargetKind,
    pub ip_address: String,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            instance_id: None,
            primary_ip: None,
            network_interface_id: None,
            secondary_ip: None,
            associations: Vec::new(),
            completed_steps: Vec::new(),
        }
    }
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_instance(&self) -> Result<&ResourceHandle, StepFailure> {
        self.instance_id
            .as_ref()
            .ok_or(StepFailure::MissingHandle("instance id"))
    }

    pub fn require_network_interface(&self) -> Result<&ResourceHandle, StepFailure> {
        self.network_interface_id
            .as_ref()
            .ok_or(StepFailure::MissingHandle("network interface id"))
    }

    pub fn require_primary_ip(&self) -> Result<&FloatingIp, StepFailure> {
        self.primary_ip
            .as_ref()
            .ok_or(StepFailure::MissingHandle("primary floating IP allocation"))
    }

    pub fn require_secondary_ip(&self) -> Result<&FloatingIp, StepFailure> {
        self.secondary_ip
            .as_ref()
            .ok_or(StepFailure::MissingHandle("secondary floating IP allocation"))
    }

    /// Whether `step` finished successfully in this run
    pub fn is_completed(&self, step: Step) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Most recent successful step
    pub fn last_completed(&self) -> Option<Step> {
        self.completed_steps.last().copied()
    }

    /// Whether the run has created anything that would need cleaning up
    pub fn has_resources(&self) -> bool {
        self.instance_id.is_some()
            || self.primary_ip.is_some()
            || self.network_interface_id.is_some()
            || self.secondary_ip.is_some()
    }

    /// `(label, identifier)` pairs for every resource created so far
    pub fn known_resources(&self) -> Vec<(&'static str, String)> {
        let mut resources = Vec::new();
        if let Some(id) = &self.instance_id {
            resources.push(("instance", id.to_string()));
        }
        if let Some(ip) = &self.primary_ip {
            resources.push(("primary floating IP", ip.to_string()));
        }
        if let Some(id) = &self.network_interface_id {
            resources.push(("network interface", id.to_string()));
        }
        if let Some(ip) = &self.secondary_ip {
            resources.push(("secondary floating IP", ip.to_string()));
        }
        resources
    }
}

impl std::fmt::Display for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resources = self.known_resources();
        if resources.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = resources
            .iter()
            .map(|(label, id)| format!("{}={}", label, id))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
