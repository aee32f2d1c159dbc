//! Ordered provisioning workflow
//!
//! Runs the ten dependent steps that bring up an instance with a secondary
//! network interface and two floating IPs. Steps run strictly one after
//! another. The first failure stops the run; resources created before it are
//! left in place and reported through [`WorkflowError::context`].
//!
//! The workflow is not idempotent. Running it again after a failure creates
//! a second set of resources rather than resuming the first.

use crate::client::{
    DEFAULT_INTERFACE_NAME, FloatingIp, InstanceSpec, InstanceStatus, NetworkConfig,
    NetworkInterfaceSpec, ResourceClient, ResourceHandle, TargetKind,
};
use crate::context::{Association, WorkflowContext};
use crate::error::{StepFailure, WorkflowError};
use crate::poller::{WaitConfig, WaitOutcome, wait_for_instance_status};
use serde::{Deserialize, Serialize};

/// One step of the provisioning sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateInstance,
    WaitForStopped,
    AllocatePrimaryIp,
    CreateNetworkInterface,
    AttachNetworkInterface,
    AllocateSecondaryIp,
    StartInstance,
    WaitForRunning,
    AssociatePrimaryIp,
    AssociateSecondaryIp,
}

/// What a step does to the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Produces a new resource handle
    Create,
    /// Side effect on existing resources only
    Mutate,
    /// Blocks on the poller
    Wait,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Create => write!(f, "create"),
            StepKind::Mutate => write!(f, "mutate"),
            StepKind::Wait => write!(f, "wait"),
        }
    }
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::CreateInstance,
        Step::WaitForStopped,
        Step::AllocatePrimaryIp,
        Step::CreateNetworkInterface,
        Step::AttachNetworkInterface,
        Step::AllocateSecondaryIp,
        Step::StartInstance,
        Step::WaitForRunning,
        Step::AssociatePrimaryIp,
        Step::AssociateSecondaryIp,
    ];

    /// 1-based position in the sequence
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    pub fn kind(self) -> StepKind {
        match self {
            Step::CreateInstance
            | Step::AllocatePrimaryIp
            | Step::CreateNetworkInterface
            | Step::AllocateSecondaryIp => StepKind::Create,
            Step::WaitForStopped | Step::WaitForRunning => StepKind::Wait,
            Step::AttachNetworkInterface
            | Step::StartInstance
            | Step::AssociatePrimaryIp
            | Step::AssociateSecondaryIp => StepKind::Mutate,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::CreateInstance => "create instance",
            Step::WaitForStopped => "wait for instance to stop",
            Step::AllocatePrimaryIp => "allocate primary floating IP",
            Step::CreateNetworkInterface => "create secondary network interface",
            Step::AttachNetworkInterface => "attach network interface to instance",
            Step::AllocateSecondaryIp => "allocate secondary floating IP",
            Step::StartInstance => "start instance",
            Step::WaitForRunning => "wait for instance to run",
            Step::AssociatePrimaryIp => "associate primary IP with instance",
            Step::AssociateSecondaryIp => "associate secondary IP with network interface",
        }
    }

    /// Handles this step adds to the context
    pub fn produces(self) -> &'static [&'static str] {
        match self {
            Step::CreateInstance => &["instance id"],
            Step::AllocatePrimaryIp => &["primary allocation id", "primary ip"],
            Step::CreateNetworkInterface => &["network interface id"],
            Step::AllocateSecondaryIp => &["secondary allocation id", "secondary ip"],
            _ => &[],
        }
    }

    /// Inputs this step reads, from earlier steps or configuration
    pub fn depends_on(self) -> &'static [&'static str] {
        match self {
            Step::CreateInstance | Step::AllocatePrimaryIp | Step::AllocateSecondaryIp => &[],
            Step::WaitForStopped | Step::StartInstance | Step::WaitForRunning => &["instance id"],
            Step::CreateNetworkInterface => &["vpc id", "subnet id", "security group id"],
            Step::AttachNetworkInterface => &["instance id", "network interface id"],
            Step::AssociatePrimaryIp => &["primary allocation id", "instance id"],
            Step::AssociateSecondaryIp => &["secondary allocation id", "network interface id"],
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Observer notified as the workflow progresses
///
/// Callbacks arrive in execution order on the workflow's own task.
pub trait StepReporter: Send + Sync {
    fn step_started(&self, _step: Step) {}

    fn step_completed(&self, _step: Step, _context: &WorkflowContext) {}

    fn step_failed(&self, _step: Step, _failure: &StepFailure) {}
}

/// Reporter that ignores every event
pub struct NoopReporter;

impl StepReporter for NoopReporter {}

/// The provisioning sequence bound to a client and its configuration
pub struct ProvisioningWorkflow<C> {
    client: C,
    network: NetworkConfig,
    instance: InstanceSpec,
    interface_name: String,
    wait: WaitConfig,
    reporter: Box<dyn StepReporter>,
}

impl<C: ResourceClient> ProvisioningWorkflow<C> {
    pub fn new(client: C, network: NetworkConfig) -> Self {
        let instance = InstanceSpec::new(&network);
        Self {
            client,
            network,
            instance,
            interface_name: DEFAULT_INTERFACE_NAME.to_string(),
            wait: WaitConfig::default(),
            reporter: Box::new(NoopReporter),
        }
    }

    pub fn with_instance_spec(mut self, spec: InstanceSpec) -> Self {
        self.instance = spec;
        self
    }

    pub fn with_interface_name(mut self, name: impl Into<String>) -> Self {
        self.interface_name = name.into();
        self
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_reporter(mut self, reporter: impl StepReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn instance_spec(&self) -> &InstanceSpec {
        &self.instance
    }

    /// Execute every step in order, stopping at the first failure
    pub async fn run(&self) -> Result<WorkflowContext, WorkflowError> {
        let mut context = WorkflowContext::new();
        tracing::info!("Provisioning via {}", self.client.name());

        for step in Step::ALL {
            tracing::info!("[{}/{}] {}", step.number(), Step::ALL.len(), step);
            self.reporter.step_started(step);

            if let Err(failure) = self.execute(step, &mut context).await {
                tracing::error!("Step '{}' failed: {}", step, failure);
                self.reporter.step_failed(step, &failure);
                return Err(WorkflowError {
                    step,
                    failure,
                    context,
                });
            }

            context.completed_steps.push(step);
            self.reporter.step_completed(step, &context);
        }

        tracing::info!("Provisioning finished: {}", context);
        Ok(context)
    }

    async fn execute(&self, step: Step, ctx: &mut WorkflowContext) -> Result<(), StepFailure> {
        match step {
            Step::CreateInstance => {
                let id = self.client.create_instance(&self.instance).await?;
                tracing::info!("Instance created: {}", id);
                ctx.instance_id = Some(id);
            }
            Step::WaitForStopped => self.wait_for(ctx, InstanceStatus::Stopped).await?,
            Step::AllocatePrimaryIp => {
                let ip = self.client.allocate_floating_ip().await?;
                tracing::info!("Primary floating IP allocated: {}", ip);
                ctx.primary_ip = Some(ip);
            }
            Step::CreateNetworkInterface => {
                let spec = NetworkInterfaceSpec::new(&self.interface_name, &self.network);
                let id = self.client.create_network_interface(&spec).await?;
                tracing::info!("Network interface created: {}", id);
                ctx.network_interface_id = Some(id);
            }
            Step::AttachNetworkInterface => {
                let instance = ctx.require_instance()?;
                let interface = ctx.require_network_interface()?;
                self.client
                    .attach_network_interface(instance, interface)
                    .await?;
            }
            Step::AllocateSecondaryIp => {
                let ip = self.client.allocate_floating_ip().await?;
                tracing::info!("Secondary floating IP allocated: {}", ip);
                ctx.secondary_ip = Some(ip);
            }
            Step::StartInstance => {
                let instance = ctx.require_instance()?;
                self.client.start_instance(instance).await?;
            }
            Step::WaitForRunning => self.wait_for(ctx, InstanceStatus::Running).await?,
            Step::AssociatePrimaryIp => {
                let ip = ctx.require_primary_ip()?.clone();
                let instance = ctx.require_instance()?.clone();
                let association = self.associate(ip, instance, TargetKind::Instance).await?;
                ctx.associations.push(association);
            }
            Step::AssociateSecondaryIp => {
                let ip = ctx.require_secondary_ip()?.clone();
                let interface = ctx.require_network_interface()?.clone();
                let association = self
                    .associate(ip, interface, TargetKind::NetworkInterface)
                    .await?;
                ctx.associations.push(association);
            }
        }
        Ok(())
    }

    async fn wait_for(
        &self,
        ctx: &WorkflowContext,
        desired: InstanceStatus,
    ) -> Result<(), StepFailure> {
        let instance = ctx.require_instance()?;
        match wait_for_instance_status(&self.client, instance, desired, &self.wait).await {
            WaitOutcome::Reached => {
                tracing::info!("Instance {} reached '{}'", instance, desired);
                Ok(())
            }
            WaitOutcome::TimedOut => Err(StepFailure::TimedOut {
                instance: instance.to_string(),
                desired,
                timeout: self.wait.timeout,
            }),
        }
    }

    async fn associate(
        &self,
        ip: FloatingIp,
        target_id: ResourceHandle,
        target: TargetKind,
    ) -> Result<Association, StepFailure> {
        let echoed = self
            .client
            .associate_floating_ip(&ip.allocation_id, &target_id, target)
            .await?;
        tracing::info!("Associated {} with {} {}", ip, target, target_id);

        Ok(Association {
            allocation_id: ip.allocation_id,
            target_id,
            target,
            ip_address: echoed.unwrap_or(ip.ip_address),
        })
    }
}
