use async_trait::async_trait;
use ecsflow_cloud::{
    CloudError, FloatingIp, InstanceSpec, InstanceStatus, NetworkInterfaceSpec, ResourceClient,
    ResourceHandle, Result, Step, StepFailure, StepReporter, TargetKind, WorkflowContext,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded call against [`FakeClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateInstance,
    DescribeInstance(String),
    StartInstance(String),
    AllocateFloatingIp,
    CreateNetworkInterface(String),
    AttachNetworkInterface {
        instance: String,
        interface: String,
    },
    AssociateFloatingIp {
        allocation: String,
        target: String,
        kind: TargetKind,
    },
}

/// Operation names, used for failure injection and call-order assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    CreateInstance,
    DescribeInstance,
    StartInstance,
    AllocateFloatingIp,
    CreateNetworkInterface,
    AttachNetworkInterface,
    AssociateFloatingIp,
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::CreateInstance => Op::CreateInstance,
            Call::DescribeInstance(_) => Op::DescribeInstance,
            Call::StartInstance(_) => Op::StartInstance,
            Call::AllocateFloatingIp => Op::AllocateFloatingIp,
            Call::CreateNetworkInterface(_) => Op::CreateNetworkInterface,
            Call::AttachNetworkInterface { .. } => Op::AttachNetworkInterface,
            Call::AssociateFloatingIp { .. } => Op::AssociateFloatingIp,
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    instances: u32,
    interfaces: u32,
    allocations: u32,
    polls: HashMap<String, u32>,
    started_at_poll: HashMap<String, u32>,
    transient_errors_left: u32,
}

/// In-memory cloud that hands out sequential ids
///
/// A new instance reports `Pending` for `stopped_after` polls and then
/// `Stopped`. After `start_instance` it reports `Starting` for
/// `running_after` polls and then `Running`.
pub struct FakeClient {
    state: Mutex<FakeState>,
    stopped_after: u32,
    running_after: u32,
    never_stops: bool,
    fail_on: Option<Op>,
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            stopped_after: 2,
            running_after: 1,
            never_stops: false,
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, op: Op) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn never_stopping(mut self) -> Self {
        self.never_stops = true;
        self
    }

    pub fn with_transient_describe_errors(self, count: u32) -> Self {
        self.state.lock().unwrap().transient_errors_left = count;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Operation sequence with consecutive polls folded into one entry
    pub fn collapsed_ops(&self) -> Vec<Op> {
        let mut ops: Vec<Op> = Vec::new();
        for call in self.calls() {
            let op = call.op();
            if op == Op::DescribeInstance && ops.last() == Some(&Op::DescribeInstance) {
                continue;
            }
            ops.push(op);
        }
        ops
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        let op = call.op();
        self.state.lock().unwrap().calls.push(call);
        if self.fail_on == Some(op) {
            return Err(CloudError::ApiError(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    fn name(&self) -> &str {
        "fake"
    }

    async fn create_instance(&self, _spec: &InstanceSpec) -> Result<ResourceHandle> {
        self.record(Call::CreateInstance)?;
        let mut state = self.state.lock().unwrap();
        state.instances += 1;
        Ok(ResourceHandle::new(format!("i-{}", state.instances)))
    }

    async fn describe_instance(&self, instance_id: &ResourceHandle) -> Result<InstanceStatus> {
        self.record(Call::DescribeInstance(instance_id.to_string()))?;
        let mut state = self.state.lock().unwrap();

        if state.transient_errors_left > 0 {
            state.transient_errors_left -= 1;
            return Err(CloudError::ApiError("Throttling.User".to_string()));
        }

        let polls = state.polls.entry(instance_id.to_string()).or_insert(0);
        *polls += 1;
        let polls = *polls;

        let status = match state.started_at_poll.get(instance_id.as_str()) {
            Some(at_start) if polls - at_start > self.running_after => InstanceStatus::Running,
            Some(_) => InstanceStatus::Starting,
            None if !self.never_stops && polls > self.stopped_after => InstanceStatus::Stopped,
            None => InstanceStatus::Pending,
        };
        Ok(status)
    }

    async fn start_instance(&self, instance_id: &ResourceHandle) -> Result<()> {
        self.record(Call::StartInstance(instance_id.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let polls = state.polls.get(instance_id.as_str()).copied().unwrap_or(0);
        state.started_at_poll.insert(instance_id.to_string(), polls);
        Ok(())
    }

    async fn allocate_floating_ip(&self) -> Result<FloatingIp> {
        self.record(Call::AllocateFloatingIp)?;
        let mut state = self.state.lock().unwrap();
        state.allocations += 1;
        let n = state.allocations;
        Ok(FloatingIp::new(
            format!("eip-{}", n),
            format!("47.0.0.{}", n),
        ))
    }

    async fn create_network_interface(
        &self,
        spec: &NetworkInterfaceSpec,
    ) -> Result<ResourceHandle> {
        self.record(Call::CreateNetworkInterface(spec.name.clone()))?;
        let mut state = self.state.lock().unwrap();
        state.interfaces += 1;
        Ok(ResourceHandle::new(format!("eni-{}", state.interfaces)))
    }

    async fn attach_network_interface(
        &self,
        instance_id: &ResourceHandle,
        interface_id: &ResourceHandle,
    ) -> Result<()> {
        self.record(Call::AttachNetworkInterface {
            instance: instance_id.to_string(),
            interface: interface_id.to_string(),
        })
    }

    async fn associate_floating_ip(
        &self,
        allocation_id: &ResourceHandle,
        target_id: &ResourceHandle,
        target: TargetKind,
    ) -> Result<Option<String>> {
        self.record(Call::AssociateFloatingIp {
            allocation: allocation_id.to_string(),
            target: target_id.to_string(),
            kind: target,
        })?;
        Ok(None)
    }
}

/// Reporter event, as observed by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(Step),
    Completed(Step),
    Failed(Step, String),
}

/// Reporter that keeps every event for later inspection
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl StepReporter for RecordingReporter {
    fn step_started(&self, step: Step) {
        self.events.lock().unwrap().push(Event::Started(step));
    }

    fn step_completed(&self, step: Step, _context: &WorkflowContext) {
        self.events.lock().unwrap().push(Event::Completed(step));
    }

    fn step_failed(&self, step: Step, failure: &StepFailure) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Failed(step, failure.to_string()));
    }
}
