//! ecsflow Cloud Provisioning
//!
//! This crate provides the provider-neutral core of ecsflow: the
//! [`ResourceClient`] capability trait, a convergence poller, and the
//! ordered workflow that creates an instance, gives it a secondary network
//! interface and binds two floating IPs.
//!
//! # Supported Providers
//!
//! - **Alibaba Cloud**: ECS + VPC (via aliyun CLI, `ecsflow-cloud-aliyun`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  ecsflow CLI                     │
//! │             (ecsflow provision)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                ecsflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        ProvisioningWorkflow (10 steps)    │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │    Poller    │  │ trait ResourceClient │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │    aliyun     │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod poller;
pub mod workflow;

// Re-exports
pub use client::{
    DEFAULT_DISK_CATEGORY, DEFAULT_IMAGE_ID, DEFAULT_INSTANCE_NAME, DEFAULT_INSTANCE_TYPE,
    DEFAULT_INTERFACE_NAME, DiskSpec, FloatingIp, InstanceSpec, InstanceStatus, NetworkConfig,
    NetworkInterfaceSpec, ResourceClient, ResourceHandle, TargetKind,
};
pub use context::{Association, WorkflowContext};
pub use error::{CloudError, Result, StepFailure, WorkflowError};
pub use poller::{MIN_POLL_INTERVAL, WaitConfig, WaitOutcome, wait_for, wait_for_instance_status};
pub use workflow::{NoopReporter, ProvisioningWorkflow, Step, StepKind, StepReporter};
