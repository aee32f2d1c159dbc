//! Remote resource client trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Control-plane operations consumed by the provisioning workflow
///
/// Each call is a single remote request. None of them is assumed to be
/// idempotent: calling `create_instance` twice creates two instances.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Returns the provider name (e.g., "aliyun")
    fn name(&self) -> &str;

    /// Create a virtual machine and return its instance id
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<ResourceHandle>;

    /// Fetch the current status of an instance
    async fn describe_instance(&self, instance_id: &ResourceHandle) -> Result<InstanceStatus>;

    /// Power on a stopped instance
    async fn start_instance(&self, instance_id: &ResourceHandle) -> Result<()>;

    /// Allocate a new floating (elastic) IP address
    async fn allocate_floating_ip(&self) -> Result<FloatingIp>;

    /// Create a network interface and return its id
    async fn create_network_interface(&self, spec: &NetworkInterfaceSpec)
    -> Result<ResourceHandle>;

    /// Attach a network interface to an instance
    async fn attach_network_interface(
        &self,
        instance_id: &ResourceHandle,
        interface_id: &ResourceHandle,
    ) -> Result<()>;

    /// Bind an allocated floating IP to an instance or a network interface
    ///
    /// Returns the address when the provider echoes it back.
    async fn associate_floating_ip(
        &self,
        allocation_id: &ResourceHandle,
        target_id: &ResourceHandle,
        target: TargetKind,
    ) -> Result<Option<String>>;
}

/// Opaque provider-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ResourceHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// An allocated floating IP: its allocation id and public address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub allocation_id: ResourceHandle,
    pub ip_address: String,
}

impl FloatingIp {
    pub fn new(allocation_id: impl Into<ResourceHandle>, ip_address: impl Into<String>) -> Self {
        Self {
            allocation_id: allocation_id.into(),
            ip_address: ip_address.into(),
        }
    }
}

impl std::fmt::Display for FloatingIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.allocation_id, self.ip_address)
    }
}

/// What a floating IP is associated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The instance's primary interface
    Instance,
    /// A secondary network interface
    NetworkInterface,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Instance => write!(f, "instance"),
            TargetKind::NetworkInterface => write!(f, "network interface"),
        }
    }
}

/// Observed lifecycle status of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceStatus {
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    /// Any label the provider reports that is not modelled above
    Unknown,
}

impl InstanceStatus {
    /// Parse a provider status label (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => Self::Pending,
            "starting" => Self::Starting,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceStatus::Pending => write!(f, "Pending"),
            InstanceStatus::Starting => write!(f, "Starting"),
            InstanceStatus::Running => write!(f, "Running"),
            InstanceStatus::Stopping => write!(f, "Stopping"),
            InstanceStatus::Stopped => write!(f, "Stopped"),
            InstanceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Network identifiers the workflow places resources into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub vpc_id: String,
    /// Subnet (VSwitch on Alibaba Cloud)
    pub subnet_id: String,
    pub security_group_id: String,
}

impl NetworkConfig {
    pub fn new(
        vpc_id: impl Into<String>,
        subnet_id: impl Into<String>,
        security_group_id: impl Into<String>,
    ) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            subnet_id: subnet_id.into(),
            security_group_id: security_group_id.into(),
        }
    }
}

/// Disk attached to a new instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSpec {
    pub category: String,
    pub size_gb: u32,
    /// Device path for data disks; ignored for the system disk
    pub device: Option<String>,
    pub delete_with_instance: bool,
}

impl DiskSpec {
    pub fn system(category: impl Into<String>, size_gb: u32) -> Self {
        Self {
            category: category.into(),
            size_gb,
            device: None,
            delete_with_instance: true,
        }
    }

    pub fn data(category: impl Into<String>, size_gb: u32, device: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            size_gb,
            device: Some(device.into()),
            delete_with_instance: true,
        }
    }
}

pub const DEFAULT_INSTANCE_NAME: &str = "MyECSInstance";
pub const DEFAULT_IMAGE_ID: &str = "ubuntu_22_04_x64_20G_alibase_20240508.vhd";
pub const DEFAULT_INSTANCE_TYPE: &str = "ecs.t5-lc1m2.large";
pub const DEFAULT_DISK_CATEGORY: &str = "cloud_efficiency";
pub const DEFAULT_INTERFACE_NAME: &str = "MyNetworkInterface";

/// Parameters for creating an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub image_id: String,
    pub instance_type: String,
    pub security_group_id: String,
    pub subnet_id: String,
    pub system_disk: DiskSpec,
    pub data_disks: Vec<DiskSpec>,
    pub internet_charge_type: String,
    pub bandwidth_in_mbps: u32,
    pub bandwidth_out_mbps: u32,
    /// Base64-encoded cloud-init user data
    pub user_data: Option<String>,
}

impl InstanceSpec {
    /// Default instance template placed into `network`
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            name: DEFAULT_INSTANCE_NAME.to_string(),
            image_id: DEFAULT_IMAGE_ID.to_string(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            security_group_id: network.security_group_id.clone(),
            subnet_id: network.subnet_id.clone(),
            system_disk: DiskSpec::system(DEFAULT_DISK_CATEGORY, 40),
            data_disks: vec![DiskSpec::data(DEFAULT_DISK_CATEGORY, 40, "/dev/vdb")],
            internet_charge_type: "PayByTraffic".to_string(),
            bandwidth_in_mbps: 10,
            bandwidth_out_mbps: 10,
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, encoded: impl Into<String>) -> Self {
        self.user_data = Some(encoded.into());
        self
    }
}

/// Parameters for creating a secondary network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceSpec {
    pub name: String,
    pub vpc_id: String,
    pub subnet_id: String,
    pub security_group_id: String,
}

impl NetworkInterfaceSpec {
    pub fn new(name: impl Into<String>, network: &NetworkConfig) -> Self {
        Self {
            name: name.into(),
            vpc_id: network.vpc_id.clone(),
            subnet_id: network.subnet_id.clone(),
            security_group_id: network.security_group_id.clone(),
        }
    }
}
