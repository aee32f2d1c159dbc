//! Alibaba Cloud provider implementation

use crate::cli::{AliyunCli, Credentials};
use crate::error::Result;
use async_trait::async_trait;
use ecsflow_cloud::{
    FloatingIp, InstanceSpec, InstanceStatus, NetworkInterfaceSpec, ResourceClient,
    ResourceHandle, TargetKind,
};

/// Alibaba Cloud provider
pub struct AliyunProvider {
    cli: AliyunCli,
}

impl AliyunProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            cli: AliyunCli::new(credentials),
        }
    }

    pub fn with_cli(cli: AliyunCli) -> Self {
        Self { cli }
    }

    pub fn region(&self) -> &str {
        self.cli.region()
    }

    /// Fail early when the aliyun CLI is missing
    pub async fn check_cli(&self) -> Result<()> {
        self.cli.check_installed().await
    }
}

#[async_trait]
impl ResourceClient for AliyunProvider {
    fn name(&self) -> &str {
        "aliyun"
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> ecsflow_cloud::Result<ResourceHandle> {
        tracing::info!("Creating instance: {}", spec.name);
        let id = self.cli.create_instance(spec).await?;
        Ok(ResourceHandle::new(id))
    }

    async fn describe_instance(
        &self,
        instance_id: &ResourceHandle,
    ) -> ecsflow_cloud::Result<InstanceStatus> {
        let info = self.cli.describe_instance(instance_id.as_str()).await?;
        Ok(InstanceStatus::parse(&info.status))
    }

    async fn start_instance(&self, instance_id: &ResourceHandle) -> ecsflow_cloud::Result<()> {
        tracing::info!("Starting instance: {}", instance_id);
        self.cli.start_instance(instance_id.as_str()).await?;
        Ok(())
    }

    async fn allocate_floating_ip(&self) -> ecsflow_cloud::Result<FloatingIp> {
        let allocation = self.cli.allocate_eip().await?;
        Ok(FloatingIp::new(allocation.allocation_id, allocation.eip_address))
    }

    async fn create_network_interface(
        &self,
        spec: &NetworkInterfaceSpec,
    ) -> ecsflow_cloud::Result<ResourceHandle> {
        tracing::info!(
            "Creating network interface {} in VPC {}, VSwitch {}",
            spec.name,
            spec.vpc_id,
            spec.subnet_id
        );
        let id = self.cli.create_network_interface(spec).await?;
        Ok(ResourceHandle::new(id))
    }

    async fn attach_network_interface(
        &self,
        instance_id: &ResourceHandle,
        interface_id: &ResourceHandle,
    ) -> ecsflow_cloud::Result<()> {
        tracing::info!(
            "Attaching network interface {} to instance {}",
            interface_id,
            instance_id
        );
        self.cli
            .attach_network_interface(instance_id.as_str(), interface_id.as_str())
            .await?;
        Ok(())
    }

    async fn associate_floating_ip(
        &self,
        allocation_id: &ResourceHandle,
        target_id: &ResourceHandle,
        target: TargetKind,
    ) -> ecsflow_cloud::Result<Option<String>> {
        let address = self
            .cli
            .associate_eip(allocation_id.as_str(), target_id.as_str(), target)
            .await?;
        Ok(address)
    }
}
