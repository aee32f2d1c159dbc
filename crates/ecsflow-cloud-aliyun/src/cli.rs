//! aliyun CLI wrapper
//!
//! Wraps the `aliyun` CLI for the ECS and VPC API calls used by ecsflow.
//! Credentials are handed to the child process through environment variables
//! so they never appear on its command line.

use crate::error::{AliyunError, Result};
use ecsflow_cloud::{InstanceSpec, NetworkInterfaceSpec, TargetKind};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// Access key pair and region
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub region_id: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        region_id: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            region_id: region_id.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"***")
            .field("region_id", &self.region_id)
            .finish()
    }
}

/// aliyun CLI wrapper
pub struct AliyunCli {
    program: String,
    credentials: Credentials,
}

impl AliyunCli {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            program: "aliyun".to_string(),
            credentials,
        }
    }

    /// Use a different executable instead of `aliyun` from `PATH`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.credentials.region_id
    }

    /// Check that the CLI is installed
    pub async fn check_installed(&self) -> Result<()> {
        let which = Command::new("which").arg(&self.program).output().await?;

        if !which.status.success() {
            return Err(AliyunError::CliNotFound);
        }
        Ok(())
    }

    /// Run an aliyun API call and return stdout
    async fn run_command(&self, product: &str, api: &str, args: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(product).arg(api).args(args);
        cmd.env("ALIBABA_CLOUD_ACCESS_KEY_ID", &self.credentials.access_key_id);
        cmd.env(
            "ALIBABA_CLOUD_ACCESS_KEY_SECRET",
            &self.credentials.access_key_secret,
        );
        cmd.env("ALIBABA_CLOUD_REGION_ID", &self.credentials.region_id);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: aliyun {} {} {}", product, api, args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AliyunError::CliNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if is_auth_error(&stderr) {
                return Err(AliyunError::AuthenticationFailed(stderr));
            }
            return Err(AliyunError::CommandFailed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!("{} response: {}", api, stdout.trim());
        Ok(stdout)
    }

    /// Create an ECS instance, returning its id
    pub async fn create_instance(&self, spec: &InstanceSpec) -> Result<String> {
        let output = self
            .run_command("ecs", "CreateInstance", &create_instance_args(spec, self.region()))
            .await?;
        let response: CreateInstanceResponse = serde_json::from_str(&output)?;
        Ok(response.instance_id)
    }

    /// Describe a single instance
    pub async fn describe_instance(&self, instance_id: &str) -> Result<InstanceInfo> {
        let output = self
            .run_command(
                "ecs",
                "DescribeInstances",
                &describe_instances_args(instance_id, self.region()),
            )
            .await?;
        parse_describe_instances(&output, instance_id)
    }

    /// Power on an instance
    pub async fn start_instance(&self, instance_id: &str) -> Result<()> {
        self.run_command(
            "ecs",
            "StartInstance",
            &["--InstanceId".to_string(), instance_id.to_string()],
        )
        .await?;
        Ok(())
    }

    /// Allocate an elastic IP address
    pub async fn allocate_eip(&self) -> Result<EipAllocation> {
        let output = self
            .run_command(
                "vpc",
                "AllocateEipAddress",
                &["--RegionId".to_string(), self.region().to_string()],
            )
            .await?;
        let allocation: EipAllocation = serde_json::from_str(&output)?;
        Ok(allocation)
    }

    /// Create an elastic network interface, returning its id
    pub async fn create_network_interface(&self, spec: &NetworkInterfaceSpec) -> Result<String> {
        let output = self
            .run_command(
                "ecs",
                "CreateNetworkInterface",
                &create_network_interface_args(spec, self.region()),
            )
            .await?;
        let response: CreateNetworkInterfaceResponse = serde_json::from_str(&output)?;
        Ok(response.network_interface_id)
    }

    /// Attach a network interface to an instance
    pub async fn attach_network_interface(
        &self,
        instance_id: &str,
        interface_id: &str,
    ) -> Result<()> {
        self.run_command(
            "ecs",
            "AttachNetworkInterface",
            &[
                "--RegionId".to_string(),
                self.region().to_string(),
                "--InstanceId".to_string(),
                instance_id.to_string(),
                "--NetworkInterfaceId".to_string(),
                interface_id.to_string(),
            ],
        )
        .await?;
        Ok(())
    }

    /// Associate an elastic IP with an instance or network interface
    pub async fn associate_eip(
        &self,
        allocation_id: &str,
        target_id: &str,
        target: TargetKind,
    ) -> Result<Option<String>> {
        let output = self
            .run_command(
                "vpc",
                "AssociateEipAddress",
                &associate_eip_args(allocation_id, target_id, target, self.region()),
            )
            .await?;
        let response: AssociateEipResponse = serde_json::from_str(&output)?;
        Ok(response.eip_address)
    }
}

fn is_auth_error(stderr: &str) -> bool {
    [
        "InvalidAccessKeyId",
        "SignatureDoesNotMatch",
        "Forbidden.RAM",
        "can't get credential",
    ]
    .iter()
    .any(|code| stderr.contains(code))
}

fn flag(args: &mut Vec<String>, name: &str, value: impl ToString) {
    args.push(format!("--{}", name));
    args.push(value.to_string());
}

pub(crate) fn create_instance_args(spec: &InstanceSpec, region: &str) -> Vec<String> {
    let mut args = Vec::new();
    flag(&mut args, "RegionId", region);
    flag(&mut args, "InstanceName", &spec.name);
    flag(&mut args, "ImageId", &spec.image_id);
    flag(&mut args, "InstanceType", &spec.instance_type);
    flag(&mut args, "SecurityGroupId", &spec.security_group_id);
    flag(&mut args, "VSwitchId", &spec.subnet_id);
    flag(&mut args, "SystemDisk.Category", &spec.system_disk.category);
    flag(&mut args, "SystemDisk.Size", spec.system_disk.size_gb);

    for (i, disk) in spec.data_disks.iter().enumerate() {
        let n = i + 1;
        flag(&mut args, &format!("DataDisk.{}.Size", n), disk.size_gb);
        flag(&mut args, &format!("DataDisk.{}.Category", n), &disk.category);
        flag(
            &mut args,
            &format!("DataDisk.{}.DeleteWithInstance", n),
            disk.delete_with_instance,
        );
        if let Some(ref device) = disk.device {
            flag(&mut args, &format!("DataDisk.{}.Device", n), device);
        }
    }

    flag(&mut args, "InternetChargeType", &spec.internet_charge_type);
    flag(&mut args, "InternetMaxBandwidthOut", spec.bandwidth_out_mbps);
    flag(&mut args, "InternetMaxBandwidthIn", spec.bandwidth_in_mbps);

    if let Some(ref user_data) = spec.user_data {
        flag(&mut args, "UserData", user_data);
    }
    args
}

pub(crate) fn describe_instances_args(instance_id: &str, region: &str) -> Vec<String> {
    let mut args = Vec::new();
    flag(&mut args, "RegionId", region);
    // InstanceIds is a JSON array literal
    flag(&mut args, "InstanceIds", serde_json::json!([instance_id]));
    args
}

pub(crate) fn create_network_interface_args(
    spec: &NetworkInterfaceSpec,
    region: &str,
) -> Vec<String> {
    let mut args = Vec::new();
    flag(&mut args, "RegionId", region);
    flag(&mut args, "VSwitchId", &spec.subnet_id);
    flag(&mut args, "SecurityGroupId", &spec.security_group_id);
    flag(&mut args, "NetworkInterfaceName", &spec.name);
    args
}

pub(crate) fn associate_eip_args(
    allocation_id: &str,
    target_id: &str,
    target: TargetKind,
    region: &str,
) -> Vec<String> {
    let mut args = Vec::new();
    flag(&mut args, "RegionId", region);
    flag(&mut args, "AllocationId", allocation_id);
    flag(&mut args, "InstanceId", target_id);
    if target == TargetKind::NetworkInterface {
        flag(&mut args, "InstanceType", "NetworkInterface");
    }
    args
}

pub(crate) fn parse_describe_instances(output: &str, instance_id: &str) -> Result<InstanceInfo> {
    let response: DescribeInstancesResponse = serde_json::from_str(output)?;
    response
        .instances
        .instance
        .into_iter()
        .next()
        .ok_or_else(|| AliyunError::InstanceNotFound(instance_id.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
struct CreateInstanceResponse {
    #[serde(rename = "InstanceId")]
    instance_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DescribeInstancesResponse {
    #[serde(rename = "Instances")]
    instances: InstanceList,
}

#[derive(Debug, Clone, Deserialize)]
struct InstanceList {
    #[serde(rename = "Instance", default)]
    instance: Vec<InstanceInfo>,
}

/// Instance information from DescribeInstances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceInfo {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,

    #[serde(rename = "InstanceName", default)]
    pub instance_name: Option<String>,

    #[serde(rename = "Status")]
    pub status: String,
}

/// Allocation returned by AllocateEipAddress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EipAllocation {
    #[serde(rename = "AllocationId")]
    pub allocation_id: String,

    #[serde(rename = "EipAddress")]
    pub eip_address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateNetworkInterfaceResponse {
    #[serde(rename = "NetworkInterfaceId")]
    network_interface_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AssociateEipResponse {
    #[serde(rename = "EipAddress", default)]
    eip_address: Option<String>,
}
