//! Alibaba Cloud provider for ecsflow
//!
//! This crate implements the ResourceClient trait for Alibaba Cloud,
//! enabling ecsflow to create ECS instances, elastic network interfaces
//! and elastic IP addresses.
//!
//! # Requirements
//!
//! - `aliyun` CLI must be installed
//! - An AccessKey pair with ECS and VPC permissions
//!
//! # Example
//!
//! ```ignore
//! use ecsflow_cloud::{NetworkConfig, ProvisioningWorkflow};
//! use ecsflow_cloud_aliyun::{AliyunProvider, Credentials};
//!
//! let provider = AliyunProvider::new(Credentials::new(key_id, key_secret, "cn-hangzhou"));
//! provider.check_cli().await?;
//!
//! let network = NetworkConfig::new("vpc-bp1...", "vsw-bp1...", "sg-bp1...");
//! let context = ProvisioningWorkflow::new(provider, network).run().await?;
//! ```

pub mod cli;
pub mod error;
pub mod provider;
pub mod user_data;

pub use cli::{AliyunCli, Credentials, EipAllocation, InstanceInfo};
pub use error::{AliyunError, Result};
pub use provider::AliyunProvider;
