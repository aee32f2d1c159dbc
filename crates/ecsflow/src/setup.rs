use anyhow::Context;
use ecsflow_cloud::{
    DEFAULT_INTERFACE_NAME, InstanceSpec, NetworkConfig, ProvisioningWorkflow, WaitConfig,
};
use ecsflow_cloud_aliyun::{AliyunProvider, Credentials, user_data};
use ecsflow_config::ProvisionConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Value of `instance.user_data` that disables the bootstrap script
const NO_USER_DATA: &str = "none";

/// Load the config from `--config` or by discovery
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(ProvisionConfig, PathBuf)> {
    let (config, path) = ProvisionConfig::load_or_discover(path)?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok((config, path))
}

/// Command-line flags take precedence over the config's wait settings
pub fn wait_config(
    config: &ProvisionConfig,
    timeout: Option<u64>,
    interval: Option<u64>,
) -> WaitConfig {
    WaitConfig::new(
        Duration::from_secs(timeout.unwrap_or(config.wait.timeout_secs)),
        Duration::from_secs(interval.unwrap_or(config.wait.interval_secs)),
    )
}

pub fn network(config: &ProvisionConfig) -> NetworkConfig {
    NetworkConfig::new(
        &config.vpc_id,
        &config.vswitch_id,
        &config.security_group_id,
    )
}

pub fn provider(config: &ProvisionConfig) -> AliyunProvider {
    AliyunProvider::new(Credentials::new(
        &config.access_key_id,
        &config.access_key_secret,
        &config.region_id,
    ))
}

/// Build the instance template: defaults, then config overrides
pub fn instance_spec(
    config: &ProvisionConfig,
    network: &NetworkConfig,
) -> anyhow::Result<InstanceSpec> {
    let overrides = &config.instance;
    let mut spec = InstanceSpec::new(network);

    if let Some(name) = &overrides.name {
        spec.name = name.clone();
    }
    if let Some(image_id) = &overrides.image_id {
        spec.image_id = image_id.clone();
    }
    if let Some(instance_type) = &overrides.instance_type {
        spec.instance_type = instance_type.clone();
    }
    if let Some(size) = overrides.system_disk_size_gb {
        spec.system_disk.size_gb = size;
    }
    if let Some(size) = overrides.data_disk_size_gb {
        for disk in &mut spec.data_disks {
            disk.size_gb = size;
        }
    }
    if let Some(bandwidth) = overrides.bandwidth_in_mbps {
        spec.bandwidth_in_mbps = bandwidth;
    }
    if let Some(bandwidth) = overrides.bandwidth_out_mbps {
        spec.bandwidth_out_mbps = bandwidth;
    }

    if let Some(script) = resolve_user_data(overrides.user_data.as_deref())? {
        spec = spec.with_user_data(user_data::encode(&script));
    }

    Ok(spec)
}

/// Resolve the bootstrap script
///
/// Unset selects the built-in Docker setup; a built-in name selects that
/// script; "none" disables it; anything else is read as a file path.
pub fn resolve_user_data(setting: Option<&str>) -> anyhow::Result<Option<String>> {
    let name = setting.unwrap_or(user_data::DEFAULT_SCRIPT);
    if name == NO_USER_DATA {
        return Ok(None);
    }
    if let Some(script) = user_data::get_builtin_script(name) {
        return Ok(Some(script.to_string()));
    }
    let script = std::fs::read_to_string(name)
        .with_context(|| format!("failed to read user data script '{}'", name))?;
    Ok(Some(script))
}

/// Assemble the workflow for a loaded config
pub fn workflow(
    config: &ProvisionConfig,
    wait: WaitConfig,
) -> anyhow::Result<ProvisioningWorkflow<AliyunProvider>> {
    let network = network(config);
    let spec = instance_spec(config, &network)?;
    let interface_name = config
        .instance
        .interface_name
        .clone()
        .unwrap_or_else(|| DEFAULT_INTERFACE_NAME.to_string());

    Ok(ProvisioningWorkflow::new(provider(config), network)
        .with_instance_spec(spec)
        .with_interface_name(interface_name)
        .with_wait_config(wait))
}
