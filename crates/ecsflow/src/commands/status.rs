use anyhow::Context;
use colored::Colorize;
use ecsflow_cloud::{InstanceStatus, ResourceClient, ResourceHandle};
use ecsflow_config::ProvisionConfig;

use crate::setup;

pub fn colorize(status: InstanceStatus) -> colored::ColoredString {
    match status {
        InstanceStatus::Running => status.to_string().green(),
        InstanceStatus::Stopped => status.to_string().yellow(),
        InstanceStatus::Unknown => status.to_string().red(),
        _ => status.to_string().cyan(),
    }
}

pub async fn handle(config: &ProvisionConfig, instance_id: &str) -> anyhow::Result<()> {
    let provider = setup::provider(config);
    provider.check_cli().await?;

    let status = provider
        .describe_instance(&ResourceHandle::new(instance_id))
        .await
        .with_context(|| format!("failed to describe instance '{}'", instance_id))?;

    println!("{}: {}", instance_id.bold(), colorize(status));
    Ok(())
}
