use colored::Colorize;
use ecsflow_cloud::{InstanceStatus, ResourceHandle, WaitConfig, wait_for_instance_status};
use ecsflow_config::ProvisionConfig;

use crate::commands::status::colorize;
use crate::{progress, setup};

/// Parse a user-supplied status; `Unknown` is not a valid target
pub fn parse_target(status: &str) -> anyhow::Result<InstanceStatus> {
    match InstanceStatus::parse(status) {
        InstanceStatus::Unknown => Err(anyhow::anyhow!(
            "unknown instance status '{}' (expected Pending, Starting, Running, Stopping or Stopped)",
            status
        )),
        parsed => Ok(parsed),
    }
}

pub async fn handle(
    config: &ProvisionConfig,
    instance_id: &str,
    status: &str,
    wait: WaitConfig,
) -> anyhow::Result<()> {
    let desired = parse_target(status)?;
    let provider = setup::provider(config);
    provider.check_cli().await?;

    let pb = progress::spinner();
    pb.set_message(format!("Waiting for {} to reach {}...", instance_id, desired));

    let handle = ResourceHandle::new(instance_id);
    let outcome = wait_for_instance_status(&provider, &handle, desired, &wait).await;
    pb.finish_and_clear();

    if outcome.is_reached() {
        println!(
            "{} {} is {}",
            "✓".green(),
            instance_id.bold(),
            colorize(desired)
        );
        return Ok(());
    }

    eprintln!(
        "{} {} did not reach {} within {}s",
        "Error:".red().bold(),
        instance_id,
        desired,
        wait.timeout.as_secs()
    );
    std::process::exit(1);
}
