use anyhow::Context;
use colored::Colorize;
use ecsflow_cloud::{Step, WaitConfig, WorkflowContext, WorkflowError};
use ecsflow_config::ProvisionConfig;
use serde::Serialize;
use std::path::Path;

use crate::progress::StepProgress;
use crate::setup;

/// JSON document printed on failure with `--json`
#[derive(Serialize)]
struct FailureReport<'a> {
    failed_step: Step,
    step_number: usize,
    error: String,
    timed_out: bool,
    context: &'a WorkflowContext,
}

pub async fn handle(
    config: &ProvisionConfig,
    config_path: &Path,
    wait: WaitConfig,
    json: bool,
) -> anyhow::Result<()> {
    if !json {
        println!(
            "{}",
            format!("Provisioning ECS instance in {}", config.region_id)
                .cyan()
                .bold()
        );
        println!("Config: {}", config_path.display().to_string().dimmed());
        println!();
    }

    let workflow = setup::workflow(config, wait)?;
    workflow
        .client()
        .check_cli()
        .await
        .context("aliyun CLI is required for provisioning")?;

    let progress = if json {
        StepProgress::hidden()
    } else {
        StepProgress::new()
    };
    let workflow = workflow.with_reporter(progress.clone());

    let result = workflow.run().await;
    progress.finish();

    match result {
        Ok(context) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                print_summary(&context);
            }
            Ok(())
        }
        Err(err) => {
            if json {
                let report = FailureReport {
                    failed_step: err.step,
                    step_number: err.step.number(),
                    error: err.failure.to_string(),
                    timed_out: err.is_timeout(),
                    context: &err.context,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            print_failure(&err);
            std::process::exit(1);
        }
    }
}

fn print_summary(context: &WorkflowContext) {
    println!();
    println!("{}", "✓ Provisioning complete".green().bold());
    for (label, id) in context.known_resources() {
        println!("  {:<22} {}", format!("{}:", label), id.cyan());
    }
    for association in &context.associations {
        println!(
            "  {} {} -> {} {}",
            "•".dimmed(),
            association.ip_address.bold(),
            association.target,
            association.target_id
        );
    }
}

fn print_failure(err: &WorkflowError) {
    eprintln!();
    eprintln!(
        "{} step {}/{} ({}) failed: {}",
        "Error:".red().bold(),
        err.step.number(),
        Step::ALL.len(),
        err.step,
        err.failure
    );

    let resources = err.context.known_resources();
    if resources.is_empty() {
        eprintln!("No resources were created.");
        return;
    }

    eprintln!(
        "{}",
        "Resources created before the failure (not cleaned up):".yellow()
    );
    for (label, id) in resources {
        eprintln!("  {:<22} {}", format!("{}:", label), id);
    }
    eprintln!(
        "{}",
        "Running provision again creates a new set of resources. Release these manually if unused."
            .dimmed()
    );
}
