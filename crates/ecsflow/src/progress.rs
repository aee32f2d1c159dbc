use colored::Colorize;
use ecsflow_cloud::{Step, StepFailure, StepReporter, WorkflowContext};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Ticking spinner on stderr
pub fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Spinner showing the running step, with one line per finished step
#[derive(Clone)]
pub struct StepProgress {
    progress_bar: ProgressBar,
}

impl StepProgress {
    pub fn new() -> Self {
        Self {
            progress_bar: spinner(),
        }
    }

    /// Draws nothing; used when stdout carries JSON
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

impl Default for StepProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn position(step: Step) -> String {
    format!("[{}/{}]", step.number(), Step::ALL.len())
}

/// What a step added to the context, for display
pub fn step_output(step: Step, context: &WorkflowContext) -> Option<String> {
    match step {
        Step::CreateInstance => context.instance_id.as_ref().map(|id| id.to_string()),
        Step::AllocatePrimaryIp => context.primary_ip.as_ref().map(|ip| ip.to_string()),
        Step::CreateNetworkInterface => context
            .network_interface_id
            .as_ref()
            .map(|id| id.to_string()),
        Step::AllocateSecondaryIp => context.secondary_ip.as_ref().map(|ip| ip.to_string()),
        Step::AssociatePrimaryIp | Step::AssociateSecondaryIp => {
            context.associations.last().map(|a| {
                format!("{} -> {} {}", a.ip_address, a.target, a.target_id)
            })
        }
        _ => None,
    }
}

impl StepReporter for StepProgress {
    fn step_started(&self, step: Step) {
        self.progress_bar
            .set_message(format!("{} {}...", position(step), step));
    }

    fn step_completed(&self, step: Step, context: &WorkflowContext) {
        let line = match step_output(step, context) {
            Some(output) => format!(
                "{} {} {}: {}",
                "✓".green(),
                position(step).dimmed(),
                step,
                output.cyan()
            ),
            None => format!("{} {} {}", "✓".green(), position(step).dimmed(), step),
        };
        self.progress_bar.println(line);
    }

    fn step_failed(&self, step: Step, failure: &StepFailure) {
        self.progress_bar.println(format!(
            "{} {} {}: {}",
            "✗".red(),
            position(step).dimmed(),
            step,
            failure.to_string().red()
        ));
    }
}
