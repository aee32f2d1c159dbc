mod commands;
mod progress;
mod setup;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecsflow")]
#[command(
    about = "Provision an ECS instance with a secondary network interface and two elastic IPs",
    long_about = None
)]
struct Cli {
    /// Config file path (skips discovery, including ECSFLOW_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the provisioning workflow
    Provision {
        /// Seconds to wait for each status change (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between status polls (overrides config)
        #[arg(long)]
        interval: Option<u64>,
        /// Print the resulting resources as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Show the provisioning steps without calling the cloud
    Plan,
    /// Show the current status of an instance
    Status {
        /// Instance ID (i-...)
        instance_id: String,
    },
    /// Wait until an instance reaches a status
    Wait {
        /// Instance ID (i-...)
        instance_id: String,
        /// Desired status (Running, Stopped, ...)
        status: String,
        /// Seconds to wait before giving up (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between polls (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("ecsflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Plan => {
            commands::plan::handle();
        }
        Commands::Provision {
            timeout,
            interval,
            json,
        } => {
            let (config, config_path) = setup::load_config(cli.config.as_deref())?;
            let wait = setup::wait_config(&config, timeout, interval);
            commands::provision::handle(&config, &config_path, wait, json).await?;
        }
        Commands::Status { instance_id } => {
            let (config, _) = setup::load_config(cli.config.as_deref())?;
            commands::status::handle(&config, &instance_id).await?;
        }
        Commands::Wait {
            instance_id,
            status,
            timeout,
            interval,
        } => {
            let (config, _) = setup::load_config(cli.config.as_deref())?;
            let wait = setup::wait_config(&config, timeout, interval);
            commands::wait::handle(&config, &instance_id, &status, wait).await?;
        }
    }

    Ok(())
}
