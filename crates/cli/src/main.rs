//! Workload run monitor CLI
//!
//! Watches one container of a pod until it terminates, then reports peak
//! memory, average CPU, and wall-clock duration for the run.

mod output;

use anyhow::{Context, Result};
use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use runwatch_lib::{KubeStatusSource, KubeUsageSource, RunSampler, WorkloadRef};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Workload run monitor CLI
#[derive(Parser)]
#[command(name = "runwatch")]
#[command(author, version, about = "Monitors a container's resource usage until it terminates", long_about = None)]
struct Cli {
    /// Pod whose container should be monitored
    pod: String,

    /// Container name within the pod
    #[arg(long, short, env = "RUNWATCH_CONTAINER")]
    container: String,

    /// Namespace of the pod
    #[arg(long, short, env = "RUNWATCH_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Seconds between usage samples
    #[arg(long, default_value_t = 10)]
    interval_secs: u64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Path to kubeconfig file (in-cluster or default config if not specified)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<String>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let client = build_client(cli.kubeconfig.as_deref()).await?;
    let target = WorkloadRef::new(&cli.namespace, &cli.pod, &cli.container);

    output::print_info(&format!("Monitoring {}", target));

    let sampler = RunSampler::builder()
        .target(target)
        .status_source(Arc::new(KubeStatusSource::new(client.clone())))
        .usage_source(Arc::new(KubeUsageSource::new(client)))
        .poll_interval(Duration::from_secs(cli.interval_secs))
        .build()?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("SIGINT received, stopping after the current tick");
                let _ = shutdown_tx.send(());
            }
            Err(err) => warn!(error = %err, "Failed to listen for shutdown signal"),
        }
    });

    let summary = sampler.run(shutdown_rx).await;
    output::print_summary(&summary, cli.format)?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Build a cluster client from an explicit kubeconfig path, or infer the
/// configuration (in-cluster service account or the default kubeconfig).
async fn build_client(kubeconfig: Option<&str>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig at {}", path))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("Failed to load kubeconfig")?
        }
        None => Config::infer()
            .await
            .context("Failed to infer cluster configuration")?,
    };

    Client::try_from(config).context("Failed to create cluster client")
}
