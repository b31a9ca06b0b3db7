//! Run sampling loop
//!
//! Polls the status and usage sources at a fixed interval, folding each
//! usage sample into running peak/average state until the target container
//! terminates, then derives the run summary.

use crate::detector::TerminationDetector;
use crate::models::{ContainerLifecycleStatus, ResourceSample, RunSummary, WorkloadRef};
use crate::sources::{UsageMetricsSource, WorkloadStatusSource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tracing::{debug, info, warn};

/// Default polling interval between samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Running statistics for one monitoring run.
///
/// Owned exclusively by the sampling loop; a failed or skipped fetch never
/// touches it.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    /// Maximum memory usage seen so far; never decreases.
    pub peak_memory_bytes: u64,
    pub cpu_millicore_sum: u64,
    pub sample_count: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunAccumulator {
    /// Fold one usage sample into the running statistics.
    pub fn fold(&mut self, sample: &ResourceSample) {
        self.peak_memory_bytes = self.peak_memory_bytes.max(sample.memory_bytes);
        self.cpu_millicore_sum += sample.cpu_millicores;
        self.sample_count += 1;
    }

    /// Record the lifecycle timestamps carried by the terminal status.
    pub fn record_lifecycle(
        &mut self,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) {
        self.started_at = started_at;
        self.finished_at = finished_at;
    }

    /// Derive the final summary. Average CPU is absent when no samples were
    /// folded; duration is absent unless both timestamps were recorded.
    pub fn summarize(self) -> RunSummary {
        let average_cpu_millicores = if self.sample_count > 0 {
            Some(self.cpu_millicore_sum as f64 / self.sample_count as f64)
        } else {
            None
        };

        let duration_millis = match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_milliseconds()),
            _ => None,
        };

        RunSummary {
            peak_memory_bytes: self.peak_memory_bytes,
            average_cpu_millicores,
            duration_millis,
            sample_count: self.sample_count,
        }
    }
}

/// Samples one container's resource usage until it terminates.
pub struct RunSampler {
    target: WorkloadRef,
    detector: TerminationDetector,
    usage_source: Arc<dyn UsageMetricsSource>,
    poll_interval: Duration,
}

impl RunSampler {
    pub fn builder() -> RunSamplerBuilder {
        RunSamplerBuilder::new()
    }

    /// Run the sampling loop to completion and return the summary.
    ///
    /// The loop ends when the container terminates, when a status check
    /// fails, or when a stop signal arrives on `shutdown`. Every exit path
    /// yields a summary; errors never propagate out of the run. Usage-fetch
    /// failures are logged and retried on the next tick indefinitely.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> RunSummary {
        info!(
            workload = %self.target,
            interval_secs = self.poll_interval.as_secs(),
            "Starting run monitor"
        );

        let mut accumulator = RunAccumulator::default();
        let mut shutdown_closed = false;

        loop {
            match self.detector.check(&self.target).await {
                Err(err) => {
                    warn!(workload = %self.target, error = %err, "Status check failed, ending run");
                    break;
                }
                Ok(ContainerLifecycleStatus::Terminated {
                    started_at,
                    finished_at,
                }) => {
                    info!(workload = %self.target, "Container terminated");
                    accumulator.record_lifecycle(started_at, finished_at);
                    break;
                }
                Ok(_) => {}
            }

            match self
                .usage_source
                .fetch_usage(&self.target.namespace, &self.target.pod_name)
                .await
            {
                Ok(usages) => match usages.get(&self.target.container_name) {
                    Some(sample) => {
                        accumulator.fold(sample);
                        debug!(
                            workload = %self.target,
                            memory_bytes = sample.memory_bytes,
                            cpu_millicores = sample.cpu_millicores,
                            samples = accumulator.sample_count,
                            "Folded usage sample"
                        );
                    }
                    None => {
                        debug!(workload = %self.target, "No usage entry for container this tick");
                    }
                },
                Err(err) if err.is_transient() => {
                    debug!(workload = %self.target, error = %err, "Usage not available yet, will retry");
                }
                Err(err) => {
                    warn!(workload = %self.target, error = %err, "Usage fetch failed, will retry");
                }
            }

            tokio::select! {
                _ = time::sleep(self.poll_interval) => {}
                result = shutdown.recv(), if !shutdown_closed => match result {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        info!(workload = %self.target, "Stop requested, ending run early");
                        break;
                    }
                    Err(RecvError::Closed) => {
                        // No stop signal can arrive anymore; finish this
                        // tick's sleep and keep polling without the
                        // cancellation arm.
                        shutdown_closed = true;
                        time::sleep(self.poll_interval).await;
                    }
                },
            }
        }

        let summary = accumulator.summarize();
        info!(
            workload = %self.target,
            peak_memory_bytes = summary.peak_memory_bytes,
            samples = summary.sample_count,
            "Run monitor finished"
        );
        summary
    }
}

/// Builder for the run sampler.
pub struct RunSamplerBuilder {
    target: Option<WorkloadRef>,
    status_source: Option<Arc<dyn WorkloadStatusSource>>,
    usage_source: Option<Arc<dyn UsageMetricsSource>>,
    poll_interval: Duration,
}

impl RunSamplerBuilder {
    pub fn new() -> Self {
        Self {
            target: None,
            status_source: None,
            usage_source: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the workload to monitor.
    pub fn target(mut self, target: WorkloadRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the pod status source used for termination checks.
    pub fn status_source(mut self, source: Arc<dyn WorkloadStatusSource>) -> Self {
        self.status_source = Some(source);
        self
    }

    /// Set the usage metrics source.
    pub fn usage_source(mut self, source: Arc<dyn UsageMetricsSource>) -> Self {
        self.usage_source = Some(source);
        self
    }

    /// Set the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build the sampler.
    pub fn build(self) -> Result<RunSampler> {
        let target = self
            .target
            .ok_or_else(|| anyhow::anyhow!("Target workload is required"))?;
        let status_source = self
            .status_source
            .ok_or_else(|| anyhow::anyhow!("Status source is required"))?;
        let usage_source = self
            .usage_source
            .ok_or_else(|| anyhow::anyhow!("Usage source is required"))?;

        Ok(RunSampler {
            target,
            detector: TerminationDetector::new(status_source),
            usage_source,
            poll_interval: self.poll_interval,
        })
    }
}

impl Default for RunSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
