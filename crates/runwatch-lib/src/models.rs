//! Core data models for the run monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the monitored unit: one container within one pod.
///
/// Supplied by the caller at startup and never mutated; the monitor does
/// no workload discovery of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub namespace: String,
    pub pod_name: String,
    pub container_name: String,
}

impl WorkloadRef {
    pub fn new(
        namespace: impl Into<String>,
        pod_name: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod_name: pod_name.into(),
            container_name: container_name.into(),
        }
    }
}

impl std::fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace, self.pod_name, self.container_name
        )
    }
}

/// Lifecycle state of a container as reported by the pod status.
///
/// The terminal variant carries the timestamps the kubelet recorded; either
/// may be missing, in which case the run duration degrades to absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum ContainerLifecycleStatus {
    Running,
    Waiting,
    Terminated {
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    },
}

impl ContainerLifecycleStatus {
    pub fn is_terminated(&self) -> bool {
        matches!(self, ContainerLifecycleStatus::Terminated { .. })
    }
}

/// One point-in-time resource usage observation for a container.
///
/// CPU is an instantaneous rate estimate from the metrics pipeline, not a
/// cumulative counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub memory_bytes: u64,
    pub cpu_millicores: u64,
}

/// Final output of one monitoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Highest memory usage seen across all samples; 0 if none were folded.
    pub peak_memory_bytes: u64,
    /// Arithmetic mean of the CPU samples; absent when no samples were folded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cpu_millicores: Option<f64>,
    /// Wall-clock run time in milliseconds; absent when the terminal
    /// timestamps were not recoverable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_millis: Option<i64>,
    /// Number of samples that contributed to the averages.
    pub sample_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_workload_ref_display() {
        let target = WorkloadRef::new("default", "batch-job-x7k", "worker");
        assert_eq!(target.to_string(), "default/batch-job-x7k/worker");
    }

    #[test]
    fn test_is_terminated() {
        assert!(!ContainerLifecycleStatus::Running.is_terminated());
        assert!(!ContainerLifecycleStatus::Waiting.is_terminated());

        let terminated = ContainerLifecycleStatus::Terminated {
            started_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            finished_at: None,
        };
        assert!(terminated.is_terminated());
    }

    #[test]
    fn test_summary_omits_absent_fields_in_json() {
        let summary = RunSummary {
            peak_memory_bytes: 0,
            average_cpu_millicores: None,
            duration_millis: None,
            sample_count: 0,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("average_cpu_millicores"));
        assert!(!json.contains("duration_millis"));
        assert!(json.contains("peak_memory_bytes"));
    }
}
