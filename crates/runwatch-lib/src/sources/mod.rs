//! Remote sources the monitor polls
//!
//! The sampling loop consumes two read-only capabilities: the pod status
//! (for termination checks) and the live usage metrics (for samples). Both
//! are trait objects so the loop can be exercised against scripted
//! implementations in tests.

mod kube;

pub use self::kube::{
    ContainerUsage, ContainerUsageValues, KubeStatusSource, KubeUsageSource, PodMetrics,
};

use crate::error::FetchError;
use crate::models::{ContainerLifecycleStatus, ResourceSample};
use std::collections::HashMap;

pub use async_trait::async_trait;

/// Current lifecycle status of each container in a pod, keyed by name.
pub type ContainerStatuses = HashMap<String, ContainerLifecycleStatus>;

/// Point-in-time usage of each container in a pod, keyed by name.
pub type ContainerUsages = HashMap<String, ResourceSample>;

/// Read-only view of a pod's container lifecycle statuses.
#[async_trait]
pub trait WorkloadStatusSource: Send + Sync {
    async fn fetch_statuses(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Result<ContainerStatuses, FetchError>;
}

/// Read-only view of a pod's live resource usage.
///
/// Implementations fail with [`FetchError::UsageNotAvailable`] while the
/// metrics pipeline has nothing for the pod yet; callers treat that as a
/// retry condition, not an outage.
#[async_trait]
pub trait UsageMetricsSource: Send + Sync {
    async fn fetch_usage(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Result<ContainerUsages, FetchError>;
}
