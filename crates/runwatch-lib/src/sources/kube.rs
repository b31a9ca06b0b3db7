//! Kubernetes-backed source implementations
//!
//! Pod statuses come from the core API; usage comes from the
//! `metrics.k8s.io/v1beta1` aggregated API, which `k8s-openapi` does not
//! ship types for, so the resource is declared by hand.

use super::{async_trait, ContainerStatuses, ContainerUsages, UsageMetricsSource, WorkloadStatusSource};
use crate::error::FetchError;
use crate::models::{ContainerLifecycleStatus, ResourceSample};
use crate::quantity;
use k8s_openapi::api::core::v1::{ContainerState, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Api, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Usage of a single container as reported by the metrics API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerUsage {
    pub name: String,
    pub usage: ContainerUsageValues,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerUsageValues {
    pub cpu: Quantity,
    pub memory: Quantity,
}

/// Pod metrics object served by `metrics.k8s.io/v1beta1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodMetrics {
    pub metadata: ObjectMeta,
    pub timestamp: Option<String>,
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerUsage>,
}

impl k8s_openapi::Resource for PodMetrics {
    type Scope = k8s_openapi::NamespaceResourceScope;

    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = "metrics.k8s.io";
    const KIND: &'static str = "PodMetrics";
    const URL_PATH_SEGMENT: &'static str = "pods";
    const VERSION: &'static str = "v1beta1";
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

/// Container lifecycle statuses read from the pod's status subresource.
#[derive(Clone)]
pub struct KubeStatusSource {
    client: Client,
}

impl KubeStatusSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkloadStatusSource for KubeStatusSource {
    async fn fetch_statuses(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Result<ContainerStatuses, FetchError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods.get(pod_name).await?;

        let statuses = pod
            .status
            .and_then(|status| status.container_statuses)
            .unwrap_or_default();

        Ok(statuses
            .into_iter()
            .map(|status| (status.name, lifecycle_from_state(status.state)))
            .collect())
    }
}

/// Live container usage read from the metrics API.
#[derive(Clone)]
pub struct KubeUsageSource {
    client: Client,
}

impl KubeUsageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UsageMetricsSource for KubeUsageSource {
    async fn fetch_usage(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Result<ContainerUsages, FetchError> {
        let metrics: Api<PodMetrics> = Api::namespaced(self.client.clone(), namespace);

        let pod_metrics = match metrics.get(pod_name).await {
            Ok(pod_metrics) => pod_metrics,
            // The metrics API 404s until the pipeline has scraped the pod.
            Err(kube::Error::Api(response)) if response.code == 404 => {
                return Err(FetchError::UsageNotAvailable {
                    namespace: namespace.to_string(),
                    pod_name: pod_name.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        Ok(usages_from_metrics(pod_metrics))
    }
}

/// Map a container state from the pod status to the monitor's lifecycle
/// model. A terminated state wins over a lingering running entry.
fn lifecycle_from_state(state: Option<ContainerState>) -> ContainerLifecycleStatus {
    let Some(state) = state else {
        return ContainerLifecycleStatus::Waiting;
    };

    if let Some(terminated) = state.terminated {
        return ContainerLifecycleStatus::Terminated {
            started_at: terminated.started_at.map(|time| time.0),
            finished_at: terminated.finished_at.map(|time| time.0),
        };
    }

    if state.running.is_some() {
        ContainerLifecycleStatus::Running
    } else {
        ContainerLifecycleStatus::Waiting
    }
}

fn usages_from_metrics(pod_metrics: PodMetrics) -> ContainerUsages {
    let mut usages = HashMap::with_capacity(pod_metrics.containers.len());

    for container in pod_metrics.containers {
        let Some(memory_bytes) = quantity::memory_bytes(&container.usage.memory) else {
            warn!(
                container = %container.name,
                quantity = %container.usage.memory.0,
                "Skipping container with unparseable memory quantity"
            );
            continue;
        };
        let Some(cpu_millicores) = quantity::cpu_millicores(&container.usage.cpu) else {
            warn!(
                container = %container.name,
                quantity = %container.usage.cpu.0,
                "Skipping container with unparseable cpu quantity"
            );
            continue;
        };

        usages.insert(
            container.name,
            ResourceSample {
                memory_bytes,
                cpu_millicores,
            },
        );
    }

    usages
}
