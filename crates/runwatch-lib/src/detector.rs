//! Container termination detection
//!
//! Answers one question per poll: has the target container reached a
//! terminal state, and if so, what lifecycle timestamps did the kubelet
//! record for it.

use crate::error::FetchError;
use crate::models::{ContainerLifecycleStatus, WorkloadRef};
use crate::sources::WorkloadStatusSource;
use std::sync::Arc;

/// Checks the target container's lifecycle state against the status source.
#[derive(Clone)]
pub struct TerminationDetector {
    source: Arc<dyn WorkloadStatusSource>,
}

impl TerminationDetector {
    pub fn new(source: Arc<dyn WorkloadStatusSource>) -> Self {
        Self { source }
    }

    /// Fetch the pod's current container statuses and return the target
    /// container's lifecycle state.
    ///
    /// A container with no status entry yet is reported as `Waiting` rather
    /// than an error. Transport failures surface unmodified; there is no
    /// retry at this layer.
    pub async fn check(
        &self,
        target: &WorkloadRef,
    ) -> Result<ContainerLifecycleStatus, FetchError> {
        let statuses = self
            .source
            .fetch_statuses(&target.namespace, &target.pod_name)
            .await?;

        Ok(statuses
            .get(&target.container_name)
            .cloned()
            .unwrap_or(ContainerLifecycleStatus::Waiting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{async_trait, ContainerStatuses};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    struct FixedStatusSource {
        statuses: ContainerStatuses,
    }

    #[async_trait]
    impl WorkloadStatusSource for FixedStatusSource {
        async fn fetch_statuses(
            &self,
            _namespace: &str,
            _pod_name: &str,
        ) -> Result<ContainerStatuses, FetchError> {
            Ok(self.statuses.clone())
        }
    }

    struct FailingStatusSource;

    #[async_trait]
    impl WorkloadStatusSource for FailingStatusSource {
        async fn fetch_statuses(
            &self,
            _namespace: &str,
            _pod_name: &str,
        ) -> Result<ContainerStatuses, FetchError> {
            Err(FetchError::Api(kube::Error::Api(
                kube::core::ErrorResponse {
                    status: "Failure".to_string(),
                    message: "connection refused".to_string(),
                    reason: "ServiceUnavailable".to_string(),
                    code: 503,
                },
            )))
        }
    }

    fn target() -> WorkloadRef {
        WorkloadRef::new("default", "batch-job-x7k", "worker")
    }

    #[tokio::test]
    async fn test_check_returns_terminal_status_with_timestamps() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let finished = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 5).unwrap();

        let mut statuses = HashMap::new();
        statuses.insert(
            "worker".to_string(),
            ContainerLifecycleStatus::Terminated {
                started_at: Some(started),
                finished_at: Some(finished),
            },
        );

        let detector = TerminationDetector::new(Arc::new(FixedStatusSource { statuses }));
        let status = detector.check(&target()).await.unwrap();

        assert_eq!(
            status,
            ContainerLifecycleStatus::Terminated {
                started_at: Some(started),
                finished_at: Some(finished),
            }
        );
    }

    #[tokio::test]
    async fn test_check_returns_running_for_live_container() {
        let mut statuses = HashMap::new();
        statuses.insert("worker".to_string(), ContainerLifecycleStatus::Running);

        let detector = TerminationDetector::new(Arc::new(FixedStatusSource { statuses }));
        let status = detector.check(&target()).await.unwrap();

        assert!(!status.is_terminated());
    }

    #[tokio::test]
    async fn test_missing_container_entry_is_waiting_not_error() {
        let mut statuses = HashMap::new();
        statuses.insert("sidecar".to_string(), ContainerLifecycleStatus::Running);

        let detector = TerminationDetector::new(Arc::new(FixedStatusSource { statuses }));
        let status = detector.check(&target()).await.unwrap();

        assert_eq!(status, ContainerLifecycleStatus::Waiting);
    }

    #[tokio::test]
    async fn test_source_failure_surfaces_unmodified() {
        let detector = TerminationDetector::new(Arc::new(FailingStatusSource));
        let err = detector.check(&target()).await.unwrap_err();

        assert!(!err.is_transient());
    }
}
