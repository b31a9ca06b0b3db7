//! Error taxonomy for the remote sources

use thiserror::Error;

/// Failure of a remote fetch against the cluster.
///
/// The two variants carry different severities for the sampling loop: usage
/// data that has not been published yet is an expected condition that the
/// loop retries on its next tick, while an API failure during a status check
/// ends the run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The metrics pipeline has no usage data for the pod yet.
    #[error("usage metrics not yet available for {namespace}/{pod_name}")]
    UsageNotAvailable { namespace: String, pod_name: String },

    /// Transport, authorization, or API-server failure, surfaced unmodified.
    #[error(transparent)]
    Api(#[from] kube::Error),
}

impl FetchError {
    /// True for conditions expected to clear on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::UsageNotAvailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_not_available_is_transient() {
        let err = FetchError::UsageNotAvailable {
            namespace: "default".to_string(),
            pod_name: "batch-job-x7k".to_string(),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("default/batch-job-x7k"));
    }

    #[test]
    fn test_api_error_is_not_transient() {
        let err = FetchError::Api(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "pods \"batch-job-x7k\" is forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        }));
        assert!(!err.is_transient());
    }
}
