//! Core library for the workload run monitor
//!
//! This crate provides the building blocks for observing one container of a
//! running pod until it terminates:
//! - Lifecycle status and termination detection from the pod status
//! - Periodic resource usage sampling from the metrics API
//! - Peak-memory / average-CPU accumulation and the final run summary

pub mod detector;
pub mod error;
pub mod models;
pub mod quantity;
pub mod sampler;
pub mod sources;

pub use detector::TerminationDetector;
pub use error::FetchError;
pub use models::*;
pub use sampler::{RunAccumulator, RunSampler, RunSamplerBuilder, DEFAULT_POLL_INTERVAL};
pub use sources::{
    KubeStatusSource, KubeUsageSource, UsageMetricsSource, WorkloadStatusSource,
};
