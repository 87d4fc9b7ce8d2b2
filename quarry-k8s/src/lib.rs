//! Kubernetes integration for the bootstrap jobs.
//!
//! The one-shot processes publish their outputs (rendered configuration
//! files, issued tokens, provisioned client secrets) as ConfigMaps and
//! Secrets in the deployment namespace. Consumers should depend on the
//! [`ClusterClient`] trait and avoid relying on a specific transport; the
//! default implementation, [`KubeClusterClient`], talks to the cluster
//! using the ambient configuration (in-cluster or local `~/.kube/config`).
//!
//! Submission is idempotent: a 409 "already exists" answer from the API
//! server counts as success, because re-running a bootstrap job against an
//! already-bootstrapped cluster must be harmless.

mod client;
mod resources;

pub use client::*;
pub use resources::*;
