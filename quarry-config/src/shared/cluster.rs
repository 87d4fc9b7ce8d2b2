use serde::{Deserialize, Serialize};

/// Settings for publishing resources into the Kubernetes cluster.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Namespace that receives the generated ConfigMaps and Secrets.
    pub namespace: String,
}
