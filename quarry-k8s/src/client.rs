use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Api, PostParams};
use thiserror::Error;
use tracing::info;

/// Errors emitted by the cluster integration.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// An error returned by the [`kube`] client when talking to the API
    /// server.
    #[error("an error occurred while talking to the cluster API: {0}")]
    Kube(#[from] kube::Error),
    /// A resource was submitted without a namespace in its metadata.
    #[error("resource {0} carries no namespace")]
    MissingNamespace(String),
}

/// Client interface for publishing resources into the cluster.
///
/// Implementations must treat an "already exists" conflict as success so
/// bootstrap jobs stay re-runnable.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Creates the given ConfigMap in its namespace.
    async fn apply_config_map(&self, config_map: ConfigMap) -> Result<(), ClusterError>;

    /// Creates the given Secret in its namespace.
    async fn apply_secret(&self, secret: Secret) -> Result<(), ClusterError>;
}

/// [`ClusterClient`] backed by the [`kube`] crate.
pub struct KubeClusterClient {
    client: kube::Client,
}

impl KubeClusterClient {
    /// Connects using the ambient configuration, in-cluster when running as
    /// a pod and the local kubeconfig otherwise.
    pub async fn connect() -> Result<Self, ClusterError> {
        let client = kube::Client::try_default().await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn apply_config_map(&self, config_map: ConfigMap) -> Result<(), ClusterError> {
        let name = config_map.metadata.name.clone().unwrap_or_default();
        let namespace = namespace_of(&config_map.metadata, &name)?;
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &namespace);

        match api.create(&PostParams::default(), &config_map).await {
            Ok(_) => {
                info!(name, namespace, "config map created");
                Ok(())
            }
            Err(kube::Error::Api(e)) if e.code == 409 => {
                info!(name, namespace, "config map already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn apply_secret(&self, secret: Secret) -> Result<(), ClusterError> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let namespace = namespace_of(&secret.metadata, &name)?;
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);

        match api.create(&PostParams::default(), &secret).await {
            Ok(_) => {
                info!(name, namespace, "secret created");
                Ok(())
            }
            Err(kube::Error::Api(e)) if e.code == 409 => {
                info!(name, namespace, "secret already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn namespace_of(
    metadata: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
    name: &str,
) -> Result<String, ClusterError> {
    metadata
        .namespace
        .clone()
        .ok_or_else(|| ClusterError::MissingNamespace(name.to_owned()))
}
