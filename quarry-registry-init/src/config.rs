use quarry_config::load_config;
use quarry_config::shared::{
    ClusterConfig, IdpConnectionConfig, ObjectStoreConfig, RegistryConfig, RegistryRolesConfig,
};
use serde::Deserialize;

/// Settings of the container-registry bootstrap run.
#[derive(Debug, Deserialize)]
pub struct RegistryInitSettings {
    pub idp: IdpConnectionConfig,
    pub cluster: ClusterConfig,
    pub registry: RegistryConfig,
    /// Teams mirroring the realm roles created by the identity bootstrap.
    pub teams: RegistryRolesConfig,
    pub object_store: ObjectStoreConfig,
}

pub fn load_settings() -> anyhow::Result<RegistryInitSettings> {
    Ok(load_config::<RegistryInitSettings>()?)
}
