use quarry_config::load_config;
use quarry_config::shared::{
    ClusterConfig, IdpConnectionConfig, ObjectStoreConfig, OidcClientConfig, RegistryRolesConfig,
};
use serde::Deserialize;

/// Settings of the identity bootstrap run.
#[derive(Debug, Deserialize)]
pub struct IdpInitSettings {
    pub idp: IdpConnectionConfig,
    pub cluster: ClusterConfig,
    /// Platform API client; runs with a service account.
    pub api_client: OidcClientConfig,
    /// Object-store console client; runs with a service account and owns
    /// the console role.
    pub console_client: OidcClientConfig,
    /// Catalog web UI client.
    pub catalog_client: OidcClientConfig,
    /// Registry realm roles and their token claim.
    pub registry: RegistryRolesConfig,
    pub object_store: ObjectStoreConfig,
}

pub fn load_settings() -> anyhow::Result<IdpInitSettings> {
    Ok(load_config::<IdpInitSettings>()?)
}
