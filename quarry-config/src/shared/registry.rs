use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;
use crate::shared::PollConfig;

/// Settings for the container-registry bootstrap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Public hostname the registry serves under.
    pub server_hostname: String,
    /// Redis instance backing build logs and user events.
    pub redis_host: String,
    pub redis_port: u16,
    /// Relational database backing the registry.
    pub database: RegistryDatabaseConfig,
    /// Object-store bucket holding the image layers.
    pub bucket: String,
    /// OIDC client the registry logs users in through.
    pub oidc_client: String,
    pub oidc_secret: SerializableSecretString,
    /// Issuer URL of the identity provider realm.
    pub oidc_issuer: String,
    /// Token claim the registry reads team memberships from.
    pub group_claim: String,
    /// Organization that owns the bootstrap teams and repositories.
    pub organization: String,
    /// Path to the registry configuration template.
    #[serde(default = "default_config_template")]
    pub config_template: String,
    /// Readiness probing policy applied before the API is configured.
    #[serde(default)]
    pub readiness: PollConfig,
}

fn default_config_template() -> String {
    "config.yaml".to_owned()
}

/// Connection settings for the registry database.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryDatabaseConfig {
    pub host: String,
    pub name: String,
    pub username: String,
    pub password: SerializableSecretString,
}

impl RegistryDatabaseConfig {
    /// Renders the connection URI the registry expects.
    pub fn connection_uri(&self) -> String {
        format!(
            "postgresql://{}:{}@{}/{}",
            self.username,
            self.password.expose(),
            self.host,
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_uri_includes_all_parts() {
        let database = RegistryDatabaseConfig {
            host: "db:5432".to_owned(),
            name: "registry".to_owned(),
            username: "registry".to_owned(),
            password: "hunter2".into(),
        };
        assert_eq!(
            database.connection_uri(),
            "postgresql://registry:hunter2@db:5432/registry"
        );
    }
}
