use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;

/// Admin connection settings for the identity provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdpConnectionConfig {
    /// Base URL of the identity provider, e.g. `http://keycloak:8080`.
    pub server_url: String,
    /// Realm that receives the client registrations.
    pub realm: String,
    /// Administrator account used for the token grant.
    pub admin_username: String,
    pub admin_password: SerializableSecretString,
}

/// Registration parameters for one OIDC client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OidcClientConfig {
    /// Client identifier as registered in the identity provider.
    pub name: String,
    /// Home (base) URL of the client application.
    pub home_url: String,
    /// Root URL of the client application. Falls back to the home URL.
    pub root_url: Option<String>,
    /// Login redirect URL, where a downstream integration needs one.
    pub redirect_url: Option<String>,
}

impl OidcClientConfig {
    /// Returns the effective root URL.
    pub fn root_url(&self) -> &str {
        self.root_url.as_deref().unwrap_or(&self.home_url)
    }
}

/// Realm roles and token claim wiring for container-registry access.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryRolesConfig {
    /// Realm role granting push access.
    pub pushers_role: String,
    /// Realm role granting pull access.
    pub pullers_role: String,
    /// Token claim carrying the realm roles for the registry to read.
    pub group_claim: String,
}
