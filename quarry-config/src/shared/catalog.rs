use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;

/// Connection settings for the catalog HTTP API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
    /// API token of the account publishing datasets.
    pub api_token: SerializableSecretString,
}
