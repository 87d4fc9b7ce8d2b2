use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;

/// Admin connection settings for the S3-compatible object store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// API endpoint including scheme, e.g. `https://minio:9000`.
    pub host: String,
    pub root_user: String,
    pub root_password: SerializableSecretString,
    /// Skips TLS verification in the admin CLI. Used for local clusters.
    #[serde(default)]
    pub insecure: bool,
}

impl ObjectStoreConfig {
    /// Returns the endpoint without its scheme prefix.
    ///
    /// The registry storage section wants a bare `host:port`.
    pub fn sanitized_host(&self) -> &str {
        self.host
            .strip_prefix("https://")
            .or_else(|| self.host.strip_prefix("http://"))
            .unwrap_or(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_host_strips_scheme() {
        let config = ObjectStoreConfig {
            host: "https://minio:9000".to_owned(),
            root_user: "root".to_owned(),
            root_password: "pass".into(),
            insecure: false,
        };
        assert_eq!(config.sanitized_host(), "minio:9000");
    }

    #[test]
    fn sanitized_host_passes_bare_hosts_through() {
        let config = ObjectStoreConfig {
            host: "minio:9000".to_owned(),
            root_user: "root".to_owned(),
            root_password: "pass".into(),
            insecure: true,
        };
        assert_eq!(config.sanitized_host(), "minio:9000");
    }
}
