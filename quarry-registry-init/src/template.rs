use quarry_config::shared::{ObjectStoreConfig, RegistryConfig};
use serde_yaml::Value;
use thiserror::Error;

use crate::storage::S3Credentials;

/// Errors raised while rendering the registry configuration.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("registry config template is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("registry config template is missing the `{0}` section")]
    MissingSection(&'static str),
}

/// Renders the registry configuration from its YAML template.
///
/// The template ships with the image and carries the static option set;
/// this fills in everything deployment-specific: redis, database,
/// object-store backing, hostname/scheme, and the OIDC login block.
pub fn render_registry_config(
    template: &str,
    registry: &RegistryConfig,
    store: &ObjectStoreConfig,
    credentials: &S3Credentials,
) -> Result<String, TemplateError> {
    let mut config: Value = serde_yaml::from_str(template)?;

    for section in ["BUILDLOGS_REDIS", "USER_EVENTS_REDIS"] {
        let redis = section_mut(&mut config, section)?;
        redis["host"] = Value::from(registry.redis_host.clone());
        redis["port"] = Value::from(registry.redis_port);
    }

    config["DB_URI"] = Value::from(registry.database.connection_uri());

    // The storage stanza is a [kind, params] pair; only the params change.
    let storage = section_mut(&mut config, "DISTRIBUTED_STORAGE_CONFIG")?
        .get_mut("default")
        .and_then(Value::as_sequence_mut)
        .and_then(|default| default.get_mut(1))
        .ok_or(TemplateError::MissingSection("DISTRIBUTED_STORAGE_CONFIG"))?;
    storage["hostname"] = Value::from(store.sanitized_host());
    storage["access_key"] = Value::from(credentials.access_key.clone());
    storage["secret_key"] = Value::from(credentials.secret_key.clone());
    storage["bucket_name"] = Value::from(registry.bucket.clone());
    storage["is_secure"] = Value::from(!store.insecure);

    config["SERVER_HOSTNAME"] = Value::from(registry.server_hostname.clone());
    config["PREFERRED_URL_SCHEME"] = Value::from(if store.insecure { "http" } else { "https" });

    let oidc = section_mut(&mut config, "OIDC_LOGIN_CONFIG")?;
    oidc["CLIENT_ID"] = Value::from(registry.oidc_client.clone());
    oidc["CLIENT_SECRET"] = Value::from(registry.oidc_secret.expose());
    oidc["OIDC_SERVER"] = Value::from(registry.oidc_issuer.clone());
    oidc["PREFERRED_GROUP_CLAIM_NAME"] = Value::from(registry.group_claim.clone());
    oidc["DEBUGGING"] = Value::from(store.insecure);

    Ok(serde_yaml::to_string(&config)?)
}

fn section_mut<'a>(
    config: &'a mut Value,
    section: &'static str,
) -> Result<&'a mut Value, TemplateError> {
    config
        .get_mut(section)
        .ok_or(TemplateError::MissingSection(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_config::shared::RegistryDatabaseConfig;

    const TEMPLATE: &str = "\
BUILDLOGS_REDIS:
  host: placeholder
  port: 0
USER_EVENTS_REDIS:
  host: placeholder
  port: 0
DB_URI: placeholder
DISTRIBUTED_STORAGE_CONFIG:
  default:
    - RadosGWStorage
    - hostname: placeholder
      access_key: placeholder
      secret_key: placeholder
      bucket_name: placeholder
      is_secure: true
SERVER_HOSTNAME: placeholder
PREFERRED_URL_SCHEME: https
OIDC_LOGIN_CONFIG:
  CLIENT_ID: placeholder
  CLIENT_SECRET: placeholder
  OIDC_SERVER: placeholder
  PREFERRED_GROUP_CLAIM_NAME: placeholder
  DEBUGGING: false
";

    fn registry() -> RegistryConfig {
        RegistryConfig {
            server_hostname: "registry.example.org".to_owned(),
            redis_host: "redis".to_owned(),
            redis_port: 6379,
            database: RegistryDatabaseConfig {
                host: "db:5432".to_owned(),
                name: "registry".to_owned(),
                username: "registry".to_owned(),
                password: "db-pass".into(),
            },
            bucket: "registry-layers".to_owned(),
            oidc_client: "registry".to_owned(),
            oidc_secret: "oidc-secret".into(),
            oidc_issuer: "https://idp.example.org/realms/master".to_owned(),
            group_claim: "registry_groups".to_owned(),
            organization: "quarry".to_owned(),
            config_template: "config.yaml".to_owned(),
            readiness: Default::default(),
        }
    }

    fn store() -> ObjectStoreConfig {
        ObjectStoreConfig {
            host: "http://minio:9000".to_owned(),
            root_user: "root".to_owned(),
            root_password: "root-pass".into(),
            insecure: true,
        }
    }

    #[test]
    fn fills_every_deployment_specific_field() {
        let credentials = S3Credentials {
            access_key: "AK".to_owned(),
            secret_key: "SK".to_owned(),
        };

        let rendered =
            render_registry_config(TEMPLATE, &registry(), &store(), &credentials).unwrap();
        let config: Value = serde_yaml::from_str(&rendered).unwrap();

        assert_eq!(config["BUILDLOGS_REDIS"]["host"], Value::from("redis"));
        assert_eq!(config["USER_EVENTS_REDIS"]["port"], Value::from(6379));
        assert_eq!(
            config["DB_URI"],
            Value::from("postgresql://registry:db-pass@db:5432/registry")
        );
        assert_eq!(
            config["DISTRIBUTED_STORAGE_CONFIG"]["default"][1]["hostname"],
            Value::from("minio:9000")
        );
        assert_eq!(
            config["DISTRIBUTED_STORAGE_CONFIG"]["default"][1]["is_secure"],
            Value::from(false)
        );
        assert_eq!(config["PREFERRED_URL_SCHEME"], Value::from("http"));
        assert_eq!(config["OIDC_LOGIN_CONFIG"]["CLIENT_ID"], Value::from("registry"));
        assert_eq!(config["OIDC_LOGIN_CONFIG"]["DEBUGGING"], Value::from(true));
    }

    #[test]
    fn missing_sections_are_errors() {
        let credentials = S3Credentials {
            access_key: "AK".to_owned(),
            secret_key: "SK".to_owned(),
        };

        let result = render_registry_config("DB_URI: x\n", &registry(), &store(), &credentials);
        assert!(matches!(result, Err(TemplateError::MissingSection(_))));
    }
}
