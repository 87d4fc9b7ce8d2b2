use std::collections::BTreeMap;

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builds a namespaced ConfigMap carrying the given key/value entries.
pub fn config_map(name: &str, namespace: &str, data: BTreeMap<String, String>) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

/// Builds a namespaced `Opaque` Secret carrying the given entries.
///
/// Values are stored in the `data` section, so they reach the API server
/// base64-encoded as the resource payload format requires.
pub fn opaque_secret(name: &str, namespace: &str, data: BTreeMap<String, String>) -> Secret {
    let encoded = data
        .into_iter()
        .map(|(key, value)| (key, ByteString(value.into_bytes())))
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        type_: Some("Opaque".to_owned()),
        data: Some(encoded),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_map_carries_name_namespace_and_data() {
        let data = BTreeMap::from([("app.ini".to_owned(), "key = value".to_owned())]);
        let config_map = config_map("app-config", "platform", data);

        assert_eq!(config_map.metadata.name.as_deref(), Some("app-config"));
        assert_eq!(config_map.metadata.namespace.as_deref(), Some("platform"));
        assert_eq!(
            config_map.data.unwrap().get("app.ini").map(String::as_str),
            Some("key = value")
        );
    }

    #[test]
    fn secret_values_are_base64_encoded_on_the_wire() {
        let data = BTreeMap::from([("token".to_owned(), "s3cret".to_owned())]);
        let secret = opaque_secret("admin-token", "platform", data);

        assert_eq!(secret.type_.as_deref(), Some("Opaque"));

        let wire = serde_json::to_value(&secret).unwrap();
        assert_eq!(wire["metadata"]["name"], "admin-token");
        assert_eq!(wire["metadata"]["namespace"], "platform");
        // "s3cret" base64-encodes to "czNjcmV0".
        assert_eq!(wire["data"]["token"], "czNjcmV0");
    }

    #[test]
    fn resources_declare_the_core_api_group() {
        use k8s_openapi::Resource as _;

        assert_eq!(ConfigMap::API_VERSION, "v1");
        assert_eq!(ConfigMap::KIND, "ConfigMap");
        assert_eq!(Secret::API_VERSION, "v1");
        assert_eq!(Secret::KIND, "Secret");
    }
}
