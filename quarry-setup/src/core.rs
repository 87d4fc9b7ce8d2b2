use std::collections::BTreeMap;

use anyhow::Context;
use quarry_k8s::{ClusterClient, KubeClusterClient, config_map, opaque_secret};
use tracing::{info, warn};

use crate::config::{SetupSettings, SpatialSettings};
use crate::tool::ConfigTool;

/// ConfigMap the rendered INI file is published under.
const INI_CONFIG_MAP: &str = "catalog-config";
/// Secret the issued admin API token is published under.
const TOKEN_SECRET: &str = "catalog-admin-token";
/// Key of the INI document inside the ConfigMap.
const INI_KEY: &str = "ckan.ini";

/// Environment variable carrying the site root path.
const ROOT_PATH_VAR: &str = "CKAN__ROOT_PATH";

/// Identity-provider extension options copied from the environment.
const IDP_OPTION_VARS: &[&str] = &[
    "CKANEXT__KEYCLOAK__SERVER_URL",
    "CKANEXT__KEYCLOAK__CLIENT_ID",
    "CKANEXT__KEYCLOAK__REALM_NAME",
    "CKANEXT__KEYCLOAK__REDIRECT_URI",
    "CKANEXT__KEYCLOAK__CLIENT_SECRET_KEY",
    "CKANEXT__KEYCLOAK__BUTTON_STYLE",
    "CKANEXT__KEYCLOAK__ENABLE_CKAN_INTERNAL_LOGIN",
];

/// Prefix of the map-widget option family, copied wholesale when present.
const COMMON_MAP_PREFIX: &str = "CKANEXT__SPATIAL__COMMON_MAP__";

/// Marker line the token CLI prints before the token value.
const TOKEN_MARKER: &str = "API Token created:";

/// Configures the catalog container and publishes the results.
pub async fn run(settings: SetupSettings) -> anyhow::Result<()> {
    info!(ini = settings.catalog_ini, "configuring catalog instance");

    // The process environment is read once; everything downstream works on
    // this snapshot.
    let env: BTreeMap<String, String> = std::env::vars().collect();
    let tool = ConfigTool::new(&settings.catalog_ini);

    apply_root_path(&tool, &env)?;
    apply_idp_options(&tool, &env)?;
    apply_spatial_options(&tool, &env, &settings.spatial)?;

    let cluster = KubeClusterClient::connect()
        .await
        .context("failed to connect to the cluster API")?;
    publish_ini(&cluster, &settings).await?;
    issue_api_token(&tool, &cluster, &settings).await?;

    info!("catalog instance configured");

    Ok(())
}

/// Derives the option key from an environment variable name: lower-cased,
/// with `__` becoming the section separator (`CKAN__ROOT_PATH` →
/// `ckan.root_path`).
fn option_name(envvar: &str) -> String {
    envvar.to_lowercase().replace("__", ".")
}

/// Writes the option corresponding to one environment variable, using the
/// given default when the variable is undefined.
fn apply_env_option(
    tool: &ConfigTool,
    env: &BTreeMap<String, String>,
    envvar: &str,
    default: &str,
) -> anyhow::Result<()> {
    let value = env.get(envvar).map(String::as_str).unwrap_or(default);
    tool.set_option(&option_name(envvar), value, None)?;

    Ok(())
}

fn apply_root_path(tool: &ConfigTool, env: &BTreeMap<String, String>) -> anyhow::Result<()> {
    apply_env_option(tool, env, ROOT_PATH_VAR, "")
}

fn apply_idp_options(tool: &ConfigTool, env: &BTreeMap<String, String>) -> anyhow::Result<()> {
    for envvar in IDP_OPTION_VARS {
        apply_env_option(tool, env, envvar, "")?;
    }

    Ok(())
}

/// Enables spatial search: PostGIS usage, the bounding-box search backend
/// with its matching query parser, geometry-column initialization, and the
/// env-provided map-widget option family.
fn apply_spatial_options(
    tool: &ConfigTool,
    env: &BTreeMap<String, String>,
    spatial: &SpatialSettings,
) -> anyhow::Result<()> {
    tool.set_option("ckan.spatial.use_postgis", "true", None)?;

    // The search backend and the allowed query parser go hand in hand:
    // solr-bbox pairs with frange, solr-spatial-field would pair with field.
    tool.set_option("ckanext.spatial.search_backend", "solr-bbox", None)?;
    tool.set_option("ckan.search.solr_allowed_query_parsers", "frange", None)?;

    tool.exec(&["spatial", "initdb", &spatial.srid])?;

    if spatial.rebuild_index || env.contains_key("CKAN__SPATIAL_REBUILD_INDEX") {
        tool.exec(&["search-index", "rebuild"])?;
    }

    // The map-widget family is only copied when a widget type is chosen.
    if env.contains_key(&format!("{COMMON_MAP_PREFIX}TYPE")) {
        for (envvar, value) in prefixed_options(env, COMMON_MAP_PREFIX) {
            tool.set_option(&option_name(&envvar), &value, None)?;
        }
    }

    Ok(())
}

/// Collects every environment entry under the given variable-name prefix.
fn prefixed_options(env: &BTreeMap<String, String>, prefix: &str) -> Vec<(String, String)> {
    env.iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Publishes the rendered INI file as a ConfigMap.
async fn publish_ini(cluster: &dyn ClusterClient, settings: &SetupSettings) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&settings.catalog_ini)
        .with_context(|| format!("failed to read {}", settings.catalog_ini))?;

    let data = BTreeMap::from([(INI_KEY.to_owned(), content)]);
    cluster
        .apply_config_map(config_map(
            INI_CONFIG_MAP,
            &settings.cluster.namespace,
            data,
        ))
        .await?;

    Ok(())
}

/// Issues an API token for the admin account and publishes it as a Secret.
async fn issue_api_token(
    tool: &ConfigTool,
    cluster: &dyn ClusterClient,
    settings: &SetupSettings,
) -> anyhow::Result<()> {
    let output = tool.exec(&["user", "token", "add", &settings.admin_account, "api_token"])?;

    let Some(token) = parse_api_token(&output) else {
        warn!(
            account = settings.admin_account,
            "token CLI output carried no token, skipping secret creation"
        );
        return Ok(());
    };

    let data = BTreeMap::from([("token".to_owned(), token)]);
    cluster
        .apply_secret(opaque_secret(
            TOKEN_SECRET,
            &settings.cluster.namespace,
            data,
        ))
        .await?;

    Ok(())
}

/// Extracts the token value from the token CLI output: the first non-blank
/// line after the marker line.
fn parse_api_token(output: &str) -> Option<String> {
    let mut lines = output.lines();
    lines.find(|line| line.contains(TOKEN_MARKER))?;

    lines
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_names_follow_the_variable_convention() {
        assert_eq!(option_name("CKAN__ROOT_PATH"), "ckan.root_path");
        assert_eq!(
            option_name("CKANEXT__KEYCLOAK__SERVER_URL"),
            "ckanext.keycloak.server_url"
        );
    }

    #[test]
    fn prefixed_options_select_the_whole_family() {
        let env = BTreeMap::from([
            ("CKANEXT__SPATIAL__COMMON_MAP__TYPE".to_owned(), "custom".to_owned()),
            ("CKANEXT__SPATIAL__COMMON_MAP__CUSTOM_URL".to_owned(), "https://tiles".to_owned()),
            ("CKAN__ROOT_PATH".to_owned(), "/catalog".to_owned()),
        ]);

        let family = prefixed_options(&env, COMMON_MAP_PREFIX);
        assert_eq!(family.len(), 2);
        assert!(family.iter().all(|(name, _)| name.starts_with(COMMON_MAP_PREFIX)));
    }

    #[test]
    fn token_is_read_from_the_line_after_the_marker() {
        let output = "API Token created:\n\teyJhbGciOiJIUzI1NiJ9.token\n";
        assert_eq!(
            parse_api_token(output).as_deref(),
            Some("eyJhbGciOiJIUzI1NiJ9.token")
        );
    }

    #[test]
    fn output_without_marker_yields_no_token() {
        assert_eq!(parse_api_token("User created\n"), None);
    }
}
