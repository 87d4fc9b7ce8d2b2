use std::collections::BTreeMap;

use anyhow::Context;
use quarry_k8s::{ClusterClient, KubeClusterClient, config_map};
use tracing::info;

use crate::client::RegistryClient;
use crate::config::RegistryInitSettings;
use crate::{storage, template};

/// ConfigMap the rendered registry configuration is published under.
const REGISTRY_CONFIG_MAP: &str = "registry-config";
/// Key of the configuration document inside the ConfigMap.
const CONFIG_KEY: &str = "config.yaml";

/// Bootstraps the container registry: storage credentials, rendered
/// configuration, then organization/team/permission setup once the
/// registry answers.
pub async fn run(settings: RegistryInitSettings) -> anyhow::Result<()> {
    // Permanent S3 credentials the registry stores its layers with.
    let credentials = storage::provision_access_keys(&settings.object_store)
        .context("failed to provision storage credentials")?;

    let template_text = std::fs::read_to_string(&settings.registry.config_template)
        .with_context(|| format!("failed to read {}", settings.registry.config_template))?;
    let rendered = template::render_registry_config(
        &template_text,
        &settings.registry,
        &settings.object_store,
        &credentials,
    )?;

    let cluster = KubeClusterClient::connect()
        .await
        .context("failed to connect to the cluster API")?;
    let data = BTreeMap::from([(CONFIG_KEY.to_owned(), rendered)]);
    cluster
        .apply_config_map(config_map(
            REGISTRY_CONFIG_MAP,
            &settings.cluster.namespace,
            data,
        ))
        .await?;
    info!("registry configuration published");

    // The registry boots from the published configuration; organizations
    // and teams can only be created once its API answers.
    let scheme = if settings.object_store.insecure {
        "http"
    } else {
        "https"
    };
    let base_url = format!("{scheme}://{}", settings.registry.server_hostname);

    let token = RegistryClient::obtain_token(&settings.idp, &settings.registry)
        .await
        .context("failed to obtain an administrator token")?;
    let registry = RegistryClient::new(base_url, token)?;

    registry.wait_ready(&settings.registry.readiness).await?;

    let organization = &settings.registry.organization;
    registry.create_organization(organization).await?;

    registry
        .create_team(organization, &settings.teams.pullers_role, "member")
        .await?;
    registry
        .create_team(organization, &settings.teams.pushers_role, "creator")
        .await?;

    registry
        .enable_team_sync(organization, &settings.teams.pushers_role)
        .await?;
    registry
        .enable_team_sync(organization, &settings.teams.pullers_role)
        .await?;

    registry
        .create_default_permission(organization, &settings.teams.pushers_role, "write")
        .await?;
    registry
        .create_default_permission(organization, &settings.teams.pullers_role, "read")
        .await?;

    info!("registry bootstrap completed");

    Ok(())
}
