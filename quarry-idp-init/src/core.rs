use std::collections::BTreeMap;

use anyhow::Context;
use quarry_k8s::{ClusterClient, KubeClusterClient, opaque_secret};
use tracing::info;

use crate::client::{CLIENT_ROLE_MAPPER, IdpAdminClient, REALM_ROLE_MAPPER};
use crate::config::IdpInitSettings;
use crate::storage;

/// Realm role granting full admin rights to the service accounts.
const REALM_ADMIN_ROLE: &str = "admin";
/// Object-store console policy role. The name is fixed by the store's
/// built-in policies.
const CONSOLE_ADMIN_ROLE: &str = "consoleAdmin";
/// Claim the object store reads its policies from.
const STORAGE_POLICY_CLAIM: &str = "policy";
/// Scope projecting client roles into the policy claim.
const CONSOLE_SCOPE: &str = "console_auth_scope";
const CONSOLE_SCOPE_MAPPER: &str = "client_role_mapper";
/// Scope projecting the registry realm roles into the group claim.
const REGISTRY_SCOPE: &str = "registry_scope";
const REGISTRY_SCOPE_MAPPER: &str = "registry_mapper";

/// Bootstraps the identity provider: clients, scopes, roles, and the
/// cluster secrets their consumers read.
pub async fn run(settings: IdpInitSettings) -> anyhow::Result<()> {
    let idp = IdpAdminClient::login(&settings.idp)
        .await
        .context("failed to authenticate against the identity provider")?;
    let cluster = KubeClusterClient::connect()
        .await
        .context("failed to connect to the cluster API")?;

    let api_uuid = idp.ensure_client(&settings.api_client).await?;
    let console_uuid = idp.ensure_client(&settings.console_client).await?;
    let catalog_uuid = idp.ensure_client(&settings.catalog_client).await?;

    // The API and console clients act on their own through service
    // accounts with realm admin rights.
    for client_uuid in [&api_uuid, &console_uuid] {
        idp.enable_service_account(client_uuid).await?;

        let admin_role = idp.realm_role(REALM_ADMIN_ROLE).await?;
        let service_user = idp.service_account_user_id(client_uuid).await?;
        idp.assign_realm_role(&service_user, &admin_role).await?;
    }

    // Project client roles into the policy claim the object store reads,
    // on both the console and the API tokens.
    let console_scope = idp
        .ensure_client_scope(
            CONSOLE_SCOPE,
            CONSOLE_SCOPE_MAPPER,
            STORAGE_POLICY_CLAIM,
            CLIENT_ROLE_MAPPER,
        )
        .await?;
    idp.add_default_client_scope(&console_uuid, &console_scope)
        .await?;
    idp.add_default_client_scope(&api_uuid, &console_scope)
        .await?;

    // Console admin policy for the human admin and the API service account.
    idp.ensure_client_role(&console_uuid, CONSOLE_ADMIN_ROLE)
        .await?;
    let console_role = idp.client_role(&console_uuid, CONSOLE_ADMIN_ROLE).await?;

    let admin_user = idp.user_id(&settings.idp.admin_username).await?;
    idp.assign_client_role(&admin_user, &console_uuid, &console_role)
        .await?;

    let api_service_user = idp.service_account_user_id(&api_uuid).await?;
    idp.assign_client_role(&api_service_user, &console_uuid, &console_role)
        .await?;

    // Each client's secret lands in the cluster for its consumers.
    for (client, client_uuid) in [
        (&settings.api_client, &api_uuid),
        (&settings.console_client, &console_uuid),
        (&settings.catalog_client, &catalog_uuid),
    ] {
        let secret = idp.client_secret(client_uuid).await?;
        publish_client_secret(&cluster, &settings, &client.name, secret).await?;
    }

    // The object store logs users in through the console client.
    let console_secret = idp.client_secret(&console_uuid).await?;
    let redirect_url = settings
        .console_client
        .redirect_url
        .as_deref()
        .context("console client requires a redirect_url")?;
    storage::configure_openid(
        &settings.object_store,
        &settings.idp,
        &settings.console_client.name,
        &console_secret,
        redirect_url,
    )?;

    // Registry access rides on realm roles surfaced through the group
    // claim of the API tokens.
    idp.ensure_realm_role(&settings.registry.pushers_role).await?;
    idp.ensure_realm_role(&settings.registry.pullers_role).await?;
    let registry_scope = idp
        .ensure_client_scope(
            REGISTRY_SCOPE,
            REGISTRY_SCOPE_MAPPER,
            &settings.registry.group_claim,
            REALM_ROLE_MAPPER,
        )
        .await?;
    idp.add_default_client_scope(&api_uuid, &registry_scope)
        .await?;

    info!("identity provider bootstrap completed");

    Ok(())
}

async fn publish_client_secret(
    cluster: &dyn ClusterClient,
    settings: &IdpInitSettings,
    client_name: &str,
    secret: String,
) -> anyhow::Result<()> {
    let name = format!("{client_name}-client-secret");
    let data = BTreeMap::from([("secret".to_owned(), secret)]);

    cluster
        .apply_secret(opaque_secret(&name, &settings.cluster.namespace, data))
        .await?;
    info!(secret = name, "client secret published");

    Ok(())
}
