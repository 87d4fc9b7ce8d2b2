use std::process::Command;

use quarry_config::shared::{IdpConnectionConfig, ObjectStoreConfig};
use thiserror::Error;
use tracing::info;

/// Name of the object-store admin CLI.
const STORAGE_CLI: &str = "mc";
/// Alias the CLI registers for the platform object store.
const ALIAS: &str = "quarry";
/// Name of the OIDC integration registered in the object store.
const SSO_NAME: &str = "quarry-sso";

/// Errors raised while driving the object-store admin CLI.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Points the object store's login at the identity provider.
///
/// Registers the CLI alias, adds the OIDC configuration with the policy
/// claim, and restarts the service so the new login takes effect.
pub fn configure_openid(
    store: &ObjectStoreConfig,
    idp: &IdpConnectionConfig,
    client_name: &str,
    client_secret: &str,
    redirect_url: &str,
) -> Result<(), StorageError> {
    set_alias(store)?;

    let config_url = format!(
        "{}/realms/{}/.well-known/openid-configuration",
        idp.server_url.trim_end_matches('/'),
        idp.realm
    );

    run_cli(
        "mc idp openid add",
        &[
            "idp",
            "openid",
            "add",
            ALIAS,
            SSO_NAME,
            &format!("client_id={client_name}"),
            &format!("client_secret={client_secret}"),
            &format!("config_url={config_url}"),
            "claim_name=policy",
            "display_name=Quarry SSO",
            "scopes=openid",
            &format!("redirect_uri={redirect_url}"),
        ],
        store.insecure,
    )?;
    info!(sso = SSO_NAME, "object store OIDC login configured");

    run_cli(
        "mc admin service restart",
        &["admin", "service", "restart", ALIAS],
        store.insecure,
    )?;
    info!("object store restarted");

    Ok(())
}

/// Registers the admin alias the other CLI calls go through.
fn set_alias(store: &ObjectStoreConfig) -> Result<(), StorageError> {
    run_cli(
        "mc alias set",
        &[
            "alias",
            "set",
            ALIAS,
            &store.host,
            &store.root_user,
            store.root_password.expose(),
        ],
        store.insecure,
    )
    .map(drop)
}

/// Runs the CLI with the given arguments.
///
/// `label` identifies the invocation in errors without reproducing
/// credential-bearing arguments.
fn run_cli(label: &str, args: &[&str], insecure: bool) -> Result<String, StorageError> {
    let mut command = Command::new(STORAGE_CLI);
    command.args(args);
    if insecure {
        command.arg("--insecure");
    }

    let output = command.output().map_err(|source| StorageError::Spawn {
        command: label.to_owned(),
        source,
    })?;

    if !output.status.success() {
        return Err(StorageError::Failed {
            command: label.to_owned(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
