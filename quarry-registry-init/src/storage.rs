use std::process::Command;
use std::sync::OnceLock;

use quarry_config::shared::ObjectStoreConfig;
use regex::Regex;
use thiserror::Error;
use tracing::info;

/// Name of the object-store admin CLI.
const STORAGE_CLI: &str = "mc";
/// Alias the CLI registers for the platform object store.
const ALIAS: &str = "quarry";

/// Errors raised while provisioning object-store credentials.
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

    #[error("access-key CLI output carried no credential pair")]
    MissingCredentials,
}

/// Permanent S3 credential pair handed to the registry.
#[derive(Clone, Debug)]
pub struct S3Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Creates a permanent access-key pair on the object store.
pub fn provision_access_keys(store: &ObjectStoreConfig) -> Result<S3Credentials, StorageError> {
    set_alias(store)?;

    let output = run_cli(
        "mc admin accesskey create",
        &["admin", "accesskey", "create", &format!("{ALIAS}/")],
        store.insecure,
    )?;

    let credentials = parse_access_keys(&output)?;
    info!(access_key = credentials.access_key, "storage access key created");

    Ok(credentials)
}

/// Extracts the credential pair from the CLI output.
fn parse_access_keys(output: &str) -> Result<S3Credentials, StorageError> {
    static ACCESS_KEY: OnceLock<Regex> = OnceLock::new();
    static SECRET_KEY: OnceLock<Regex> = OnceLock::new();

    let access = ACCESS_KEY
        .get_or_init(|| Regex::new(r"Access Key:\s*(\S+)").expect("pattern must compile"))
        .captures(output);
    let secret = SECRET_KEY
        .get_or_init(|| Regex::new(r"Secret Key:\s*(\S+)").expect("pattern must compile"))
        .captures(output);

    match (access, secret) {
        (Some(access), Some(secret)) => Ok(S3Credentials {
            access_key: access[1].to_owned(),
            secret_key: secret[1].to_owned(),
        }),
        _ => Err(StorageError::MissingCredentials),
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_credential_pair_from_cli_output() {
        let output = "\
Access Key: AKIAEXAMPLE123
Secret Key: wJalrXUtnFEMI/K7MDENG
Expiration: no-expiry
";
        let credentials = parse_access_keys(output).unwrap();
        assert_eq!(credentials.access_key, "AKIAEXAMPLE123");
        assert_eq!(credentials.secret_key, "wJalrXUtnFEMI/K7MDENG");
    }

    #[test]
    fn missing_keys_are_an_error() {
        assert!(matches!(
            parse_access_keys("unexpected output"),
            Err(StorageError::MissingCredentials)
        ));
    }
}
