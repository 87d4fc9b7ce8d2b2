use std::time::Duration;

use quarry_config::shared::{IdpConnectionConfig, PollConfig, RegistryConfig};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

/// Discovery endpoint probed while waiting for the registry to come up.
const DISCOVERY_PATH: &str = "/api/v1/discovery";

/// Errors emitted by the registry admin client.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("transport error while calling the registry API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry API rejected the call with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("registry did not become ready within {0} seconds")]
    Timeout(u64),
}

/// Token-grant response of the identity provider.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Admin client for the container-registry API.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RegistryClient {
    /// Obtains an administrator bearer token through the registry's own
    /// OIDC client with a password grant.
    pub async fn obtain_token(
        idp: &IdpConnectionConfig,
        registry: &RegistryConfig,
    ) -> Result<String, RegistryError> {
        let http = reqwest::Client::builder().build()?;
        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            idp.server_url.trim_end_matches('/'),
            idp.realm
        );

        let response = http
            .post(&token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", registry.oidc_client.as_str()),
                ("client_secret", registry.oidc_secret.expose()),
                ("username", idp.admin_username.as_str()),
                ("password", idp.admin_password.expose()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body: response.text().await?,
            });
        }

        let token: TokenResponse = response.json().await?;

        Ok(token.access_token)
    }

    pub fn new(base_url: String, token: String) -> Result<Self, RegistryError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// Probes the discovery endpoint until the registry answers or the
    /// deadline passes. This is the only retry loop in the system; hitting
    /// the deadline aborts the whole bootstrap.
    pub async fn wait_ready(&self, poll: &PollConfig) -> Result<(), RegistryError> {
        let url = format!("{}{DISCOVERY_PATH}", self.base_url);
        let mut elapsed = 0;

        while elapsed < poll.timeout_secs {
            match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(elapsed, "registry is up");
                    return Ok(());
                }
                Ok(response) => {
                    info!(status = response.status().as_u16(), "registry not ready yet");
                }
                Err(_) => {
                    info!("waiting for the registry to come up");
                }
            }

            tokio::time::sleep(Duration::from_secs(poll.interval_secs)).await;
            // A zero interval still consumes elapsed time, so the loop is
            // bounded for every configuration.
            elapsed += poll.interval_secs.max(1);
        }

        Err(RegistryError::Timeout(poll.timeout_secs))
    }

    /// Creates the bootstrap organization.
    pub async fn create_organization(&self, name: &str) -> Result<(), RegistryError> {
        let url = format!("{}/api/v1/organization", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        check(response).await?;
        info!(organization = name, "organization created");

        Ok(())
    }

    /// Creates (or updates) a team inside an organization.
    pub async fn create_team(
        &self,
        organization: &str,
        team: &str,
        role: &str,
    ) -> Result<(), RegistryError> {
        let url = format!(
            "{}/api/v1/organization/{organization}/team/{team}",
            self.base_url
        );
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "name": team, "role": role }))
            .send()
            .await?;
        check(response).await?;
        info!(team, role, "team created");

        Ok(())
    }

    /// Points a team's membership at the identity-provider group of the
    /// same name.
    pub async fn enable_team_sync(
        &self,
        organization: &str,
        team: &str,
    ) -> Result<(), RegistryError> {
        let url = format!(
            "{}/api/v1/organization/{organization}/team/{team}/syncing",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "group_name": team }))
            .send()
            .await?;
        check(response).await?;
        info!(team, "team syncing enabled");

        Ok(())
    }

    /// Registers a default repository-permission prototype delegating the
    /// given role to a team.
    pub async fn create_default_permission(
        &self,
        organization: &str,
        team: &str,
        role: &str,
    ) -> Result<(), RegistryError> {
        let url = format!(
            "{}/api/v1/organization/{organization}/prototypes",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "delegate": {
                    "name": team,
                    "kind": "team",
                    "is_robot": false,
                    "is_org_member": true,
                },
                "role": role,
            }))
            .send()
            .await?;
        check(response).await?;
        info!(team, role, "default repository permission delegated");

        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(RegistryError::Api {
        status: status.as_u16(),
        body: response.text().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RegistryClient {
        RegistryClient::new(server.uri(), "admin-token".to_owned()).unwrap()
    }

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval_secs: 0,
            timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn wait_ready_returns_once_discovery_answers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/discovery"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/discovery"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        client(&server).wait_ready(&fast_poll()).await.unwrap();
    }

    #[tokio::test]
    async fn wait_ready_times_out_when_the_registry_never_answers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/discovery"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .wait_ready(&PollConfig {
                interval_secs: 1,
                timeout_secs: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Timeout(1)));
    }

    #[tokio::test]
    async fn team_setup_sends_the_delegation_payloads() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/organization/quarry/team/pushers"))
            .and(body_partial_json(serde_json::json!({ "role": "creator" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/organization/quarry/prototypes"))
            .and(body_partial_json(serde_json::json!({
                "delegate": { "name": "pushers", "kind": "team" },
                "role": "write",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.create_team("quarry", "pushers", "creator").await.unwrap();
        client
            .create_default_permission("quarry", "pushers", "write")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_calls_surface_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/organization"))
            .respond_with(ResponseTemplate::new(400).set_body_string("org exists"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_organization("quarry")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Api { status: 400, .. }));
    }
}
