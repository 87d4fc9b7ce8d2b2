use quarry_config::shared::{IdpConnectionConfig, OidcClientConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;

/// Client mapper projecting client roles into a token claim.
pub const CLIENT_ROLE_MAPPER: &str = "oidc-usermodel-client-role-mapper";
/// Realm mapper projecting realm roles into a token claim.
pub const REALM_ROLE_MAPPER: &str = "oidc-usermodel-realm-role-mapper";

/// Errors emitted by the identity-provider admin client.
#[derive(Debug, Error)]
pub enum IdpError {
    #[error("transport error while calling the identity provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider rejected the call with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("identity provider returned no entry for `{0}`")]
    NotFound(String),
}

/// Token-grant response of the identity provider.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Admin REST client for the identity provider.
///
/// Creation calls treat a 409 conflict as "already present": the existing
/// object is looked up and reused, so the bootstrap stays re-runnable.
pub struct IdpAdminClient {
    http: reqwest::Client,
    base_url: String,
    realm: String,
    token: String,
}

impl IdpAdminClient {
    /// Authenticates with the admin account through a password grant.
    pub async fn login(config: &IdpConnectionConfig) -> Result<Self, IdpError> {
        let http = reqwest::Client::builder().build()?;
        let base_url = config.server_url.trim_end_matches('/').to_owned();

        let token_url = format!(
            "{base_url}/realms/{}/protocol/openid-connect/token",
            config.realm
        );
        let response = http
            .post(&token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", "admin-cli"),
                ("username", config.admin_username.as_str()),
                ("password", config.admin_password.expose()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdpError::Api {
                status: status.as_u16(),
                body: response.text().await?,
            });
        }

        let token: TokenResponse = response.json().await?;

        Ok(Self {
            http,
            base_url,
            realm: config.realm.clone(),
            token: token.access_token,
        })
    }

    /// Registers an OIDC client and returns its internal id.
    ///
    /// An already-registered client is looked up instead.
    pub async fn ensure_client(&self, client: &OidcClientConfig) -> Result<String, IdpError> {
        let representation = json!({
            "clientId": client.name,
            "enabled": true,
            "rootUrl": client.root_url(),
            "baseUrl": client.home_url,
            "redirectUris": ["*"],
            "attributes": { "post.logout.redirect.uris": "+" },
            "directAccessGrantsEnabled": true,
        });

        let created = self
            .post_allowing_conflict(&self.admin_url("clients"), &representation)
            .await?;
        if created {
            info!(client = client.name, "client registered");
        } else {
            info!(client = client.name, "client already registered");
        }

        self.client_uuid(&client.name).await
    }

    /// Resolves a client's internal id from its client id.
    pub async fn client_uuid(&self, client_id: &str) -> Result<String, IdpError> {
        let url = format!("{}?clientId={client_id}", self.admin_url("clients"));
        let clients: Vec<Value> = self.get_json(&url).await?;

        clients
            .first()
            .and_then(|client| client.get("id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| IdpError::NotFound(client_id.to_owned()))
    }

    /// Fetches the secret of a confidential client.
    pub async fn client_secret(&self, client_uuid: &str) -> Result<String, IdpError> {
        let url = self.admin_url(&format!("clients/{client_uuid}/client-secret"));
        let secret: Value = self.get_json(&url).await?;

        secret
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| IdpError::NotFound(format!("secret of {client_uuid}")))
    }

    /// Turns on the service account and authorization services of a client.
    pub async fn enable_service_account(&self, client_uuid: &str) -> Result<(), IdpError> {
        let url = self.admin_url(&format!("clients/{client_uuid}"));

        let mut representation: Value = self.get_json(&url).await?;
        representation["serviceAccountsEnabled"] = json!(true);
        representation["authorizationServicesEnabled"] = json!(true);

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&representation)
            .send()
            .await?;
        check(response).await?;

        info!(client_uuid, "service account enabled");

        Ok(())
    }

    /// Resolves the user backing a client's service account.
    pub async fn service_account_user_id(&self, client_uuid: &str) -> Result<String, IdpError> {
        let url = self.admin_url(&format!("clients/{client_uuid}/service-account-user"));
        let user: Value = self.get_json(&url).await?;

        user.get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| IdpError::NotFound(format!("service account of {client_uuid}")))
    }

    /// Resolves a user id from a username.
    pub async fn user_id(&self, username: &str) -> Result<String, IdpError> {
        let url = format!("{}?username={username}&exact=true", self.admin_url("users"));
        let users: Vec<Value> = self.get_json(&url).await?;

        users
            .first()
            .and_then(|user| user.get("id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| IdpError::NotFound(username.to_owned()))
    }

    /// Creates a composite realm role; an existing one is kept.
    pub async fn ensure_realm_role(&self, role_name: &str) -> Result<(), IdpError> {
        let representation = json!({
            "name": role_name,
            "composite": true,
            "clientRole": false,
            "containerId": self.realm,
        });

        self.post_allowing_conflict(&self.admin_url("roles"), &representation)
            .await?;
        info!(role = role_name, "realm role present");

        Ok(())
    }

    /// Fetches a realm role representation.
    pub async fn realm_role(&self, role_name: &str) -> Result<Value, IdpError> {
        self.get_json(&self.admin_url(&format!("roles/{role_name}")))
            .await
    }

    /// Assigns a realm role to a user.
    pub async fn assign_realm_role(&self, user_id: &str, role: &Value) -> Result<(), IdpError> {
        let url = self.admin_url(&format!("users/{user_id}/role-mappings/realm"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!([role]))
            .send()
            .await?;
        check(response).await?;

        Ok(())
    }

    /// Creates a role owned by a client; an existing one is kept.
    pub async fn ensure_client_role(
        &self,
        client_uuid: &str,
        role_name: &str,
    ) -> Result<(), IdpError> {
        let url = self.admin_url(&format!("clients/{client_uuid}/roles"));
        self.post_allowing_conflict(&url, &json!({ "name": role_name }))
            .await?;
        info!(role = role_name, client_uuid, "client role present");

        Ok(())
    }

    /// Fetches a client role representation.
    pub async fn client_role(&self, client_uuid: &str, role_name: &str) -> Result<Value, IdpError> {
        self.get_json(&self.admin_url(&format!("clients/{client_uuid}/roles/{role_name}")))
            .await
    }

    /// Assigns a client role to a user.
    pub async fn assign_client_role(
        &self,
        user_id: &str,
        client_uuid: &str,
        role: &Value,
    ) -> Result<(), IdpError> {
        let url =
            self.admin_url(&format!("users/{user_id}/role-mappings/clients/{client_uuid}"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!([role]))
            .send()
            .await?;
        check(response).await?;

        Ok(())
    }

    /// Creates a client scope carrying one role-projection mapper and
    /// returns the scope id. An existing scope is reused.
    pub async fn ensure_client_scope(
        &self,
        scope_name: &str,
        mapper_name: &str,
        claim_name: &str,
        mapper_type: &str,
    ) -> Result<String, IdpError> {
        let scope = json!({
            "name": scope_name,
            "protocol": "openid-connect",
        });

        self.post_allowing_conflict(&self.admin_url("client-scopes"), &scope)
            .await?;
        let scope_id = self.client_scope_id(scope_name).await?;

        let mapper = json!({
            "name": mapper_name,
            "protocol": "openid-connect",
            "protocolMapper": mapper_type,
            "consentRequired": false,
            "config": {
                "claim.name": claim_name,
                "jsonType.label": "String",
                "id.token.claim": "true",
                "access.token.claim": "true",
                "multivalued": "true",
            },
        });

        let url = self.admin_url(&format!("client-scopes/{scope_id}/protocol-mappers/models"));
        self.post_allowing_conflict(&url, &mapper).await?;
        info!(scope = scope_name, claim = claim_name, "client scope present");

        Ok(scope_id)
    }

    /// Resolves a client scope id from its name.
    pub async fn client_scope_id(&self, scope_name: &str) -> Result<String, IdpError> {
        let scopes: Vec<Value> = self.get_json(&self.admin_url("client-scopes")).await?;

        scopes
            .iter()
            .find(|scope| scope.get("name").and_then(Value::as_str) == Some(scope_name))
            .and_then(|scope| scope.get("id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| IdpError::NotFound(scope_name.to_owned()))
    }

    /// Attaches a scope to a client as a default scope.
    pub async fn add_default_client_scope(
        &self,
        client_uuid: &str,
        scope_id: &str,
    ) -> Result<(), IdpError> {
        let url = self.admin_url(&format!(
            "clients/{client_uuid}/default-client-scopes/{scope_id}"
        ));
        let response = self.http.put(&url).bearer_auth(&self.token).send().await?;
        check(response).await?;

        Ok(())
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/realms/{}/{path}", self.base_url, self.realm)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, IdpError> {
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Posts a representation; returns whether it was newly created. A 409
    /// conflict means the object already exists and is treated as success.
    async fn post_allowing_conflict(&self, url: &str, body: &Value) -> Result<bool, IdpError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        if response.status().as_u16() == 409 {
            return Ok(false);
        }
        check(response).await?;

        Ok(true)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(IdpError::Api {
        status: status.as_u16(),
        body: response.text().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_config::shared::IdpConnectionConfig;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connection(server: &MockServer) -> IdpConnectionConfig {
        IdpConnectionConfig {
            server_url: server.uri(),
            realm: "master".to_owned(),
            admin_username: "admin".to_owned(),
            admin_password: "admin-pass".into(),
        }
    }

    async fn mock_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/realms/master/protocol/openid-connect/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "admin-token",
                "token_type": "Bearer",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_uses_the_password_grant() {
        let server = MockServer::start().await;
        mock_login(&server).await;

        let client = IdpAdminClient::login(&connection(&server)).await.unwrap();
        assert_eq!(client.token, "admin-token");
    }

    #[tokio::test]
    async fn existing_client_conflict_is_resolved_by_lookup() {
        let server = MockServer::start().await;
        mock_login(&server).await;

        Mock::given(method("POST"))
            .and(path("/admin/realms/master/clients"))
            .respond_with(ResponseTemplate::new(409).set_body_string("client exists"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/master/clients"))
            .and(query_param("clientId", "platform-api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "uuid-1", "clientId": "platform-api" },
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdpAdminClient::login(&connection(&server)).await.unwrap();
        let oidc_client = OidcClientConfig {
            name: "platform-api".to_owned(),
            home_url: "https://api.example.org".to_owned(),
            root_url: None,
            redirect_url: None,
        };

        let uuid = client.ensure_client(&oidc_client).await.unwrap();
        assert_eq!(uuid, "uuid-1");
    }

    #[tokio::test]
    async fn admin_rejection_surfaces_status_and_body() {
        let server = MockServer::start().await;
        mock_login(&server).await;

        Mock::given(method("GET"))
            .and(path("/admin/realms/master/roles/admin"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = IdpAdminClient::login(&connection(&server)).await.unwrap();
        match client.realm_role("admin").await.unwrap_err() {
            IdpError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }
}
