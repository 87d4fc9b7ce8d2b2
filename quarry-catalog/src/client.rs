use quarry_config::shared::CatalogConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::types::{CreateDatasetRequest, DatasetRef, ResourceRef, ResourceSpec};

/// Path of the dataset publishing endpoint.
const DATASETS_PATH: &str = "/catalog/datasets";
/// Path of the resource linking endpoint.
const RESOURCES_PATH: &str = "/catalog/resources";

/// Errors emitted by the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a usable response.
    #[error("transport error while calling the catalog API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog answered but rejected the call.
    #[error("catalog API rejected the call with status {status}: {body}")]
    Api { status: u16, body: String },

    /// The catalog answered with a payload the client does not understand.
    #[error("unexpected catalog API payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Response envelope wrapping every catalog API result.
#[derive(Debug, serde::Deserialize)]
struct Envelope<R> {
    success: bool,
    result: Option<R>,
}

/// Client for the catalog ingestion API.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl CatalogClient {
    /// Builds a client from catalog connection settings.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_token: config.api_token.expose().to_owned(),
        })
    }

    /// Publishes a dataset and returns its catalog identifier.
    pub async fn create_dataset(
        &self,
        request: &CreateDatasetRequest,
    ) -> Result<DatasetRef, CatalogError> {
        let dataset: DatasetRef = self.post(DATASETS_PATH, request).await?;
        info!(
            dataset_id = dataset.id,
            title = request.dataset.title,
            "dataset published in the catalog"
        );

        Ok(dataset)
    }

    /// Links an external document to a published dataset.
    pub async fn create_resource(&self, resource: &ResourceSpec) -> Result<ResourceRef, CatalogError> {
        let created: ResourceRef = self.post(RESOURCES_PATH, resource).await?;
        info!(
            resource_id = created.id,
            dataset_id = resource.package_id,
            "resource linked to dataset"
        );

        Ok(created)
    }

    /// Posts a JSON body and unwraps the catalog response envelope.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, CatalogError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: Envelope<R> = serde_json::from_str(&text)?;
        match envelope {
            Envelope {
                success: true,
                result: Some(result),
            } => Ok(result),
            _ => Err(CatalogError::Api {
                status: status.as_u16(),
                body: text,
            }),
        }
    }
}
