//! Batch ingestion of source records into the catalog.

use quarry_catalog::{CatalogClient, CreateDatasetRequest, ResourceSpec};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::HarvestResult;
use crate::normalize;
use crate::provider::{ProviderKind, ProviderProfile};

/// Outcome of one successfully published record.
#[derive(Clone, Debug)]
pub struct PublishedRecord {
    pub title: String,
    pub dataset_id: String,
    /// Identifier of the linked raw-metadata resource, when the record
    /// exposed one and the link call succeeded.
    pub resource_id: Option<String>,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub published: Vec<PublishedRecord>,
    /// Records their source marked as not harvestable.
    pub skipped: usize,
    /// Records dropped because normalization or publishing failed.
    pub failed: usize,
}

/// Publishes source records one at a time.
///
/// A record's failure never affects its siblings: the error is logged and
/// the batch moves on.
pub struct Ingestor {
    catalog: CatalogClient,
    http: reqwest::Client,
    provider: ProviderKind,
    profile: ProviderProfile,
    organization: String,
}

impl Ingestor {
    pub fn new(catalog: CatalogClient, provider: ProviderKind, organization: String) -> Self {
        let profile = provider.profile();

        Self {
            catalog,
            http: reqwest::Client::new(),
            provider,
            profile,
            organization,
        }
    }

    /// Runs the batch strictly sequentially and reports what happened.
    pub async fn ingest_batch(&self, records: &[Value]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, record) in records.iter().enumerate() {
            match self.ingest_record(record).await {
                Ok(Some(published)) => {
                    info!(
                        index,
                        dataset_id = published.dataset_id,
                        title = published.title,
                        "record published"
                    );
                    summary.published.push(published);
                }
                Ok(None) => {
                    info!(index, "record not harvestable, skipping");
                    summary.skipped += 1;
                }
                Err(err) => {
                    error!(index, error = %err, "record failed, continuing with the batch");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Publishes one record: extract, normalize, create the dataset, then
    /// link the original metadata document when the record exposes one.
    ///
    /// Returns `Ok(None)` for records the provider declines to harvest.
    pub async fn ingest_record(&self, record: &Value) -> HarvestResult<Option<PublishedRecord>> {
        let Some(mut raw) = self.provider.extract(record)? else {
            return Ok(None);
        };

        // Some catalogs keep the full description in a linked document.
        if raw.description.is_none()
            && let Some(href) = raw.description_href.clone()
        {
            raw.description = self.fetch_description(&href).await?;
        }

        let source_title = raw.title.clone();
        let license = raw.license.clone();
        let raw_metadata_url = raw.raw_metadata_url.clone();

        let dataset = normalize::normalize(raw, &self.profile, &self.organization);
        let request = CreateDatasetRequest {
            organization: self.organization.clone(),
            dataset,
        };
        let dataset_ref = self.catalog.create_dataset(&request).await?;

        // The dataset is already published at this point; a failure to link
        // the metadata document is a partial success, not a record failure.
        let mut resource_id = None;
        if let Some(url) = raw_metadata_url {
            let resource = ResourceSpec {
                package_id: dataset_ref.id.clone(),
                name: format!("{source_title} specifications"),
                description: format!("Specifications about {source_title} data in JSON format"),
                format: "JSON".to_owned(),
                license,
                resource_type: "other".to_owned(),
                url,
            };

            match self.catalog.create_resource(&resource).await {
                Ok(created) => resource_id = Some(created.id),
                Err(err) => warn!(
                    dataset_id = dataset_ref.id,
                    error = %err,
                    "resource link failed, dataset remains published"
                ),
            }
        }

        Ok(Some(PublishedRecord {
            title: request.dataset.title,
            dataset_id: dataset_ref.id,
            resource_id,
        }))
    }

    async fn fetch_description(&self, href: &str) -> HarvestResult<Option<String>> {
        let document: Value = self
            .http
            .get(href)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(document
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned))
    }
}
