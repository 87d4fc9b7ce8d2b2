use serde::{Deserialize, Serialize};

/// Spatial coverage of a dataset.
///
/// The catalog accepts either a GeoJSON geometry object or a well-known-text
/// string; which one a harvester publishes depends on the source provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Spatial {
    GeoJson(serde_json::Value),
    Wkt(String),
}

/// Dataset metadata in the flat shape the catalog ingests.
///
/// This is the normalized form every source record is reduced to before
/// publishing. `name` is always the slug derived from `title`, and `tags`
/// only ever holds strings the catalog accepts; rejected keywords travel in
/// `custom_tags` instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub title: String,
    /// URL-safe identifier derived from the title.
    pub name: String,
    /// Description, capped to the provider's length limit.
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Whether the dataset is hidden from public search. Harvested records
    /// are always published openly.
    pub private: bool,
    pub tags: Vec<String>,
    /// Keywords that failed the catalog's tag character rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tags: Option<Vec<String>>,
    /// Controlled-vocabulary classification.
    pub theme: Vec<String>,
    /// ISO-639-1 codes.
    pub language: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial: Option<Spatial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Alternate identifier such as a DOI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// Payload of the create-dataset call.
#[derive(Clone, Debug, Serialize)]
pub struct CreateDatasetRequest {
    /// Organization account that owns the dataset.
    pub organization: String,
    #[serde(flatten)]
    pub dataset: DatasetSpec,
}

/// Identifier of a published dataset.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DatasetRef {
    pub id: String,
}

/// Payload of the create-resource call, linking an external document to a
/// published dataset.
#[derive(Clone, Debug, Serialize)]
pub struct ResourceSpec {
    /// Dataset the resource attaches to, as returned by the catalog.
    pub package_id: String,
    pub name: String,
    pub description: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub resource_type: String,
    pub url: String,
}

/// Identifier of a linked resource.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ResourceRef {
    pub id: String,
}
