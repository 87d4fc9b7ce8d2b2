//! Source providers and their harvesting profiles.
//!
//! The providers publish structurally different records; each one gets a
//! field-extraction routine producing the common [`RawDataset`] shape plus a
//! [`ProviderProfile`] carrying its limits, defaults, and theme rules. The
//! normalization pipeline itself is provider-agnostic.

mod earth_engine;
mod geoservice;
mod stac;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HarvestError, HarvestResult};
use crate::normalize::geometry::BoundingBox;
use crate::normalize::theme::ThemeRules;

/// Supported metadata sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderKind {
    /// A STAC API collections endpoint.
    StacApi,
    /// A static STAC catalog; collection documents are addressed relative
    /// to the configured base URLs.
    StacCatalog {
        /// Internal URL collections resolve against.
        base_url: String,
        /// Publicly reachable URL used for the documentation link.
        public_url: String,
    },
    /// The Earth Engine dataset catalog.
    EarthEngine,
    /// A schema.org-style geoservice data-assets feed.
    Geoservice,
}

impl ProviderKind {
    /// Returns the harvesting profile of this provider.
    pub fn profile(&self) -> ProviderProfile {
        match self {
            Self::StacApi | Self::StacCatalog { .. } => stac::PROFILE,
            Self::EarthEngine => earth_engine::PROFILE,
            Self::Geoservice => geoservice::PROFILE,
        }
    }

    /// Extracts the provider-specific fields of one source record.
    ///
    /// Returns `Ok(None)` when the record is valid but not harvestable
    /// (e.g. marked deprecated by its source).
    pub fn extract(&self, record: &Value) -> HarvestResult<Option<RawDataset>> {
        match self {
            Self::StacApi => stac::extract_api(record).map(Some),
            Self::StacCatalog {
                base_url,
                public_url,
            } => stac::extract_catalog(record, base_url, public_url).map(Some),
            Self::EarthEngine => earth_engine::extract(record),
            Self::Geoservice => geoservice::extract(record).map(Some),
        }
    }
}

/// Per-provider normalization parameters.
pub struct ProviderProfile {
    pub name: &'static str,
    /// Description length cap, including the truncation marker.
    pub notes_limit: usize,
    /// Title length cap, including decoration.
    pub title_limit: usize,
    /// Whether the owning organization is appended to the title to keep
    /// slugs from different providers apart.
    pub decorate_title_with_org: bool,
    /// Fixed title decoration, for sources whose records collide by name.
    pub title_suffix: Option<&'static str>,
    /// Tags assigned when the record carries no keywords at all.
    pub fallback_tags: &'static [&'static str],
    /// Languages assumed when the record does not state one.
    pub default_language: &'static [&'static str],
    /// Whether spatial coverage is published as well-known text instead of
    /// GeoJSON.
    pub spatial_as_wkt: bool,
    pub theme_rules: ThemeRules,
}

/// Provider-independent view of one source record, ready for normalization.
#[derive(Clone, Debug, Default)]
pub struct RawDataset {
    pub title: String,
    pub description: Option<String>,
    /// URL of a document carrying the full description, fetched lazily when
    /// `description` is absent.
    pub description_href: Option<String>,
    /// Keywords, already split into tokens. `None` means the record carries
    /// no keyword field, which is distinct from an empty one.
    pub keywords: Option<Vec<String>>,
    pub url: Option<String>,
    pub documentation: Option<String>,
    pub license: Option<String>,
    pub alternate_identifier: Option<String>,
    pub spatial: Option<BoundingBox>,
    pub temporal_start: Option<String>,
    pub temporal_end: Option<String>,
    /// Language codes stated by the record itself.
    pub language: Option<Vec<String>>,
    /// Classification stated by the record itself, bypassing tag-based
    /// theme inference.
    pub themes: Option<Vec<String>>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    /// Link to the original metadata document, published as a resource
    /// after the dataset itself.
    pub raw_metadata_url: Option<String>,
}

/// Reads a required string field off a record.
fn required_str(record: &Value, field: &'static str) -> HarvestResult<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(HarvestError::MissingField(field))
}

/// Reads an optional string field off a record.
fn optional_str(record: &Value, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_owned)
}

/// Splits a comma-delimited keyword field into tokens.
fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(|token| token.trim().to_owned()).collect()
}

/// Parses four coordinates into a bounding box.
fn bounding_box_from(
    coordinates: &[f64],
    field: &'static str,
) -> HarvestResult<BoundingBox> {
    match coordinates {
        [left, bottom, right, top] => Ok(BoundingBox::new(*left, *bottom, *right, *top)),
        other => Err(HarvestError::malformed(
            field,
            format!("expected 4 coordinates, got {}", other.len()),
        )),
    }
}

/// Extracts the name of the first person in a schema.org author list.
fn first_person_author(record: &Value) -> Option<String> {
    let author = record.get("author")?.as_array()?;
    let first = author.first()?;
    if first.get("@type").and_then(Value::as_str) == Some("Person") {
        return first.get("name").and_then(Value::as_str).map(str::to_owned);
    }

    None
}
