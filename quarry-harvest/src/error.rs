use quarry_catalog::CatalogError;
use thiserror::Error;

/// Convenient result type for harvesting operations.
pub type HarvestResult<T> = Result<T, HarvestError>;

/// Errors raised while normalizing or publishing a single source record.
///
/// All of these are record-scoped: the batch driver logs them and moves on
/// to the next record.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The source record lacks a field the provider mapping requires.
    #[error("source record is missing required field `{0}`")]
    MissingField(&'static str),

    /// The source record carries a field in a shape the provider mapping
    /// cannot interpret. Never silently coerced into a default.
    #[error("source record field `{field}` is malformed: {reason}")]
    MalformedField {
        field: &'static str,
        reason: String,
    },

    /// Fetching the full description document failed.
    #[error("failed to fetch the record's description document: {0}")]
    DescriptionFetch(#[from] reqwest::Error),

    /// The catalog rejected the publish call.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl HarvestError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            reason: reason.into(),
        }
    }
}
