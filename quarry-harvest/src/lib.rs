//! Metadata harvesting for the data catalog.
//!
//! A harvester pulls records from an external geospatial/EO metadata source,
//! reduces each one to the catalog's flat dataset shape, and publishes it.
//! The reduction is shared across sources; everything source-specific
//! (field locations, keyword delimiters, theme tables, length limits) lives
//! in a provider profile so a new source is a new profile, not a new
//! pipeline.

mod error;
pub mod ingest;
pub mod normalize;
pub mod provider;

pub use error::*;
pub use ingest::{BatchSummary, Ingestor, PublishedRecord};
pub use provider::{ProviderKind, ProviderProfile, RawDataset};
