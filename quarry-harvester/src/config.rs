use quarry_config::load_config;
use quarry_config::shared::CatalogConfig;
use quarry_harvest::ProviderKind;
use serde::Deserialize;

/// Settings of one harvesting run.
#[derive(Debug, Deserialize)]
pub struct HarvesterSettings {
    pub catalog: CatalogConfig,
    /// Organization account the harvested datasets are filed under.
    pub organization: String,
    pub provider: ProviderKind,
    pub source: SourceConfig,
}

/// Where the source records are read from.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    File { path: String },
    Url { url: String },
}

pub fn load_settings() -> anyhow::Result<HarvesterSettings> {
    Ok(load_config::<HarvesterSettings>()?)
}
