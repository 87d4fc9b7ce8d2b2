use quarry_config::load_config;
use quarry_config::shared::ClusterConfig;
use serde::Deserialize;

/// Settings of the catalog container setup run.
#[derive(Debug, Deserialize)]
pub struct SetupSettings {
    /// INI file the catalog server reads its options from.
    #[serde(default = "default_catalog_ini")]
    pub catalog_ini: String,
    /// Account whose API token is issued and published for the platform.
    #[serde(default = "default_admin_account")]
    pub admin_account: String,
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub spatial: SpatialSettings,
}

/// Spatial-search bootstrap options.
#[derive(Debug, Deserialize)]
pub struct SpatialSettings {
    /// Spatial reference system the geometry columns are initialized with.
    #[serde(default = "default_srid")]
    pub srid: String,
    /// Rebuilds the search index after enabling spatial search.
    #[serde(default)]
    pub rebuild_index: bool,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            srid: default_srid(),
            rebuild_index: false,
        }
    }
}

fn default_catalog_ini() -> String {
    "/srv/app/ckan.ini".to_owned()
}

fn default_admin_account() -> String {
    "ckan_admin".to_owned()
}

fn default_srid() -> String {
    "4326".to_owned()
}

pub fn load_settings() -> anyhow::Result<SetupSettings> {
    Ok(load_config::<SetupSettings>()?)
}
