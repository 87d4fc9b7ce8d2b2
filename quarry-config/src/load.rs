use serde::de::DeserializeOwned;

use crate::environment::Environment;

/// Directory containing configuration files, relative to the process root.
const CONFIGURATION_DIR: &str = "configuration";

/// Base configuration file loaded for all environments.
const BASE_CONFIG_FILE: &str = "base.yaml";

/// Prefix for environment-variable configuration overrides.
const ENV_PREFIX: &str = "APP";

/// Separator between the prefix and the first key segment.
const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested configuration keys in environment variables.
///
/// Example: `APP_CATALOG__BASE_URL` sets the `catalog.base_url` field.
const ENV_SEPARATOR: &str = "__";

/// Loads hierarchical configuration from YAML files and environment variables.
///
/// Sources are layered in this order, later entries overriding earlier ones:
/// 1. `configuration/base.yaml`
/// 2. `configuration/{environment}.yaml`
/// 3. Environment variables prefixed with `APP`, nested via `__`
///
/// The running environment is detected from `APP_ENVIRONMENT` and defaults
/// to `prod`.
pub fn load_config<T>() -> Result<T, config::ConfigError>
where
    T: DeserializeOwned,
{
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("failed to determine current dir: {e}")))?;
    let configuration_directory = base_path.join(CONFIGURATION_DIR);

    let environment = Environment::load()
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;
    let environment_filename = format!("{environment}.yaml");

    let environment_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR);

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join(BASE_CONFIG_FILE),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(environment_source)
        .build()?;

    settings.try_deserialize::<T>()
}
