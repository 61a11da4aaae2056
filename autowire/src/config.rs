//! Container configuration. Defaults can be overwritten by environment variables prefixed with
//! `AUTOWIRE_` or an `autowire.json` file, and applied with
//! [Container::from_config](crate::container::Container::from_config).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "AUTOWIRE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "autowire.json";

#[non_exhaustive]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Should components declared with [declare_component](crate::declare_component) be
    /// discovered automatically.
    pub enable_component_scanner: bool,
    /// Should a default tracing logger be installed when creating the container.
    pub install_tracing_logger: bool,
}

impl From<OptionalContainerConfig> for ContainerConfig {
    fn from(value: OptionalContainerConfig) -> Self {
        let default = Self::default();
        Self {
            enable_component_scanner: value
                .enable_component_scanner
                .unwrap_or(default.enable_component_scanner),
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
        }
    }
}

impl ContainerConfig {
    pub fn new(enable_component_scanner: bool, install_tracing_logger: bool) -> Self {
        Self {
            enable_component_scanner,
            install_tracing_logger,
        }
    }

    /// Reads the config from [CONFIG_FILE] (if present) and environment variables.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContainerConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalContainerConfig {
    enable_component_scanner: Option<bool>,
    install_tracing_logger: Option<bool>,
}
