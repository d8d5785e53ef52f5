use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::provider::ConfigProvider;
use super::{ConfigBuilder, ConfigResult};

/// Raw configuration inputs read once when a [`super::SerialConfig`] is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterProperties {
    /// Pattern for the process-wide filter.
    pub filter_pattern: Option<String>,
    /// Registered name of the factory to construct lazily.
    pub factory_name: Option<String>,
    /// Allow a session filter after the first object has been read.
    pub set_filter_after_read: bool,
}

impl FilterProperties {
    pub const FILTER_KEY: &'static str = "serial.filter";
    pub const FACTORY_KEY: &'static str = "serial.filter.factory";
    pub const SET_AFTER_READ_KEY: &'static str = "serial.set.filter.after.read";
    /// Environment variable naming an optional JSON properties file.
    pub const PROPERTIES_FILE_ENV: &'static str = "SERIAL_FILTER_PROPERTIES";

    pub fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let factory_name = provider
            .get_raw(Self::FACTORY_KEY)?
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            filter_pattern: provider.get_raw(Self::FILTER_KEY)?,
            factory_name,
            set_filter_after_read: provider
                .get_bool(Self::SET_AFTER_READ_KEY)?
                .unwrap_or(false),
        })
    }

    /// Environment first, then the file named by `SERIAL_FILTER_PROPERTIES`.
    pub fn from_env() -> ConfigResult<Self> {
        let mut builder = ConfigBuilder::new().env();
        if let Some(path) = std::env::var_os(Self::PROPERTIES_FILE_ENV) {
            builder = builder.file(PathBuf::from(path));
        }
        Self::load(&builder.build())
    }

    pub fn with_filter_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filter_pattern = Some(pattern.into());
        self
    }

    pub fn with_factory(mut self, name: impl Into<String>) -> Self {
        self.factory_name = Some(name.into());
        self
    }

    pub fn with_set_filter_after_read(mut self, allowed: bool) -> Self {
        self.set_filter_after_read = allowed;
        self
    }
}
