//! Process-wide filter configuration and the providers it is read from.
//!
//! ```rust,no_run
//! use serial_filter::config::{ConfigBuilder, FilterProperties, SerialConfig};
//! use serial_filter::factory::factory_registry;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfigBuilder::new()
//!     .env()
//!     .file("serial-filter.json")
//!     .build();
//! let properties = FilterProperties::load(&provider)?;
//! let config = SerialConfig::new(properties, factory_registry().clone());
//! let filter = config.serial_filter()?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
mod global;
pub mod memory;
mod properties;
pub mod provider;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;
pub use global::SerialConfig;
pub use memory::MemoryConfigProvider;
pub use properties::FilterProperties;
pub use provider::ConfigProvider;

use std::sync::Arc;

use thiserror::Error;

use crate::factory::FactoryInitError;
use crate::filter::PatternError;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The process-wide filter slot is already occupied.
    #[error("serial filter can only be set once")]
    FilterAlreadySet,

    /// The configured process-wide pattern did not parse.
    #[error("invalid serial.filter pattern {pattern:?}: {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("Cannot replace filter factory: {current}")]
    FactoryReplace { current: String },

    /// Cached failure to construct the configured factory.
    #[error("filter factory initialization failed: {0}")]
    FactoryInit(#[source] Arc<FactoryInitError>),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ConfigError {
    /// Write-once violations, as opposed to bad input or provider faults.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            ConfigError::FilterAlreadySet | ConfigError::FactoryReplace { .. }
        )
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Fluent assembly of a [`CompositeConfigProvider`]. Providers added first
/// take priority.
#[derive(Default)]
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.providers
            .push(Box::new(FileConfigProvider::new(path.as_ref())));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        self.providers
            .into_iter()
            .fold(CompositeConfigProvider::new(), CompositeConfigProvider::provider)
    }
}
