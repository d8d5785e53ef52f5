//! Name-to-constructor registry used to instantiate a configured factory.

use std::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use thiserror::Error;

use super::{BuiltinFilterFactory, ContextFilterFactory, FactoryRef};
use crate::config::SerialConfig;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a factory. Receives the configuration being initialized so a
/// constructor can register itself with `set_filter_factory`.
pub type FactoryConstructor =
    Arc<dyn Fn(&SerialConfig) -> Result<FactoryRef, BoxError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum FactoryInitError {
    #[error("filter factory class not found: {name}")]
    ClassNotFound { name: String },

    #[error("filter factory {name} has no public no-argument constructor")]
    NoSuchConstructor { name: String },

    #[error("filter factory {name} could not be constructed: {source}")]
    ConstructorFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl FactoryInitError {
    pub fn name(&self) -> &str {
        match self {
            FactoryInitError::ClassNotFound { name }
            | FactoryInitError::NoSuchConstructor { name }
            | FactoryInitError::ConstructorFailed { name, .. } => name,
        }
    }
}

static REGISTRY: LazyLock<FactoryRegistry> = LazyLock::new(FactoryRegistry::builtins);

/// Process-wide registry consulted by [`SerialConfig::global`].
pub fn factory_registry() -> &'static FactoryRegistry {
    &REGISTRY
}

/// Concurrent map from factory type name to constructor.
///
/// A name registered without a constructor models a type that exists but
/// cannot be instantiated.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    entries: Arc<DashMap<String, Option<FactoryConstructor>>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `builtin` and `context` factories.
    pub fn builtins() -> Self {
        Self::new()
            .with_factory(BuiltinFilterFactory::NAME, |_| {
                Ok(Arc::new(BuiltinFilterFactory) as FactoryRef)
            })
            .with_factory(ContextFilterFactory::NAME, |_| {
                Ok(Arc::new(ContextFilterFactory) as FactoryRef)
            })
    }

    pub fn register<F>(&self, name: impl Into<String>, constructor: F) -> &Self
    where
        F: Fn(&SerialConfig) -> Result<FactoryRef, BoxError> + Send + Sync + 'static,
    {
        self.entries
            .insert(name.into(), Some(Arc::new(constructor) as FactoryConstructor));
        self
    }

    pub fn with_factory<F>(self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&SerialConfig) -> Result<FactoryRef, BoxError> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }

    /// Record a name that resolves but has no usable constructor.
    pub fn declare(&self, name: impl Into<String>) -> &Self {
        self.entries.insert(name.into(), None);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Instantiate the factory registered under `name`.
    pub fn construct(
        &self,
        name: &str,
        config: &SerialConfig,
    ) -> Result<FactoryRef, FactoryInitError> {
        // Clone out of the map so the constructor runs without a shard lock held.
        let constructor = match self.entries.get(name) {
            None => {
                return Err(FactoryInitError::ClassNotFound {
                    name: name.to_string(),
                });
            }
            Some(entry) => entry.value().clone(),
        };
        let constructor = constructor.ok_or_else(|| FactoryInitError::NoSuchConstructor {
            name: name.to_string(),
        })?;

        constructor(config).map_err(|source| FactoryInitError::ConstructorFailed {
            name: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}
