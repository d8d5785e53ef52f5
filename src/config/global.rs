//! Write-once process configuration: the serial filter and filter factory.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::thread::{self, ThreadId};

use super::{ConfigError, ConfigResult, FilterProperties};
use crate::factory::{
    BuiltinFilterFactory, FactoryInitError, FactoryRef, FactoryRegistry, factory_registry,
};
use crate::filter::{FilterRef, PatternError, PatternFilter};

static GLOBAL: OnceLock<SerialConfig> = OnceLock::new();

#[derive(Debug, Default)]
struct FilterSlot {
    filter: Option<FilterRef>,
    set: bool,
    invalid: Option<(String, PatternError)>,
}

#[derive(Debug, Default)]
struct FactorySlot {
    installed: Option<FactoryRef>,
    locked: bool,
}

/// Holds the process-wide filter and filter factory.
///
/// Both slots are write-once. The filter slot is filled by the first
/// successful [`set_serial_filter`](Self::set_serial_filter) or by a valid
/// configured pattern. The factory slot is filled by the first
/// [`set_filter_factory`](Self::set_filter_factory) and locked as soon as a
/// session reads it through
/// [`filter_factory_singleton`](Self::filter_factory_singleton).
///
/// A configured factory name is resolved lazily on first use. A failure is
/// logged once and returned on every later access.
#[derive(Debug)]
pub struct SerialConfig {
    properties: FilterProperties,
    registry: FactoryRegistry,
    filter: RwLock<FilterSlot>,
    factory: Mutex<FactorySlot>,
    configured: OnceLock<Result<Option<FactoryRef>, Arc<FactoryInitError>>>,
    initializing: Mutex<Option<ThreadId>>,
    builtin: FactoryRef,
}

impl SerialConfig {
    pub fn new(properties: FilterProperties, registry: FactoryRegistry) -> Self {
        let mut slot = FilterSlot::default();
        if let Some(pattern) = properties.filter_pattern.as_deref() {
            match PatternFilter::parse(pattern) {
                Ok(Some(filter)) => {
                    tracing::info!(pattern, "creating serial filter from configuration");
                    slot.filter = Some(Arc::new(filter));
                    slot.set = true;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(pattern, error = %e, "invalid configured serial filter");
                    slot.invalid = Some((pattern.to_string(), e));
                }
            }
        }

        Self {
            properties,
            registry,
            filter: RwLock::new(slot),
            factory: Mutex::default(),
            configured: OnceLock::new(),
            initializing: Mutex::new(None),
            builtin: Arc::new(BuiltinFilterFactory),
        }
    }

    /// The process singleton, built on first use from the environment and
    /// the global [`factory_registry`].
    pub fn global() -> &'static SerialConfig {
        GLOBAL.get_or_init(|| {
            let properties = FilterProperties::from_env().unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to read serial filter properties");
                FilterProperties::default()
            });
            SerialConfig::new(properties, factory_registry().clone())
        })
    }

    pub fn properties(&self) -> &FilterProperties {
        &self.properties
    }

    pub fn set_filter_after_read(&self) -> bool {
        self.properties.set_filter_after_read
    }

    pub fn serial_filter(&self) -> ConfigResult<Option<FilterRef>> {
        let slot = self.filter.read().unwrap_or_else(|e| e.into_inner());
        if let Some((pattern, source)) = &slot.invalid {
            return Err(ConfigError::InvalidFilterPattern {
                pattern: pattern.clone(),
                source: source.clone(),
            });
        }
        Ok(slot.filter.clone())
    }

    /// Install the process-wide filter. Fails if one is already present.
    pub fn set_serial_filter(&self, filter: FilterRef) -> ConfigResult<()> {
        let mut slot = self.filter.write().unwrap_or_else(|e| e.into_inner());
        if let Some((pattern, source)) = &slot.invalid {
            return Err(ConfigError::InvalidFilterPattern {
                pattern: pattern.clone(),
                source: source.clone(),
            });
        }
        if slot.set {
            return Err(ConfigError::FilterAlreadySet);
        }
        tracing::info!(filter = %filter, "setting process-wide serial filter");
        slot.filter = Some(filter);
        slot.set = true;
        Ok(())
    }

    /// Current factory without locking the slot.
    pub fn filter_factory(&self) -> ConfigResult<FactoryRef> {
        let configured = self.configured_factory()?;
        let slot = self.factory.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.effective_factory(&slot, configured))
    }

    /// Current factory; no other factory may be installed afterwards.
    pub fn filter_factory_singleton(&self) -> ConfigResult<FactoryRef> {
        let configured = self.configured_factory()?;
        let mut slot = self.factory.lock().unwrap_or_else(|e| e.into_inner());
        slot.locked = true;
        Ok(self.effective_factory(&slot, configured))
    }

    /// Install the filter factory.
    ///
    /// A factory constructor may register itself once while it is being
    /// built from configuration; a second attempt during construction
    /// fails with `initialization incomplete`.
    pub fn set_filter_factory(&self, factory: FactoryRef) -> ConfigResult<()> {
        if self.initializing_here() {
            let mut slot = self.factory.lock().unwrap_or_else(|e| e.into_inner());
            if slot.locked {
                return Err(ConfigError::FactoryReplace {
                    current: "initialization incomplete".to_string(),
                });
            }
            tracing::debug!(factory = factory.name(), "filter factory registered during initialization");
            slot.installed = Some(factory);
            slot.locked = true;
            return Ok(());
        }

        let configured = self.configured_factory()?;
        let mut slot = self.factory.lock().unwrap_or_else(|e| e.into_inner());
        if slot.locked {
            let current = self.effective_factory(&slot, configured);
            return Err(ConfigError::FactoryReplace {
                current: current.name().to_string(),
            });
        }
        tracing::debug!(factory = factory.name(), "setting filter factory");
        slot.installed = Some(factory);
        slot.locked = true;
        Ok(())
    }

    fn effective_factory(&self, slot: &FactorySlot, configured: Option<FactoryRef>) -> FactoryRef {
        slot.installed
            .clone()
            .or(configured)
            .unwrap_or_else(|| self.builtin.clone())
    }

    fn initializing_here(&self) -> bool {
        *self.initializing.lock().unwrap_or_else(|e| e.into_inner()) == Some(thread::current().id())
    }

    fn configured_factory(&self) -> ConfigResult<Option<FactoryRef>> {
        if self.initializing_here() {
            return Ok(None);
        }
        match self.configured.get_or_init(|| self.construct_configured()) {
            Ok(factory) => Ok(factory.clone()),
            Err(e) => Err(ConfigError::FactoryInit(e.clone())),
        }
    }

    fn construct_configured(&self) -> Result<Option<FactoryRef>, Arc<FactoryInitError>> {
        let Some(name) = self.properties.factory_name.as_deref() else {
            return Ok(None);
        };

        let result = {
            let _guard = InitGuard::enter(&self.initializing);
            self.registry.construct(name, self)
        };

        match result {
            Ok(factory) => {
                tracing::info!(factory = name, "created filter factory from configuration");
                self.factory.lock().unwrap_or_else(|e| e.into_inner()).locked = true;
                Ok(Some(factory))
            }
            Err(e) => {
                tracing::error!(factory = name, error = %e, "filter factory initialization failed");
                Err(Arc::new(e))
            }
        }
    }
}

struct InitGuard<'a> {
    initializing: &'a Mutex<Option<ThreadId>>,
}

impl<'a> InitGuard<'a> {
    fn enter(initializing: &'a Mutex<Option<ThreadId>>) -> Self {
        *initializing.lock().unwrap_or_else(|e| e.into_inner()) = Some(thread::current().id());
        Self { initializing }
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        *self.initializing.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
