//! In-memory configuration provider
//!
//! Useful for tests and code-defined configuration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Debug, Clone)]
pub struct MemoryConfigProvider {
    data: Arc<RwLock<HashMap<String, String>>>,
    name: String,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            data: Arc::default(),
            name: name.into(),
        }
    }

    pub fn from_data(data: HashMap<String, String>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            name: "memory".to_string(),
        }
    }

    /// Builder-style insert.
    pub fn value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_provider_basic() {
        let provider = MemoryConfigProvider::new().value("serial.filter", "a.B");
        provider.insert("serial.filter.factory", "context");
        assert_eq!(
            provider.get_raw("serial.filter").unwrap().as_deref(),
            Some("a.B")
        );
        assert_eq!(provider.get_raw("nonexistent").unwrap(), None);
        assert_eq!(provider.len(), 2);
        assert!(!provider.is_empty());
    }

    #[test]
    fn test_from_data() {
        let data = [("serial.filter".to_string(), "!*".to_string())].into();
        let provider = MemoryConfigProvider::from_data(data);
        assert_eq!(provider.name(), "memory");
        assert_eq!(provider.get_raw("serial.filter").unwrap().as_deref(), Some("!*"));
    }

    #[test]
    fn test_get_bool() {
        let provider = MemoryConfigProvider::new()
            .value("on", "TRUE")
            .value("off", " false ")
            .value("bad", "yes");
        assert_eq!(provider.get_bool("on").unwrap(), Some(true));
        assert_eq!(provider.get_bool("off").unwrap(), Some(false));
        assert_eq!(provider.get_bool("missing").unwrap(), None);
        assert!(provider.get_bool("bad").is_err());
    }
}
