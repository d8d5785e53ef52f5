//! Composite configuration provider
//!
//! Chains providers; earlier providers have higher priority.

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier providers win.
    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("provider_names", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    #[test]
    fn test_composite_provider_priority() {
        let high = MemoryConfigProvider::named("high").value("serial.filter", "high.*");
        let low = MemoryConfigProvider::named("low")
            .value("serial.filter", "low.*")
            .value("serial.filter.factory", "context");

        let composite = CompositeConfigProvider::new()
            .provider(Box::new(high))
            .provider(Box::new(low));

        assert_eq!(
            composite.get_raw("serial.filter").unwrap().as_deref(),
            Some("high.*")
        );
        assert_eq!(
            composite.get_raw("serial.filter.factory").unwrap().as_deref(),
            Some("context")
        );
        assert_eq!(composite.provider_names(), vec!["high", "low"]);
    }

    #[test]
    fn test_composite_provider_bool_falls_through() {
        let composite = CompositeConfigProvider::new()
            .provider(Box::new(MemoryConfigProvider::new()))
            .provider(Box::new(
                MemoryConfigProvider::new().value("serial.set.filter.after.read", "True"),
            ));
        assert_eq!(composite.provider_count(), 2);
        assert_eq!(
            composite.get_bool("serial.set.filter.after.read").unwrap(),
            Some(true)
        );
        assert_eq!(composite.get_raw("missing").unwrap(), None);
    }
}
