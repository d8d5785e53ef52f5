//! Configuration provider trait

use super::{ConfigError, ConfigResult};

/// Read-only source of raw configuration values keyed by dotted names.
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;

    /// Read a boolean, accepting `true`/`false` in any case.
    fn get_bool(&self, key: &str) -> ConfigResult<Option<bool>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected true or false, got {raw:?}"),
            }),
        }
    }
}
