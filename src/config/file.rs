//! JSON file configuration provider.
//!
//! Keys are looked up flat first (`{"serial.filter": ...}`), then as a
//! dotted path through nested objects (`{"serial": {"filter": ...}}`).
//! The file is read on first lookup and never again; a missing file reads
//! as empty.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct FileConfigProvider {
    path: PathBuf,
    data: OnceLock<HashMap<String, Value>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn with_data<R>(&self, f: impl FnOnce(&HashMap<String, Value>) -> R) -> ConfigResult<R> {
        if let Some(data) = self.data.get() {
            return Ok(f(data));
        }
        let loaded = self.load()?;
        Ok(f(self.data.get_or_init(|| loaded)))
    }
}

fn lookup<'a>(map: &'a HashMap<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    let mut parts = key.split('.');
    let first = map.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.get(part))
}

impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        self.with_data(|map| match lookup(map, key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(v) => Some(v.to_string()),
        })
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .finish()
    }
}
