//! Class-name resolution capability supplied by the host.

use std::sync::Arc;

use dashmap::DashMap;

use super::{Primitive, SerialClass};

/// Resolves a binary class name (or array descriptor) to a class handle.
pub trait ClassResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<SerialClass>;
}

impl<R: ClassResolver + ?Sized> ClassResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Option<SerialClass> {
        (**self).resolve(name)
    }
}

/// Deepest array type a descriptor may name.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Concurrent registry of known object classes.
///
/// Primitive names and array descriptors are resolved structurally; only
/// object classes need registering. With `allow_unregistered`, unknown
/// object names resolve to module-less classes instead of failing.
/// Descriptors naming more than [`MAX_ARRAY_DIMENSIONS`] dimensions never
/// resolve.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Arc<DashMap<String, SerialClass>>,
    allow_unregistered: bool,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_unregistered() -> Self {
        Self {
            allow_unregistered: true,
            ..Default::default()
        }
    }

    pub fn register(&self, class: SerialClass) -> &Self {
        self.classes.insert(class.name().to_string(), class);
        self
    }

    pub fn with_class(self, class: SerialClass) -> Self {
        self.register(class);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<SerialClass> {
        self.classes.remove(name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn resolve_object(&self, name: &str) -> Option<SerialClass> {
        if name.is_empty() {
            return None;
        }
        if let Some(class) = self.classes.get(name) {
            return Some(class.clone());
        }
        self.allow_unregistered.then(|| SerialClass::object(name))
    }

    fn resolve_descriptor(&self, descriptor: &str) -> Option<SerialClass> {
        let element = descriptor.trim_start_matches('[');
        let dimensions = descriptor.len() - element.len();
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return None;
        }

        let mut class = if let Some(object) = element
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
        {
            self.resolve_object(object)?
        } else {
            let mut chars = element.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => SerialClass::primitive(Primitive::from_descriptor(c)?),
                _ => return None,
            }
        };
        for _ in 0..dimensions {
            class = SerialClass::array_of(&class);
        }
        Some(class)
    }
}

impl ClassResolver for ClassRegistry {
    fn resolve(&self, name: &str) -> Option<SerialClass> {
        if name.starts_with('[') {
            return self.resolve_descriptor(name);
        }
        if let Some(primitive) = Primitive::from_name(name) {
            return Some(SerialClass::primitive(primitive));
        }
        self.resolve_object(name)
    }
}
