//! Class identities seen by filters.

use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Primitive element types. Arrays of these are never rejected for being
/// undecided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Single-character descriptor used inside array names.
    pub fn descriptor(&self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
        }
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        Some(match c {
            'Z' => Primitive::Boolean,
            'B' => Primitive::Byte,
            'C' => Primitive::Char,
            'S' => Primitive::Short,
            'I' => Primitive::Int,
            'J' => Primitive::Long,
            'F' => Primitive::Float,
            'D' => Primitive::Double,
            _ => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    pub fn all() -> &'static [Primitive] {
        &[
            Primitive::Boolean,
            Primitive::Byte,
            Primitive::Char,
            Primitive::Short,
            Primitive::Int,
            Primitive::Long,
            Primitive::Float,
            Primitive::Double,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Primitive(Primitive),
    Object,
    Array(SerialClass),
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ClassData {
    name: String,
    module: Option<String>,
    kind: ClassKind,
}

/// Handle to a class (or array type) encountered in a stream.
///
/// Cloning is cheap; the data is shared. Names follow the binary naming
/// convention: `java.util.Hashtable` for classes, `int` for primitives and
/// descriptors such as `[I` or `[[Ljava.lang.String;` for arrays.
///
/// # Example
///
/// ```rust
/// use serial_filter::{Primitive, SerialClass};
///
/// let strings = SerialClass::object("java.lang.String").in_module("java.base");
/// let grid = SerialClass::array_of(&SerialClass::array_of(&strings));
/// assert_eq!(grid.name(), "[[Ljava.lang.String;");
/// assert_eq!(grid.base_component(), &strings);
///
/// let ints = SerialClass::array_of(&SerialClass::primitive(Primitive::Int));
/// assert_eq!(ints.name(), "[I");
/// assert!(ints.base_component().is_primitive());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SerialClass(Arc<ClassData>);

impl SerialClass {
    pub fn object(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassData {
            name: name.into(),
            module: None,
            kind: ClassKind::Object,
        }))
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self(Arc::new(ClassData {
            name: primitive.name().to_string(),
            module: Some("java.base".to_string()),
            kind: ClassKind::Primitive(primitive),
        }))
    }

    /// Array type whose elements are `component`. Arrays live in their
    /// component's module.
    pub fn array_of(component: &SerialClass) -> Self {
        let name = match component.kind() {
            ClassKind::Primitive(p) => format!("[{}", p.descriptor()),
            ClassKind::Array(_) => format!("[{}", component.name()),
            ClassKind::Object => format!("[L{};", component.name()),
        };
        Self(Arc::new(ClassData {
            name,
            module: component.module().map(str::to_string),
            kind: ClassKind::Array(component.clone()),
        }))
    }

    /// Return a copy of this class placed in `module`.
    pub fn in_module(self, module: impl Into<String>) -> Self {
        Self(Arc::new(ClassData {
            name: self.0.name.clone(),
            module: Some(module.into()),
            kind: self.0.kind.clone(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn module(&self) -> Option<&str> {
        self.0.module.as_deref()
    }

    pub fn kind(&self) -> &ClassKind {
        &self.0.kind
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.kind, ClassKind::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.0.kind, ClassKind::Primitive(_))
    }

    pub fn component_type(&self) -> Option<&SerialClass> {
        match &self.0.kind {
            ClassKind::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Innermost element type of an array, or the class itself.
    pub fn base_component(&self) -> &SerialClass {
        let mut current = self;
        while let Some(component) = current.component_type() {
            current = component;
        }
        current
    }

    pub fn array_dimensions(&self) -> usize {
        let mut dims = 0;
        let mut current = self;
        while let Some(component) = current.component_type() {
            dims += 1;
            current = component;
        }
        dims
    }

    /// Package of an object class: everything before the last `.`.
    /// Arrays report their base component's package; primitives have none.
    pub fn package_name(&self) -> &str {
        let base = self.base_component();
        if base.is_primitive() {
            return "";
        }
        base.name()
            .rsplit_once('.')
            .map(|(pkg, _)| pkg)
            .unwrap_or("")
    }
}

impl std::fmt::Display for SerialClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            ClassKind::Primitive(_) => f.write_str(self.name()),
            ClassKind::Object | ClassKind::Array(_) => write!(f, "class {}", self.name()),
        }
    }
}

impl Serialize for SerialClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_names() {
        let int = SerialClass::primitive(Primitive::Int);
        let int2 = SerialClass::array_of(&SerialClass::array_of(&int));
        assert_eq!(int2.name(), "[[I");
        assert_eq!(int2.array_dimensions(), 2);
        assert_eq!(int2.component_type().unwrap().name(), "[I");

        let map = SerialClass::object("java.util.HashMap");
        assert_eq!(SerialClass::array_of(&map).name(), "[Ljava.util.HashMap;");
    }

    #[test]
    fn test_package_name() {
        assert_eq!(
            SerialClass::object("java.util.Hashtable").package_name(),
            "java.util"
        );
        assert_eq!(SerialClass::object("TopLevel").package_name(), "");
        let nested = SerialClass::array_of(&SerialClass::object("java.lang.Integer"));
        assert_eq!(nested.package_name(), "java.lang");
        assert_eq!(SerialClass::primitive(Primitive::Long).package_name(), "");
    }

    #[test]
    fn test_module_follows_component() {
        let s = SerialClass::object("java.lang.String").in_module("java.base");
        let arr = SerialClass::array_of(&s);
        assert_eq!(arr.module(), Some("java.base"));
        assert_eq!(arr.base_component(), &s);
    }

    #[test]
    fn test_primitive_lookup() {
        assert_eq!(Primitive::from_descriptor('J'), Some(Primitive::Long));
        assert_eq!(Primitive::from_name("double"), Some(Primitive::Double));
        assert_eq!(Primitive::from_descriptor('L'), None);
    }
}
