//! Snapshot passed to filters at each decision point.

use serde::Serialize;

use super::SerialClass;

/// Immutable description of one decision point in a stream.
///
/// `serial_class` is `None` for limit-only checks (back-references).
/// `array_length` is set only when an array's length is first known.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_class: Option<SerialClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_length: Option<u64>,
    depth: u64,
    references: u64,
    stream_bytes: u64,
}

impl FilterInfo {
    pub fn new(
        serial_class: Option<SerialClass>,
        array_length: Option<u64>,
        depth: u64,
        references: u64,
        stream_bytes: u64,
    ) -> Self {
        Self {
            serial_class,
            array_length,
            depth,
            references,
            stream_bytes,
        }
    }

    pub fn for_class(class: SerialClass) -> Self {
        Self {
            serial_class: Some(class),
            ..Default::default()
        }
    }

    pub fn for_array(class: SerialClass, length: u64) -> Self {
        Self {
            serial_class: Some(class),
            array_length: Some(length),
            ..Default::default()
        }
    }

    pub fn limits_only() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: u64) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_references(mut self, references: u64) -> Self {
        self.references = references;
        self
    }

    pub fn with_stream_bytes(mut self, stream_bytes: u64) -> Self {
        self.stream_bytes = stream_bytes;
        self
    }

    pub fn with_array_length(mut self, length: u64) -> Self {
        self.array_length = Some(length);
        self
    }

    /// Same counters, different class. Used to recheck an array's base type.
    pub fn with_serial_class(&self, class: SerialClass) -> Self {
        Self {
            serial_class: Some(class),
            ..self.clone()
        }
    }

    pub fn serial_class(&self) -> Option<&SerialClass> {
        self.serial_class.as_ref()
    }

    pub fn array_length(&self) -> Option<u64> {
        self.array_length
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn references(&self) -> u64 {
        self.references
    }

    pub fn stream_bytes(&self) -> u64 {
        self.stream_bytes
    }
}
