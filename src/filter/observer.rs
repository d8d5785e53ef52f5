use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use super::{Filter, FilterError, FilterRef};
use crate::types::{FilterInfo, Status};

/// Maxima and class names seen by an [`ObservingFilter`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Observations {
    pub checks: u64,
    pub max_depth: u64,
    pub max_references: u64,
    pub max_stream_bytes: u64,
    pub max_array_length: Option<u64>,
    pub classes: BTreeSet<String>,
}

impl Observations {
    fn record(&mut self, info: &FilterInfo) {
        self.checks += 1;
        self.max_depth = self.max_depth.max(info.depth());
        self.max_references = self.max_references.max(info.references());
        self.max_stream_bytes = self.max_stream_bytes.max(info.stream_bytes());
        if let Some(len) = info.array_length() {
            self.max_array_length = Some(self.max_array_length.map_or(len, |m| m.max(len)));
        }
        if let Some(class) = info.serial_class() {
            self.classes.insert(class.name().to_string());
        }
    }
}

/// Records every check it sees, then defers to an optional inner filter.
///
/// Useful for sizing limits: attach one to a session, read a representative
/// stream, and inspect [`ObservingFilter::observations`].
#[derive(Debug, Default)]
pub struct ObservingFilter {
    inner: Option<FilterRef>,
    observations: Mutex<Observations>,
}

impl ObservingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrapping(inner: FilterRef) -> Self {
        Self {
            inner: Some(inner),
            observations: Mutex::default(),
        }
    }

    pub fn observations(&self) -> Observations {
        self.observations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reset(&self) {
        *self.observations.lock().unwrap_or_else(|e| e.into_inner()) = Observations::default();
    }
}

impl Filter for ObservingFilter {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        self.observations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(info);
        match &self.inner {
            Some(inner) => inner.check_input(info),
            None => Ok(Status::Undecided),
        }
    }
}

impl fmt::Display for ObservingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "observing({inner})"),
            None => f.write_str("observing()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::constant;
    use crate::types::SerialClass;

    #[test]
    fn test_records_maxima() {
        let filter = ObservingFilter::new();
        let list = FilterInfo::for_class(SerialClass::object("java.util.List"))
            .with_depth(2)
            .with_references(3)
            .with_stream_bytes(40);
        let array = FilterInfo::for_array(
            SerialClass::array_of(&SerialClass::object("java.lang.String")),
            12,
        )
        .with_depth(5)
        .with_references(1);

        assert_eq!(filter.check_input(&list).unwrap(), Status::Undecided);
        assert_eq!(filter.check_input(&array).unwrap(), Status::Undecided);
        filter.check_input(&FilterInfo::limits_only()).unwrap();

        let seen = filter.observations();
        assert_eq!(seen.checks, 3);
        assert_eq!(seen.max_depth, 5);
        assert_eq!(seen.max_references, 3);
        assert_eq!(seen.max_stream_bytes, 40);
        assert_eq!(seen.max_array_length, Some(12));
        assert!(seen.classes.contains("java.util.List"));
        assert!(seen.classes.contains("[Ljava.lang.String;"));
    }

    #[test]
    fn test_defers_to_inner() {
        let filter = ObservingFilter::wrapping(constant(Status::Rejected));
        assert_eq!(
            filter.check_input(&FilterInfo::default()).unwrap(),
            Status::Rejected
        );
        assert_eq!(filter.to_string(), "observing(constant(REJECTED))");

        filter.reset();
        assert_eq!(filter.observations(), Observations::default());
    }
}
