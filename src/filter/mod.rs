//! Deserialization filters and the combinators that build them.
//!
//! A [`Filter`] maps a [`FilterInfo`] snapshot to a [`Status`]. Filters are
//! shared as [`FilterRef`] (`Arc<dyn Filter>`) so one instance can serve
//! many sessions on many threads.
//!
//! ```rust
//! use serial_filter::filter::{create_filter, merge, reject_undecided_class};
//! use serial_filter::{FilterInfo, SerialClass, Status};
//!
//! let pattern = create_filter("java.util.*;!java.lang.**;maxdepth=10")
//!     .unwrap()
//!     .unwrap();
//! let strict = reject_undecided_class(merge(pattern, None));
//!
//! let info = FilterInfo::for_class(SerialClass::object("com.example.Widget"));
//! assert_eq!(strict.check_input(&info).unwrap(), Status::Rejected);
//! ```

mod combinators;
mod observer;
mod pattern;

pub use combinators::{
    allow_filter, allow_max_limits, merge, reject_filter, reject_undecided_class,
};
pub use observer::{Observations, ObservingFilter};
pub use pattern::{ClassMatcher, Limits, PatternError, PatternFilter};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::{FilterInfo, Status};

/// Faults raised while evaluating a filter. Any of these aborts the session
/// that triggered the check.
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// The filter could not produce a status.
    #[error("filter {filter} returned no status")]
    NoStatus { filter: String },

    #[error("filter {filter} failed: {message}")]
    Failed { filter: String, message: String },
}

impl FilterError {
    pub fn failed(filter: impl fmt::Display, message: impl Into<String>) -> Self {
        FilterError::Failed {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}

/// Decides whether a class, array or reference may be reconstructed.
///
/// Implementations must be free of shared mutable state unless they exist
/// to accumulate observations for a single session (see [`ObservingFilter`]).
/// `Display` should describe the filter; compositions print as
/// `merge(a, b)` and `rejectUndecidedClass(f)`.
pub trait Filter: Send + Sync + fmt::Debug + fmt::Display {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError>;
}

pub type FilterRef = Arc<dyn Filter>;

/// Filter backed by a closure.
pub struct FnFilter<F> {
    label: String,
    check: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&FilterInfo) -> Result<Status, FilterError> + Send + Sync,
{
    pub fn new(label: impl Into<String>, check: F) -> Self {
        Self {
            label: label.into(),
            check,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&FilterInfo) -> Result<Status, FilterError> + Send + Sync,
{
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        (self.check)(info)
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<F> fmt::Display for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Wrap an infallible closure as a shared filter.
pub fn from_fn<F>(label: impl Into<String>, check: F) -> FilterRef
where
    F: Fn(&FilterInfo) -> Status + Send + Sync + 'static,
{
    Arc::new(FnFilter::new(label, move |info: &FilterInfo| Ok(check(info))))
}

/// Filter that answers every check with the same status.
pub fn constant(status: Status) -> FilterRef {
    from_fn(format!("constant({status})"), move |_| status)
}

/// Parse a pattern into a filter. Empty patterns (or only separators)
/// yield `Ok(None)`.
pub fn create_filter(pattern: &str) -> Result<Option<FilterRef>, PatternError> {
    Ok(PatternFilter::parse(pattern)?.map(|f| Arc::new(f) as FilterRef))
}
