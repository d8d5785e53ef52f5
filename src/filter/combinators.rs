//! Stateless filters composed from other filters or predicates.

use std::fmt;
use std::sync::Arc;

use super::{Filter, FilterError, FilterRef};
use crate::types::{FilterInfo, SerialClass, Status};

/// Combine two filters: reject if either rejects, allow if either allows,
/// otherwise undecided. `second` is only consulted when `first` does not
/// reject. `merge(f, None)` is `f` itself.
pub fn merge(first: FilterRef, second: Option<FilterRef>) -> FilterRef {
    match second {
        None => first,
        Some(second) => Arc::new(MergeFilter { first, second }),
    }
}

/// Close the "undecided" loophole: an undecided class becomes rejected,
/// unless it is an array whose base component the filter allows. Arrays of
/// primitives stay undecided at any nesting depth.
pub fn reject_undecided_class(filter: FilterRef) -> FilterRef {
    Arc::new(RejectUndecidedFilter { filter })
}

/// `Allowed` when the class matches, `other` when it does not, `Undecided`
/// when there is no class.
pub fn allow_filter<P>(predicate: P, other: Status) -> FilterRef
where
    P: Fn(&SerialClass) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateFilter {
        predicate: Box::new(predicate),
        if_true: Status::Allowed,
        if_false: other,
    })
}

/// `Rejected` when the class matches, `other` when it does not, `Undecided`
/// when there is no class.
pub fn reject_filter<P>(predicate: P, other: Status) -> FilterRef
where
    P: Fn(&SerialClass) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateFilter {
        predicate: Box::new(predicate),
        if_true: Status::Rejected,
        if_false: other,
    })
}

/// Accept every limit-only check; take no position on classes.
pub fn allow_max_limits() -> FilterRef {
    Arc::new(AllowMaxLimits)
}

#[derive(Debug)]
struct MergeFilter {
    first: FilterRef,
    second: FilterRef,
}

impl Filter for MergeFilter {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        let first = self.first.check_input(info)?;
        if first.is_rejected() {
            return Ok(Status::Rejected);
        }
        let second = self.second.check_input(info)?;
        Ok(first.combine(second))
    }
}

impl fmt::Display for MergeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "merge({}, {})", self.first, self.second)
    }
}

#[derive(Debug)]
struct RejectUndecidedFilter {
    filter: FilterRef,
}

impl Filter for RejectUndecidedFilter {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        let status = self.filter.check_input(info)?;
        if !status.is_undecided() {
            return Ok(status);
        }
        let Some(class) = info.serial_class() else {
            return Ok(status);
        };

        let base = class.base_component();
        if base.is_primitive() {
            return Ok(Status::Undecided);
        }
        if !class.is_array() {
            return Ok(Status::Rejected);
        }

        let base_status = self
            .filter
            .check_input(&info.with_serial_class(base.clone()))?;
        Ok(if base_status.is_allowed() {
            Status::Allowed
        } else {
            Status::Rejected
        })
    }
}

impl fmt::Display for RejectUndecidedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejectUndecidedClass({})", self.filter)
    }
}

struct PredicateFilter {
    predicate: Box<dyn Fn(&SerialClass) -> bool + Send + Sync>,
    if_true: Status,
    if_false: Status,
}

impl Filter for PredicateFilter {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        Ok(match info.serial_class() {
            None => Status::Undecided,
            Some(class) if (self.predicate)(class) => self.if_true,
            Some(_) => self.if_false,
        })
    }
}

impl fmt::Debug for PredicateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter")
            .field("if_true", &self.if_true)
            .field("if_false", &self.if_false)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PredicateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "predicate({}, otherwise {})", self.if_true, self.if_false)
    }
}

#[derive(Debug)]
struct AllowMaxLimits;

impl Filter for AllowMaxLimits {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        Ok(if info.serial_class().is_none() {
            Status::Allowed
        } else {
            Status::Undecided
        })
    }
}

impl fmt::Display for AllowMaxLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allowMaxLimits()")
    }
}
