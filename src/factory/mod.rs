//! Filter factories compose the process-wide, context and session filters
//! into the single effective filter a session evaluates.
//!
//! A factory is called twice per session at most: once with
//! `current = None` when the session opens (`next` is the process-wide
//! filter), and once more if the session attaches its own filter
//! (`current` is the previous result, `next` the session filter).

mod context;
mod registry;

pub use context::{ContextFilterFactory, context_depth, context_filter, do_with_filter};
pub use registry::{
    BoxError, FactoryConstructor, FactoryInitError, FactoryRegistry, factory_registry,
};

use std::fmt;
use std::sync::Arc;

use crate::filter::FilterRef;

pub trait FilterFactory: Send + Sync + fmt::Debug {
    /// Name reported in configuration errors and logs.
    fn name(&self) -> &str;

    fn apply(&self, current: Option<FilterRef>, next: Option<FilterRef>) -> Option<FilterRef>;
}

pub type FactoryRef = Arc<dyn FilterFactory>;

/// Default factory: always returns `next`.
///
/// On open `next` is the process-wide filter; when a session attaches its
/// own filter that filter replaces the current one outright. A session
/// passing `None` over an existing filter therefore gets `None` back and
/// the replacement is refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFilterFactory;

impl BuiltinFilterFactory {
    pub const NAME: &'static str = "builtin";
}

impl FilterFactory for BuiltinFilterFactory {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, _current: Option<FilterRef>, next: Option<FilterRef>) -> Option<FilterRef> {
        next
    }
}

/// Factory backed by a closure.
pub struct FnFilterFactory<F> {
    name: String,
    apply: F,
}

impl<F> FnFilterFactory<F>
where
    F: Fn(Option<FilterRef>, Option<FilterRef>) -> Option<FilterRef> + Send + Sync,
{
    pub fn new(name: impl Into<String>, apply: F) -> Self {
        Self {
            name: name.into(),
            apply,
        }
    }
}

impl<F> FilterFactory for FnFilterFactory<F>
where
    F: Fn(Option<FilterRef>, Option<FilterRef>) -> Option<FilterRef> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, current: Option<FilterRef>, next: Option<FilterRef>) -> Option<FilterRef> {
        (self.apply)(current, next)
    }
}

impl<F> fmt::Debug for FnFilterFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilterFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
