//! Thread-scoped filter stack and the factory that folds it into sessions.

use std::cell::RefCell;

use super::FilterFactory;
use crate::filter::{FilterRef, merge, reject_undecided_class};

thread_local! {
    static CONTEXT: RefCell<Vec<Option<FilterRef>>> = const { RefCell::new(Vec::new()) };
}

/// Run `body` with `filter` pushed on this thread's context stack.
///
/// The entry is removed on every exit path, including unwinding out of
/// `body`. A `None` filter still occupies a slot so nesting stays symmetric.
///
/// ```rust
/// use serial_filter::factory::{context_depth, do_with_filter};
/// use serial_filter::filter::create_filter;
///
/// let filter = create_filter("!java.io.**").unwrap();
/// let depth = do_with_filter(filter, context_depth);
/// assert_eq!(depth, 1);
/// assert_eq!(context_depth(), 0);
/// ```
pub fn do_with_filter<R>(filter: Option<FilterRef>, body: impl FnOnce() -> R) -> R {
    let restore_to = CONTEXT.with_borrow_mut(|stack| {
        stack.push(filter);
        stack.len() - 1
    });
    let _guard = ContextGuard { restore_to };
    body()
}

/// Number of `do_with_filter` scopes active on this thread.
pub fn context_depth() -> usize {
    CONTEXT.with_borrow(Vec::len)
}

/// All filters on this thread's stack merged outermost to innermost.
pub fn context_filter() -> Option<FilterRef> {
    CONTEXT.with_borrow(|stack| {
        stack
            .iter()
            .flatten()
            .cloned()
            .reduce(|outer, inner| merge(outer, Some(inner)))
    })
}

struct ContextGuard {
    restore_to: usize,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT.with_borrow_mut(|stack| stack.truncate(self.restore_to));
    }
}

/// Factory that layers the calling thread's context filters under the
/// process-wide filter, then the session filter on top, closing every
/// composition with [`reject_undecided_class`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextFilterFactory;

impl ContextFilterFactory {
    pub const NAME: &'static str = "context";
}

impl FilterFactory for ContextFilterFactory {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, current: Option<FilterRef>, next: Option<FilterRef>) -> Option<FilterRef> {
        match (current, next) {
            (None, next) => {
                let context = context_filter();
                let combined = match next {
                    Some(global) => Some(merge(global, context)),
                    None => context,
                }?;
                tracing::debug!(
                    filter = %combined,
                    depth = context_depth(),
                    "composed context filter for new session"
                );
                Some(reject_undecided_class(combined))
            }
            (Some(current), None) => Some(current),
            (Some(current), Some(session)) => {
                Some(reject_undecided_class(merge(session, Some(current))))
            }
        }
    }
}
