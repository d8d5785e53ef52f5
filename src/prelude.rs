//! Prelude module for convenient imports.
//!
//! ```rust
//! use serial_filter::prelude::*;
//! ```

pub use crate::Error;
pub use crate::Result;

// Filters
pub use crate::filter::{
    Filter, FilterRef, PatternFilter, allow_filter, create_filter, merge, reject_filter,
    reject_undecided_class,
};
pub use crate::types::{ClassRegistry, ClassResolver, FilterInfo, SerialClass, Status};

// Factories and configuration
pub use crate::config::{FilterProperties, SerialConfig};
pub use crate::factory::{FactoryRef, FilterFactory, do_with_filter};

// Sessions and streams
pub use crate::session::{FilterSession, SessionId};
pub use crate::stream::{ObjectGraph, ObjectReader, ObjectWriter};
