//! Core value types: decision status, class handles and filter snapshots.

mod class;
mod info;
mod resolver;
mod status;

pub use class::{ClassKind, Primitive, SerialClass};
pub use info::FilterInfo;
pub use resolver::{ClassRegistry, ClassResolver, MAX_ARRAY_DIMENSIONS};
pub use status::Status;
