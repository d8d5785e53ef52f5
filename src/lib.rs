//! # serial-filter
//!
//! Deserialization filters: decide, for every class, array and resource
//! limit met while rebuilding an object graph from a stream, whether
//! reconstruction may proceed.
//!
//! The pieces, leaves first:
//!
//! - [`FilterInfo`] and [`Status`]: one decision point and its outcome.
//! - [`filter`]: the [`Filter`] trait, the pattern language and the
//!   `merge` / `reject_undecided_class` combinators.
//! - [`factory`]: filter factories and the thread-scoped filter stack.
//! - [`config`]: the write-once process configuration.
//! - [`session`]: per-stream binding of the effective filter.
//! - [`stream`]: a JSON-lines object stream that drives sessions.
//!
//! ## Quick Start
//!
//! ```rust
//! use serial_filter::config::{FilterProperties, SerialConfig};
//! use serial_filter::factory::FactoryRegistry;
//! use serial_filter::session::FilterSession;
//! use serial_filter::{SerialClass, Status};
//!
//! let properties = FilterProperties::default()
//!     .with_filter_pattern("java.util.*;!*;maxdepth=16")
//!     .with_factory("context");
//! let config = SerialConfig::new(properties, FactoryRegistry::builtins());
//!
//! let mut session = FilterSession::open(&config)?;
//! session.enter_object()?;
//! let status = session.check_class(&SerialClass::object("java.util.ArrayList"))?;
//! assert_eq!(status, Status::Allowed);
//!
//! session.enter_object()?;
//! let rejected = session.check_class(&SerialClass::object("com.example.Gadget"));
//! assert!(rejected.is_err());
//! # Ok::<(), serial_filter::Error>(())
//! ```

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod factory;
pub mod filter;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod types;

pub use config::{ConfigError, FilterProperties, SerialConfig};
pub use factory::{
    BuiltinFilterFactory, ContextFilterFactory, FactoryInitError, FactoryRef, FactoryRegistry,
    FilterFactory, do_with_filter, factory_registry,
};
pub use filter::{
    Filter, FilterError, FilterRef, PatternError, PatternFilter, create_filter, merge,
    reject_undecided_class,
};
pub use session::{EventLog, FilterEvent, FilterEventSink, FilterSession, SessionError, SessionId};
pub use stream::{ObjectGraph, ObjectReader, ObjectWriter, StreamError};
pub use types::{ClassKind, ClassRegistry, ClassResolver, FilterInfo, Primitive, SerialClass, Status};

/// Error type for serial-filter operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid filter pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Filter failed: {0}")]
    Filter(#[from] FilterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Factory initialization failed: {0}")]
    FactoryInit(#[from] FactoryInitError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed patterns or configuration values
    Configuration,
    /// A filter rejected the input or failed while checking it
    Rejection,
    /// Write-once slots or per-session state used out of order
    State,
    /// The configured filter factory could not be constructed
    Initialization,
    /// IO, JSON and stream corruption
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Pattern(_) => ErrorCategory::Configuration,
            Error::Filter(_) => ErrorCategory::Rejection,
            Error::Config(e) => config_category(e),
            Error::FactoryInit(_) => ErrorCategory::Initialization,
            Error::Session(e) => session_category(e),
            Error::Stream(StreamError::Session(e)) => session_category(e),
            Error::Stream(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.category() == ErrorCategory::Rejection
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_state_error(&self) -> bool {
        self.category() == ErrorCategory::State
    }
}

fn config_category(err: &ConfigError) -> ErrorCategory {
    match err {
        ConfigError::FilterAlreadySet | ConfigError::FactoryReplace { .. } => ErrorCategory::State,
        ConfigError::FactoryInit(_) => ErrorCategory::Initialization,
        ConfigError::InvalidFilterPattern { .. }
        | ConfigError::InvalidValue { .. }
        | ConfigError::Env(_) => ErrorCategory::Configuration,
        ConfigError::Io(_) | ConfigError::Serialization(_) => ErrorCategory::Internal,
    }
}

fn session_category(err: &SessionError) -> ErrorCategory {
    match err {
        SessionError::Rejected { .. } | SessionError::Aborted => ErrorCategory::Rejection,
        SessionError::FilterAlreadySet
        | SessionError::SetAfterRead
        | SessionError::NullReplacement => ErrorCategory::State,
        SessionError::Config(e) => config_category(e),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err: Error = PatternError::UnknownLimit {
            name: "maxfoo".into(),
        }
        .into();
        assert!(err.is_configuration_error());

        let err: Error = ConfigError::FilterAlreadySet.into();
        assert!(err.is_state_error());

        let err: Error = SessionError::Rejected {
            status: Status::Rejected,
            class: Some("a.B".into()),
            source: None,
        }
        .into();
        assert!(err.is_rejection());

        let err: Error = StreamError::Session(SessionError::Aborted).into();
        assert!(err.is_rejection());

        let err: Error = StreamError::Corrupted("bad".into()).into();
        assert_eq!(err.category(), ErrorCategory::Internal);

        let err: Error = SessionError::Config(ConfigError::FactoryInit(std::sync::Arc::new(
            FactoryInitError::ClassNotFound {
                name: "Missing".into(),
            },
        )))
        .into();
        assert_eq!(err.category(), ErrorCategory::Initialization);
    }

    #[test]
    fn test_error_display() {
        let err: Error = ConfigError::FactoryReplace {
            current: "context".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Cannot replace filter factory: context"
        );
    }
}
