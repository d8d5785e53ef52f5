//! Deserialization sessions: effective-filter binding, limit tracking and
//! check events.

mod binding;
mod events;
mod id;
mod tracker;

pub use binding::FilterSession;
pub use events::{EventLog, FilterEvent, FilterEventSink};
pub use id::SessionId;
pub use tracker::LimitTracker;

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::types::Status;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("filter can not be set more than once")]
    FilterAlreadySet,

    #[error("filter can not be set after an object has been read")]
    SetAfterRead,

    #[error("filter can not be replaced with null filter")]
    NullReplacement,

    /// A check was rejected or the filter failed. The session is aborted.
    #[error("filter status: {status} ({})", .class.as_deref().unwrap_or("no class"))]
    Rejected {
        status: Status,
        class: Option<String>,
        #[source]
        source: Option<FilterError>,
    },

    #[error("session was aborted by an earlier rejection")]
    Aborted,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::Rejected { .. } | SessionError::Aborted)
    }

    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            SessionError::FilterAlreadySet
                | SessionError::SetAfterRead
                | SessionError::NullReplacement
        )
    }
}
