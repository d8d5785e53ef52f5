//! Audit records for individual filter checks.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionId;
use crate::types::{FilterInfo, Status};

/// One filter check performed by a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEvent {
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub filter_configured: bool,
    /// `None` when the filter failed instead of answering.
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_length: Option<u64>,
    pub references: u64,
    pub depth: u64,
    pub stream_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FilterEvent {
    pub fn new(session_id: SessionId, info: &FilterInfo) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id,
            filter_configured: false,
            status: None,
            class: info.serial_class().map(|c| c.name().to_string()),
            array_length: info.array_length(),
            references: info.references(),
            depth: info.depth(),
            stream_bytes: info.stream_bytes(),
            error: None,
        }
    }

    pub fn with_filter_configured(mut self, configured: bool) -> Self {
        self.filter_configured = configured;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_rejection(&self) -> bool {
        self.error.is_some() || self.status.is_some_and(|s| s.is_rejected())
    }
}

/// Receives every [`FilterEvent`] a session produces.
pub trait FilterEventSink: Send + Sync {
    fn record(&self, event: FilterEvent);
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<FilterEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FilterEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn rejections(&self) -> Vec<FilterEvent> {
        self.events()
            .into_iter()
            .filter(FilterEvent::is_rejection)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for event in self.events() {
            out.push_str(&serde_json::to_string(&event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl FilterEventSink for EventLog {
    fn record(&self, event: FilterEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
