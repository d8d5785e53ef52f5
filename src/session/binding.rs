//! Per-stream binding between the effective filter and the graph walker.

use std::fmt;
use std::sync::Arc;

use super::events::{FilterEvent, FilterEventSink};
use super::tracker::LimitTracker;
use super::{SessionError, SessionId};
use crate::config::SerialConfig;
use crate::factory::FactoryRef;
use crate::filter::{FilterError, FilterRef};
use crate::types::{FilterInfo, SerialClass, Status};

/// Filter state for one deserialization stream.
///
/// Opening a session asks the configured factory for the initial filter
/// (`apply(None, process_filter)`). The walker reports every decision point
/// through the `check_*` methods; the first rejection aborts the session and
/// every later call fails with [`SessionError::Aborted`].
pub struct FilterSession {
    id: SessionId,
    factory: FactoryRef,
    filter: Option<FilterRef>,
    stream_filter_set: bool,
    allow_set_after_read: bool,
    tracker: LimitTracker,
    aborted: bool,
    sink: Option<Arc<dyn FilterEventSink>>,
}

impl FilterSession {
    /// Open a session against the process-wide configuration.
    pub fn new() -> Result<Self, SessionError> {
        Self::open(SerialConfig::global())
    }

    pub fn open(config: &SerialConfig) -> Result<Self, SessionError> {
        let factory = config.filter_factory_singleton()?;
        let filter = factory.apply(None, config.serial_filter()?);
        let id = SessionId::new();

        tracing::debug!(
            session = %id,
            factory = factory.name(),
            filter = filter.as_ref().map(|f| f.to_string()),
            "opened filter session"
        );

        Ok(Self {
            id,
            factory,
            filter,
            stream_filter_set: false,
            allow_set_after_read: config.set_filter_after_read(),
            tracker: LimitTracker::new(),
            aborted: false,
            sink: None,
        })
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn FilterEventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The effective filter, if any.
    pub fn filter(&self) -> Option<&FilterRef> {
        self.filter.as_ref()
    }

    pub fn tracker(&self) -> &LimitTracker {
        &self.tracker
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Attach the stream-specific filter, composed through the factory as
    /// `apply(current, filter)`.
    ///
    /// Allowed once, and only before the first object is read unless the
    /// configuration enables `serial.set.filter.after.read`. Passing `None`
    /// while no filter is active changes nothing. Any other call uses up the
    /// slot, including one the factory turns into a null replacement.
    pub fn set_filter(&mut self, filter: Option<FilterRef>) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.tracker.references() > 0 && !self.allow_set_after_read {
            return Err(SessionError::SetAfterRead);
        }
        if self.stream_filter_set {
            return Err(SessionError::FilterAlreadySet);
        }
        if filter.is_none() && self.filter.is_none() {
            return Ok(());
        }

        self.stream_filter_set = true;
        let next = self.factory.apply(self.filter.clone(), filter);
        if next.is_none() && self.filter.is_some() {
            return Err(SessionError::NullReplacement);
        }

        tracing::debug!(
            session = %self.id,
            filter = next.as_ref().map(|f| f.to_string()),
            "stream filter set"
        );
        self.filter = next;
        Ok(())
    }

    /// Descend into a new object: depth and reference count both grow.
    pub fn enter_object(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.tracker.enter();
        self.tracker.record_reference();
        Ok(())
    }

    pub fn leave_object(&mut self) {
        self.tracker.exit();
    }

    pub fn consume_bytes(&mut self, bytes: u64) -> Result<(), SessionError> {
        self.ensure_live()?;
        self.tracker.add_bytes(bytes);
        Ok(())
    }

    pub fn check_class(&mut self, class: &SerialClass) -> Result<Status, SessionError> {
        self.check(Some(class), None)
    }

    pub fn check_array(&mut self, class: &SerialClass, length: u64) -> Result<Status, SessionError> {
        self.check(Some(class), Some(length))
    }

    /// Limit-only check, as made for back-references.
    pub fn check_limits(&mut self) -> Result<Status, SessionError> {
        self.check(None, None)
    }

    /// Evaluate the effective filter at the current counters.
    ///
    /// Without a filter every check is `Undecided`. A rejection, or a filter
    /// that fails, aborts the session.
    pub fn check(
        &mut self,
        class: Option<&SerialClass>,
        array_length: Option<u64>,
    ) -> Result<Status, SessionError> {
        self.ensure_live()?;

        let info = FilterInfo::new(
            class.cloned(),
            array_length,
            self.tracker.depth(),
            self.tracker.references(),
            self.tracker.stream_bytes(),
        );
        let event = FilterEvent::new(self.id, &info).with_filter_configured(self.filter.is_some());

        let Some(filter) = &self.filter else {
            self.emit(event.with_status(Status::Undecided));
            return Ok(Status::Undecided);
        };

        let result = filter.check_input(&info);
        let class_name = class.map(|c| c.name().to_string());

        match result {
            Ok(Status::Rejected) => {
                log_check(&self.id, &info, Some(Status::Rejected), None);
                self.emit(event.with_status(Status::Rejected));
                self.aborted = true;
                Err(SessionError::Rejected {
                    status: Status::Rejected,
                    class: class_name,
                    source: None,
                })
            }
            Ok(status) => {
                log_check(&self.id, &info, Some(status), None);
                self.emit(event.with_status(status));
                Ok(status)
            }
            Err(e) => {
                log_check(&self.id, &info, None, Some(&e));
                self.emit(event.with_error(e.to_string()));
                self.aborted = true;
                Err(SessionError::Rejected {
                    status: Status::Rejected,
                    class: class_name,
                    source: Some(e),
                })
            }
        }
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.aborted {
            return Err(SessionError::Aborted);
        }
        Ok(())
    }

    fn emit(&self, event: FilterEvent) {
        if let Some(sink) = &self.sink {
            sink.record(event);
        }
    }
}

fn log_check(
    session: &SessionId,
    info: &FilterInfo,
    status: Option<Status>,
    error: Option<&FilterError>,
) {
    let class = info.serial_class().map(|c| c.name());
    let status = status.map_or("none", |s| s.as_str());
    let error = error.map(|e| e.to_string());
    if status == Status::Rejected.as_str() || error.is_some() {
        tracing::debug!(
            %session,
            status,
            class,
            array_length = info.array_length(),
            references = info.references(),
            depth = info.depth(),
            stream_bytes = info.stream_bytes(),
            error,
            "serial filter check"
        );
    } else {
        tracing::trace!(
            %session,
            status,
            class,
            array_length = info.array_length(),
            references = info.references(),
            depth = info.depth(),
            stream_bytes = info.stream_bytes(),
            "serial filter check"
        );
    }
}

impl fmt::Debug for FilterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSession")
            .field("id", &self.id)
            .field("factory", &self.factory.name())
            .field("filter", &self.filter.as_ref().map(|f| f.to_string()))
            .field("stream_filter_set", &self.stream_filter_set)
            .field("tracker", &self.tracker)
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}
