use std::io::BufRead;

use super::StreamError;
use super::graph::{NodeId, ObjectGraph, Value};
use super::record::{Record, STREAM_VERSION};
use crate::filter::FilterRef;
use crate::session::{FilterSession, SessionError};
use crate::types::ClassResolver;

/// Default ceiling on nested objects and arrays, independent of any
/// `maxdepth` filter limit.
pub const MAX_NESTING: u64 = 1024;

/// Rebuilds an [`ObjectGraph`] from JSON lines, consulting a
/// [`FilterSession`] at every decision point.
///
/// Every object, array, string, null and back-reference read enters one
/// level of depth and counts as one reference. Objects are checked by
/// class, arrays by class and length, back-references by limits only.
/// Integers are read without a check.
///
/// Nested values are read recursively, one pair of stack frames per level.
/// Nesting past [`MAX_NESTING`] (or the ceiling set with
/// [`with_max_nesting`](Self::with_max_nesting)) fails the stream as
/// corrupted whether or not a filter limits depth.
pub struct ObjectReader<R, C> {
    input: R,
    resolver: C,
    session: FilterSession,
    handles: Vec<NodeId>,
    graph: ObjectGraph,
    line: String,
    max_nesting: u64,
}

impl<R: BufRead, C: ClassResolver> ObjectReader<R, C> {
    pub fn new(input: R, resolver: C, session: FilterSession) -> Self {
        Self {
            input,
            resolver,
            session,
            handles: Vec::new(),
            graph: ObjectGraph::new(),
            line: String::new(),
            max_nesting: MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: u64) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    /// Attach the stream-specific filter; see [`FilterSession::set_filter`].
    pub fn set_filter(&mut self, filter: Option<FilterRef>) -> Result<(), SessionError> {
        self.session.set_filter(filter)
    }

    /// Read the header and the root value.
    pub fn read_graph(mut self) -> Result<ObjectGraph, StreamError> {
        match self.next_record()? {
            Record::Header { version } if version == STREAM_VERSION => {}
            Record::Header { version } => {
                return Err(StreamError::Corrupted(format!(
                    "unsupported stream version {version}"
                )));
            }
            other => {
                return Err(StreamError::Corrupted(format!(
                    "expected header, found {other:?}"
                )));
            }
        }
        let root = self.read_value()?;
        self.graph.set_root(root);
        Ok(self.graph)
    }

    fn next_record(&mut self) -> Result<Record, StreamError> {
        self.line.clear();
        let read = self.input.read_line(&mut self.line)?;
        if read == 0 {
            return Err(StreamError::Corrupted("unexpected end of stream".into()));
        }
        self.session.consume_bytes(read as u64)?;
        Ok(serde_json::from_str(self.line.trim_end())?)
    }

    fn read_value(&mut self) -> Result<Value, StreamError> {
        let record = self.next_record()?;
        if let Record::Int { value } = record {
            return Ok(Value::Int(value));
        }
        if self.session.tracker().depth() >= self.max_nesting {
            return Err(StreamError::Corrupted(format!(
                "nesting exceeds {} levels",
                self.max_nesting
            )));
        }

        self.session.enter_object()?;
        let value = self.read_reference(record)?;
        self.session.leave_object();
        Ok(value)
    }

    fn read_reference(&mut self, record: Record) -> Result<Value, StreamError> {
        match record {
            Record::Null => Ok(Value::Null),
            Record::Int { value } => Ok(Value::Int(value)),
            Record::BackRef { handle } => {
                self.session.check_limits()?;
                let id = usize::try_from(handle)
                    .ok()
                    .and_then(|h| self.handles.get(h))
                    .copied()
                    .ok_or_else(|| StreamError::Corrupted(format!("invalid handle {handle}")))?;
                Ok(Value::Ref(id))
            }
            Record::String { value } => {
                let id = self.graph.add_string(value);
                self.handles.push(id);
                Ok(Value::Ref(id))
            }
            Record::Object { class, fields } => {
                let resolved = self
                    .resolver
                    .resolve(&class)
                    .ok_or_else(|| StreamError::ClassNotFound(class.clone()))?;
                if resolved.is_array() {
                    return Err(StreamError::Corrupted(format!(
                        "object record with array class {class}"
                    )));
                }
                self.session.check_class(&resolved)?;

                let id = self.graph.add_object(class);
                self.handles.push(id);
                for name in fields {
                    let value = self.read_value()?;
                    self.graph.set_field(id, name, value);
                }
                Ok(Value::Ref(id))
            }
            Record::Array { class, length } => {
                let resolved = self
                    .resolver
                    .resolve(&class)
                    .ok_or_else(|| StreamError::ClassNotFound(class.clone()))?;
                if !resolved.is_array() {
                    return Err(StreamError::Corrupted(format!(
                        "array record with non-array class {class}"
                    )));
                }
                self.session.check_array(&resolved, length)?;

                let id = self.graph.add_array(class, Vec::new());
                self.handles.push(id);
                for _ in 0..length {
                    let value = self.read_value()?;
                    self.graph.push_element(id, value);
                }
                Ok(Value::Ref(id))
            }
            Record::Header { .. } => Err(StreamError::Corrupted("unexpected header".into())),
        }
    }
}
