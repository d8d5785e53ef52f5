//! A small JSON-lines object stream used to drive filter sessions end to
//! end.
//!
//! ```rust
//! use serial_filter::config::{FilterProperties, SerialConfig};
//! use serial_filter::factory::FactoryRegistry;
//! use serial_filter::filter::create_filter;
//! use serial_filter::session::FilterSession;
//! use serial_filter::stream::{ObjectGraph, ObjectReader, ObjectWriter, Value};
//! use serial_filter::ClassRegistry;
//!
//! let mut graph = ObjectGraph::new();
//! let table = graph.add_object("java.util.Hashtable");
//! graph.set_field(table, "threshold", Value::Int(8));
//! graph.set_root(Value::Ref(table));
//!
//! let mut writer = ObjectWriter::new(Vec::new());
//! writer.write_graph(&graph).unwrap();
//! let bytes = writer.into_inner();
//!
//! let config = SerialConfig::new(FilterProperties::default(), FactoryRegistry::builtins());
//! let session = FilterSession::open(&config).unwrap();
//! let mut reader = ObjectReader::new(&bytes[..], ClassRegistry::allow_unregistered(), session);
//! reader.set_filter(create_filter("!java.util.Hashtable").unwrap()).unwrap();
//! assert!(reader.read_graph().unwrap_err().is_rejection());
//! ```

mod graph;
mod reader;
mod record;
mod writer;

pub use graph::{Node, NodeId, ObjectGraph, Value};
pub use reader::{MAX_NESTING, ObjectReader};
pub use record::{Record, STREAM_VERSION};
pub use writer::ObjectWriter;

use thiserror::Error;

use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stream corrupted: {0}")]
    Corrupted(String),

    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl StreamError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, StreamError::Session(e) if e.is_rejection())
    }
}
