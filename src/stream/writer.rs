use std::collections::HashMap;
use std::io::Write;

use super::StreamError;
use super::graph::{Node, NodeId, ObjectGraph, Value};
use super::record::{Record, STREAM_VERSION};

/// Writes an [`ObjectGraph`] as JSON lines.
///
/// Nodes get a handle in the order they are first written; any later
/// occurrence, including a cycle back to an ancestor, is written as a
/// back-reference to that handle.
pub struct ObjectWriter<W: Write> {
    out: W,
    handles: HashMap<NodeId, u64>,
    records: u64,
}

impl<W: Write> ObjectWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            handles: HashMap::new(),
            records: 0,
        }
    }

    pub fn write_graph(&mut self, graph: &ObjectGraph) -> Result<(), StreamError> {
        self.handles.clear();
        self.emit(&Record::Header {
            version: STREAM_VERSION,
        })?;
        let root = graph
            .root()
            .ok_or_else(|| StreamError::Corrupted("graph has no root".into()))?;
        self.write_value(graph, root)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_value(&mut self, graph: &ObjectGraph, value: Value) -> Result<(), StreamError> {
        match value {
            Value::Null => self.emit(&Record::Null),
            Value::Int(value) => self.emit(&Record::Int { value }),
            Value::Ref(id) => self.write_node(graph, id),
        }
    }

    fn write_node(&mut self, graph: &ObjectGraph, id: NodeId) -> Result<(), StreamError> {
        if let Some(&handle) = self.handles.get(&id) {
            return self.emit(&Record::BackRef { handle });
        }
        let node = graph
            .node(id)
            .ok_or_else(|| StreamError::Corrupted(format!("dangling node {}", id.index())))?;

        let handle = self.handles.len() as u64;
        self.handles.insert(id, handle);

        match node {
            Node::String(value) => self.emit(&Record::String {
                value: value.clone(),
            }),
            Node::Object { class, fields } => {
                self.emit(&Record::Object {
                    class: class.clone(),
                    fields: fields.iter().map(|(name, _)| name.clone()).collect(),
                })?;
                fields
                    .iter()
                    .try_for_each(|(_, value)| self.write_value(graph, *value))
            }
            Node::Array { class, elements } => {
                self.emit(&Record::Array {
                    class: class.clone(),
                    length: elements.len() as u64,
                })?;
                elements
                    .iter()
                    .try_for_each(|value| self.write_value(graph, *value))
            }
        }
    }

    fn emit(&mut self, record: &Record) -> Result<(), StreamError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }
}
