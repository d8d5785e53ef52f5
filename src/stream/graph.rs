//! Arena-backed object graphs, cycles allowed.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A field value or array element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Value {
    Null,
    Int(i64),
    Ref(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Node {
    Object {
        class: String,
        fields: Vec<(String, Value)>,
    },
    /// `class` is the array descriptor, e.g. `[I` or `[Ljava.lang.String;`.
    Array { class: String, elements: Vec<Value> },
    String(String),
}

impl Node {
    pub fn class_name(&self) -> &str {
        match self {
            Node::Object { class, .. } | Node::Array { class, .. } => class,
            Node::String(_) => "java.lang.String",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObjectGraph {
    nodes: Vec<Node>,
    root: Option<Value>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, class: impl Into<String>) -> NodeId {
        self.push(Node::Object {
            class: class.into(),
            fields: Vec::new(),
        })
    }

    pub fn add_array(&mut self, class: impl Into<String>, elements: Vec<Value>) -> NodeId {
        self.push(Node::Array {
            class: class.into(),
            elements,
        })
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> NodeId {
        self.push(Node::String(value.into()))
    }

    /// Append a field to an object node. Ignored for other node kinds.
    pub fn set_field(&mut self, object: NodeId, name: impl Into<String>, value: Value) {
        if let Some(Node::Object { fields, .. }) = self.nodes.get_mut(object.0) {
            fields.push((name.into(), value));
        }
    }

    pub fn push_element(&mut self, array: NodeId, value: Value) {
        if let Some(Node::Array { elements, .. }) = self.nodes.get_mut(array.0) {
            elements.push(value);
        }
    }

    pub fn set_root(&mut self, root: Value) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<Value> {
        self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        match self.root? {
            Value::Ref(id) => self.node(id),
            _ => None,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn field(&self, object: NodeId, name: &str) -> Option<Value> {
        match self.node(object)? {
            Node::Object { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| *value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nesting depth of the deepest path from the root, counting each
    /// visited node once so cycles terminate.
    pub fn depth(&self) -> usize {
        fn walk(graph: &ObjectGraph, value: Value, seen: &mut Vec<bool>) -> usize {
            let Value::Ref(id) = value else {
                return 0;
            };
            if seen.get(id.0).copied().unwrap_or(true) {
                return 1;
            }
            seen[id.0] = true;
            let children: Vec<Value> = match &graph.nodes[id.0] {
                Node::Object { fields, .. } => fields.iter().map(|(_, v)| *v).collect(),
                Node::Array { elements, .. } => elements.clone(),
                Node::String(_) => Vec::new(),
            };
            let deepest = children
                .into_iter()
                .map(|child| walk(graph, child, seen))
                .max()
                .unwrap_or(0);
            seen[id.0] = false;
            1 + deepest
        }

        let mut seen = vec![false; self.nodes.len()];
        self.root.map_or(0, |root| walk(self, root, &mut seen))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
