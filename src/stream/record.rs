use serde::{Deserialize, Serialize};

pub const STREAM_VERSION: u32 = 1;

/// One line of the stream. Objects and arrays are followed by their field
/// values or elements, each as its own record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Record {
    Header { version: u32 },
    Object { class: String, fields: Vec<String> },
    Array { class: String, length: u64 },
    String { value: String },
    Int { value: i64 },
    Null,
    #[serde(rename = "ref")]
    BackRef { handle: u64 },
}
