//! Input records and record loading.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::LoadError;

/// Metadata for one stored file or object, as returned by a listing service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Slash-separated path, unique within a batch.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,

    /// Display name, usually the last path segment.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// MIME-like content type, if the listing provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRecord {
    /// Create a record with a path and a name.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            content_type: None,
            extra: Map::new(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Name to display, falling back to the last path segment.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

/// Listings sometimes send `null` for a missing path or name.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read records from a JSON array or a stream of JSON objects.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<FileRecord>, LoadError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| LoadError::io("<input>", e))?;
    parse_records(&input)
}

/// Load records from a file.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<FileRecord>, LoadError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_records(&input)
}

/// Parse records from a string.
///
/// A document starting with `[` is a single array; one starting with `{` is a
/// stream of objects (newline-delimited or not). Blank input is no records.
pub fn parse_records(input: &str) -> Result<Vec<FileRecord>, LoadError> {
    let trimmed = input.trim_start();

    match trimmed.chars().next() {
        None => Ok(Vec::new()),
        Some('[') => serde_json::from_str(input).map_err(|source| LoadError::Parse {
            line: source.line(),
            source,
        }),
        Some('{') => serde_json::Deserializer::from_str(input)
            .into_iter::<FileRecord>()
            .map(|record| {
                record.map_err(|source| LoadError::Parse {
                    line: source.line(),
                    source,
                })
            })
            .collect(),
        Some(_) => {
            let value: Value = serde_json::from_str(input).map_err(|source| LoadError::Parse {
                line: source.line(),
                source,
            })?;
            Err(LoadError::NotAnArray {
                found: json_kind(&value),
            })
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
