//! JSON codec.
//!
//! Decoding runs over a parsed [`serde_json::Value`] tree
//! ([`JsonStructurer`]); encoding writes text straight into a
//! caller-provided byte buffer ([`JsonSerializer`]).

mod narrow;
mod serializer;
mod structurer;

pub use narrow::figure_out_array_type;
pub use serializer::JsonSerializer;
pub use structurer::{ArrayStrategy, JsonStructurer};

use serde_json::Value;

use super::{Serializer, Structurer};
use crate::schema::Field;
use crate::util::{Content, Error, JsonOptions, Result};

/// First buffer size tried by [`to_string`].
const INITIAL_CAPACITY: usize = 1024;

/// JSON type name of `value`, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a content blob as a JSON tree.
pub fn parse(content: &Content) -> Result<Value> {
    serde_json::from_slice(content.data()).map_err(|e| Error::from(e).in_content(content.path()))
}

/// Decode JSON text into a fresh value.
pub fn from_str<T: Field + Default>(text: &str) -> Result<T> {
    let tree: Value = serde_json::from_str(text)?;
    JsonStructurer::new(&tree).read_value()
}

/// Decode a JSON content blob into a fresh value.
pub fn from_content<T: Field + Default>(content: &Content) -> Result<T> {
    let tree = parse(content)?;
    JsonStructurer::new(&tree)
        .read_value()
        .map_err(|e| e.in_content(content.path()))
}

/// Encode into an owned string with the default layout.
pub fn to_string(source: &dyn Field) -> Result<String> {
    to_string_with(source, JsonOptions::default())
}

/// Encode into an owned string, growing the buffer once if the first
/// attempt reports it too small.
pub fn to_string_with(source: &dyn Field, options: JsonOptions) -> Result<String> {
    let mut buf = vec![0u8; INITIAL_CAPACITY];
    let used = match JsonSerializer::new(&mut buf).with_options(options).write(source) {
        Ok(used) => used,
        Err(Error::BufferTooSmall { required, .. }) => {
            tracing::trace!(required, "growing JSON output buffer");
            buf.resize(required, 0);
            JsonSerializer::new(&mut buf).with_options(options).write(source)?
        }
        Err(e) => return Err(e),
    };
    buf.truncate(used);
    Ok(String::from_utf8(buf)?)
}
