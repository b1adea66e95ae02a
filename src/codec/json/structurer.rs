//! JSON tree to schema'd value.

use serde_json::{Map, Value};

use super::{figure_out_array_type, json_kind};
use crate::codec::Structurer;
use crate::schema::{Field, FieldMut, Record, ScalarMut, Sequence};
use crate::util::{Buffer, DecodeOptions, Error, Number, Result};

/// How a JSON array lands in a resizable destination.
///
/// Capabilities are checked in [`ArrayStrategy::RANKED`] order and the
/// first one the destination supports wins. Fixed-extent destinations
/// (tuples, vectors, matrices) are not ranked; they take arrays of
/// exactly their arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayStrategy {
    /// Resize to the element count, then copy numbers straight into
    /// contiguous scalar storage.
    ResizeBulkCopy,
    /// Narrow the values to one element type, reshape a runtime-typed
    /// buffer and copy.
    ReshapeNumeric,
    /// Resize to the element count, then decode each element recursively.
    ResizeIterate,
}

impl ArrayStrategy {
    /// Every strategy, best first.
    pub const RANKED: [ArrayStrategy; 3] = [
        ArrayStrategy::ResizeBulkCopy,
        ArrayStrategy::ReshapeNumeric,
        ArrayStrategy::ResizeIterate,
    ];

    /// Returns true if `dst` supports this strategy.
    pub fn applies(self, dst: &FieldMut<'_>) -> bool {
        match (self, dst) {
            (Self::ResizeBulkCopy, FieldMut::Sequence(seq)) => seq.scalars().is_some(),
            (Self::ReshapeNumeric, FieldMut::Buffer(_)) => true,
            (Self::ResizeIterate, FieldMut::Sequence(_)) => true,
            _ => false,
        }
    }

    /// Best strategy `dst` supports.
    pub fn select(dst: &FieldMut<'_>) -> Option<Self> {
        Self::RANKED.into_iter().find(|s| s.applies(dst))
    }
}

/// Decodes a parsed JSON value into any schema'd type.
///
/// Object keys missing from the destination schema are skipped, so newer
/// producers can add fields without breaking older readers. Enums only
/// accept their string keys, `null` clears optionals.
#[derive(Clone, Copy, Debug)]
pub struct JsonStructurer<'a> {
    root: &'a Value,
    options: DecodeOptions,
}

impl<'a> JsonStructurer<'a> {
    /// Create a structurer over `root`.
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            options: DecodeOptions::default(),
        }
    }

    /// Use custom decode limits.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    fn value(&self, value: &Value, dst: &mut dyn Field, depth: usize) -> Result<()> {
        self.options.check_depth(depth)?;
        match (dst.view_mut(), value) {
            (FieldMut::Optional(opt), value) => {
                if value.is_null() {
                    opt.clear();
                    Ok(())
                } else {
                    self.value(value, opt.insert_default(), depth + 1)
                }
            }
            (shape, Value::Array(items)) => self.array(items, shape, depth),
            (FieldMut::Enum(e), Value::String(key)) => e.set_key(key),
            (FieldMut::Record(record), Value::Object(map)) => self.object(map, record, depth),
            (FieldMut::Scalar(leaf), value) => scalar(value, leaf),
            (shape, other) => Err(Error::mismatch(shape.kind(), json_kind(other))),
        }
    }

    fn object(&self, map: &Map<String, Value>, record: &mut dyn Record, depth: usize) -> Result<()> {
        for (key, value) in map {
            match record.find(key) {
                Some(index) => self.value(value, record.field_mut(index), depth + 1)?,
                None => tracing::trace!(record = record.record_name(), key = %key, "skipping unknown key"),
            }
        }
        Ok(())
    }

    fn array(&self, items: &[Value], dst: FieldMut<'_>, depth: usize) -> Result<()> {
        if let FieldMut::Tuple(tuple) = dst {
            if items.len() != tuple.arity() {
                return Err(Error::ExtentMismatch {
                    expected: tuple.arity(),
                    actual: items.len(),
                });
            }
            for (i, item) in items.iter().enumerate() {
                self.value(item, tuple.element_mut(i), depth + 1)?;
            }
            return Ok(());
        }

        self.options.check_count(items.len())?;
        match (ArrayStrategy::select(&dst), dst) {
            (Some(ArrayStrategy::ResizeBulkCopy), FieldMut::Sequence(seq)) => bulk_copy(items, seq),
            (Some(ArrayStrategy::ReshapeNumeric), FieldMut::Buffer(buf)) => reshape_numeric(items, buf),
            (Some(ArrayStrategy::ResizeIterate), FieldMut::Sequence(seq)) => {
                seq.resize(items.len());
                for (i, item) in items.iter().enumerate() {
                    self.value(item, seq.element_mut(i), depth + 1)?;
                }
                Ok(())
            }
            (_, dst) => Err(Error::NoArrayStrategy { destination: dst.kind() }),
        }
    }
}

impl JsonStructurer<'_> {
    /// Decode in place; fields read before a failure stay written.
    fn decode(self, target: &mut dyn Field) -> Result<()> {
        self.value(self.root, target, 0)
    }
}

impl Structurer for JsonStructurer<'_> {
    fn read_value<T: Field + Default>(self) -> Result<T> {
        let mut value = T::default();
        self.decode(&mut value)?;
        Ok(value)
    }
}

fn scalar(value: &Value, mut leaf: ScalarMut<'_>) -> Result<()> {
    match value {
        Value::Bool(b) => leaf.set_bool(*b),
        Value::Number(n) => leaf.set_number(Number::from(n)),
        Value::String(s) => leaf.set_str(s),
        other => Err(Error::mismatch(leaf.kind(), json_kind(other))),
    }
}

fn number(value: &Value) -> Result<Number> {
    match value {
        Value::Number(n) => Ok(Number::from(n)),
        other => Err(Error::mismatch("number", json_kind(other))),
    }
}

fn bulk_copy(items: &[Value], seq: &mut dyn Sequence) -> Result<()> {
    seq.resize(items.len());
    let Some(mut storage) = seq.scalars_mut() else {
        return Err(Error::NoArrayStrategy { destination: "sequence" });
    };
    for (i, item) in items.iter().enumerate() {
        storage.set(i, number(item)?)?;
    }
    Ok(())
}

fn reshape_numeric(items: &[Value], buf: &mut Buffer) -> Result<()> {
    let value_type = figure_out_array_type(items)?;
    buf.reshape_dyn(value_type, items.len())?;
    let mut storage = buf.scalars_mut();
    for (i, item) in items.iter().enumerate() {
        storage.set(i, number(item)?)?;
    }
    Ok(())
}
