//! Positional binary encoding in schema declaration order.
//!
//! Native byte order, no padding, no keys:
//!
//! | shape    | encoding                                        |
//! |----------|-------------------------------------------------|
//! | bool     | `u8` 0 or 1                                     |
//! | number   | its native-endian bytes                         |
//! | string   | `u16` byte length, UTF-8 bytes                  |
//! | enum     | `u16` position in the value table               |
//! | record   | fields in declaration order                     |
//! | tuple    | elements in order                               |
//! | sequence | `u32` count, elements                           |
//! | buffer   | `u8` element type tag, `u32` count, raw bytes   |
//! | optional | `u8` presence flag, value if present            |

use byteorder::{NativeEndian, WriteBytesExt};

use super::{Serializer, Structurer};
use crate::schema::{Field, FieldMut, FieldRef, ScalarMut, ScalarRef, Sequence};
use crate::util::{Buffer, Content, Cursor, DecodeOptions, Error, Result, ScalarType};

/// Encodes a value as positional binary.
#[derive(Debug, Default)]
pub struct BinarySerializer {
    out: Vec<u8>,
}

impl BinarySerializer {
    /// Create a serializer.
    pub fn new() -> Self {
        Self::default()
    }

    fn value(&mut self, field: &dyn Field) -> Result<()> {
        match field.view() {
            FieldRef::Scalar(leaf) => self.scalar(leaf)?,
            FieldRef::Enum(e) => {
                let ordinal = e.ordinal().ok_or_else(|| Error::UnknownEnumKey {
                    enum_name: e.enum_name(),
                    key: "<unlisted variant>".to_string(),
                })?;
                self.out.write_u16::<NativeEndian>(narrow_count(ordinal, "enum ordinal")?)?;
            }
            FieldRef::Record(record) => {
                for i in 0..record.field_count() {
                    self.value(record.field(i))?;
                }
            }
            FieldRef::Tuple(tuple) => {
                for i in 0..tuple.arity() {
                    self.value(tuple.element(i))?;
                }
            }
            FieldRef::Sequence(seq) => {
                self.out.write_u32::<NativeEndian>(narrow_count(seq.len(), "sequence length")?)?;
                match seq.scalars() {
                    Some(numbers) => self.out.extend_from_slice(numbers.as_bytes()),
                    None => {
                        for i in 0..seq.len() {
                            self.value(seq.element(i))?;
                        }
                    }
                }
            }
            FieldRef::Buffer(buf) => {
                self.out.write_u8(buf.value_type() as u8)?;
                self.out.write_u32::<NativeEndian>(narrow_count(buf.len(), "buffer length")?)?;
                self.out.extend_from_slice(buf.as_bytes());
            }
            FieldRef::Optional(opt) => match opt.get() {
                Some(inner) => {
                    self.out.write_u8(1)?;
                    self.value(inner)?;
                }
                None => self.out.write_u8(0)?,
            },
        }
        Ok(())
    }

    fn scalar(&mut self, leaf: ScalarRef<'_>) -> Result<()> {
        let out = &mut self.out;
        match leaf {
            ScalarRef::Bool(v) => out.write_u8(v as u8)?,
            ScalarRef::Int8(v) => out.write_i8(v)?,
            ScalarRef::Uint8(v) => out.write_u8(v)?,
            ScalarRef::Int16(v) => out.write_i16::<NativeEndian>(v)?,
            ScalarRef::Uint16(v) => out.write_u16::<NativeEndian>(v)?,
            ScalarRef::Int32(v) => out.write_i32::<NativeEndian>(v)?,
            ScalarRef::Uint32(v) => out.write_u32::<NativeEndian>(v)?,
            ScalarRef::Int64(v) => out.write_i64::<NativeEndian>(v)?,
            ScalarRef::Uint64(v) => out.write_u64::<NativeEndian>(v)?,
            ScalarRef::Float32(v) => out.write_f32::<NativeEndian>(v)?,
            ScalarRef::Float64(v) => out.write_f64::<NativeEndian>(v)?,
            ScalarRef::Str(s) => {
                out.write_u16::<NativeEndian>(narrow_count(s.len(), "string length")?)?;
                out.extend_from_slice(s.as_bytes());
            }
        }
        Ok(())
    }
}

impl Serializer for BinarySerializer {
    type Output = Vec<u8>;

    fn write(mut self, source: &dyn Field) -> Result<Vec<u8>> {
        self.value(source)?;
        Ok(self.out)
    }
}

fn narrow_count<T: TryFrom<usize>>(n: usize, what: &str) -> Result<T> {
    T::try_from(n).map_err(|_| Error::unsupported("binary", format!("{} {} too large", what, n)))
}

/// Decodes positional binary into a schema'd value.
///
/// The whole input must be consumed; trailing bytes are an error.
#[derive(Debug)]
pub struct BinaryStructurer<'a> {
    data: &'a [u8],
    cursor: Cursor,
    options: DecodeOptions,
}

impl<'a> BinaryStructurer<'a> {
    /// Create a structurer over raw bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: Cursor::new(),
            options: DecodeOptions::default(),
        }
    }

    /// Use custom decode limits.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    fn value(&mut self, field: &mut dyn Field, depth: usize) -> Result<()> {
        self.options.check_depth(depth)?;
        let data = self.data;
        match field.view_mut() {
            FieldMut::Scalar(leaf) => self.scalar(leaf)?,
            FieldMut::Enum(e) => {
                let ordinal = self.cursor.read_u16(data)?;
                e.set_ordinal(ordinal as usize)?;
            }
            FieldMut::Record(record) => {
                for i in 0..record.field_count() {
                    self.value(record.field_mut(i), depth + 1)?;
                }
            }
            FieldMut::Tuple(tuple) => {
                for i in 0..tuple.arity() {
                    self.value(tuple.element_mut(i), depth + 1)?;
                }
            }
            FieldMut::Sequence(seq) => self.sequence(seq, depth)?,
            FieldMut::Buffer(buf) => self.buffer(buf)?,
            FieldMut::Optional(opt) => match self.cursor.read_u8(data)? {
                0 => opt.clear(),
                1 => self.value(opt.insert_default(), depth + 1)?,
                flag => return Err(Error::invalid(format!("presence flag {}", flag))),
            },
        }
        Ok(())
    }

    fn scalar(&mut self, leaf: ScalarMut<'_>) -> Result<()> {
        let (data, c) = (self.data, &mut self.cursor);
        match leaf {
            ScalarMut::Bool(v) => {
                *v = match c.read_u8(data)? {
                    0 => false,
                    1 => true,
                    b => return Err(Error::invalid(format!("bool byte {}", b))),
                }
            }
            ScalarMut::Int8(v) => *v = c.read_scalar(data)?,
            ScalarMut::Uint8(v) => *v = c.read_scalar(data)?,
            ScalarMut::Int16(v) => *v = c.read_scalar(data)?,
            ScalarMut::Uint16(v) => *v = c.read_scalar(data)?,
            ScalarMut::Int32(v) => *v = c.read_scalar(data)?,
            ScalarMut::Uint32(v) => *v = c.read_scalar(data)?,
            ScalarMut::Int64(v) => *v = c.read_scalar(data)?,
            ScalarMut::Uint64(v) => *v = c.read_scalar(data)?,
            ScalarMut::Float32(v) => *v = c.read_scalar(data)?,
            ScalarMut::Float64(v) => *v = c.read_scalar(data)?,
            ScalarMut::Str(s) => *s = c.read_string16(data)?,
        }
        Ok(())
    }

    fn sequence(&mut self, seq: &mut dyn Sequence, depth: usize) -> Result<()> {
        let count = self.cursor.read_u32(self.data)? as usize;
        self.options.check_count(count)?;

        if let Some(element_size) = seq.scalars().map(|s| s.scalar_type().num_bytes()) {
            let bytes = self.cursor.take(self.data, count * element_size)?;
            seq.resize(count);
            if let Some(mut storage) = seq.scalars_mut() {
                storage.as_bytes_mut().copy_from_slice(bytes);
            }
            return Ok(());
        }

        // Grow one element at a time so a bogus count fails on truncated
        // input before allocating for it.
        seq.resize(0);
        for i in 0..count {
            seq.resize(i + 1);
            self.value(seq.element_mut(i), depth + 1)?;
        }
        Ok(())
    }

    fn buffer(&mut self, buf: &mut Buffer) -> Result<()> {
        let tag = self.cursor.read_u8(self.data)?;
        let value_type =
            ScalarType::from_u8(tag).ok_or_else(|| Error::invalid(format!("unknown element type tag {}", tag)))?;
        let count = self.cursor.read_u32(self.data)? as usize;
        self.options.check_count(count)?;
        let bytes = self.cursor.take(self.data, count * value_type.num_bytes())?;
        buf.reshape_dyn(value_type, count)?;
        buf.as_bytes_mut().copy_from_slice(bytes);
        Ok(())
    }
}

impl BinaryStructurer<'_> {
    /// Decode in place; fields read before a failure stay written.
    fn decode(mut self, target: &mut dyn Field) -> Result<()> {
        self.value(target, 0)?;
        if !self.cursor.is_at_end(self.data) {
            return Err(Error::invalid(format!(
                "{} trailing bytes at offset {}",
                self.cursor.remaining(self.data),
                self.cursor.pos()
            )));
        }
        Ok(())
    }
}

impl Structurer for BinaryStructurer<'_> {
    fn read_value<T: Field + Default>(self) -> Result<T> {
        let mut value = T::default();
        self.decode(&mut value)?;
        Ok(value)
    }
}

/// Encode a value as positional binary.
pub fn to_bytes(source: &dyn Field) -> Result<Vec<u8>> {
    BinarySerializer::new().write(source)
}

/// Decode positional binary into a fresh value.
pub fn from_bytes<T: Field + Default>(data: &[u8]) -> Result<T> {
    BinaryStructurer::new(data).read_value()
}

/// Decode a content blob, naming it in any error.
pub fn from_content<T: Field + Default>(content: &Content) -> Result<T> {
    from_bytes(content.data()).map_err(|e| {
        tracing::warn!(path = %content.path().display(), error = %e, "binary decode failed");
        e.in_content(content.path())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enum_schema, schema};
    use glam::{Mat4, Quat};

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    enum Kind {
        #[default]
        Static,
        Dynamic,
    }

    enum_schema!(Kind { Static => "static", Dynamic => "dynamic" });

    #[derive(Debug, Default, PartialEq)]
    struct Node {
        name: String,
        kind: Kind,
        transform: Mat4,
        rotation: Option<Quat>,
        lods: Vec<u32>,
        children: Vec<Node>,
        blob: Buffer,
        enabled: bool,
    }

    schema!(Node { name, kind, transform, rotation, lods, children, blob, enabled });

    fn sample() -> Node {
        Node {
            name: "root".into(),
            kind: Kind::Dynamic,
            transform: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)),
            rotation: Some(Quat::from_rotation_y(0.5)),
            lods: vec![0, 4, 16],
            children: vec![Node {
                name: "leaf".into(),
                ..Default::default()
            }],
            blob: Buffer::from_slice(&[-1i16, 7]),
            enabled: true,
        }
    }

    #[test]
    fn test_round_trip() {
        let n = sample();
        let bytes = to_bytes(&n).unwrap();
        assert_eq!(from_bytes::<Node>(&bytes).unwrap(), n);
    }

    #[test]
    fn test_layout_prefix() {
        let bytes = to_bytes(&sample()).unwrap();
        assert_eq!(&bytes[..2], &4u16.to_ne_bytes());
        assert_eq!(&bytes[2..6], b"root");
        assert_eq!(&bytes[6..8], &1u16.to_ne_bytes());
        assert_eq!(&bytes[8..12], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn test_truncation_reports_offset() {
        let bytes = to_bytes(&sample()).unwrap();
        let err = from_bytes::<Node>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_failed_read_leaves_target() {
        let mut other = Node {
            name: "other".into(),
            ..Default::default()
        };
        let bytes = to_bytes(&sample()).unwrap();
        let err = BinaryStructurer::new(&bytes[..bytes.len() - 1])
            .read(&mut other)
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
        assert_eq!(other.name, "other");
        assert!(other.lods.is_empty());

        BinaryStructurer::new(&bytes).read(&mut other).unwrap();
        assert_eq!(other, sample());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = to_bytes(&7u32).unwrap();
        bytes.push(0);
        assert!(matches!(from_bytes::<u32>(&bytes), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_bad_enum_ordinal() {
        let bytes = 9u16.to_ne_bytes();
        assert!(matches!(from_bytes::<Kind>(&bytes), Err(Error::UnknownEnumKey { .. })));
    }

    #[test]
    fn test_huge_count_fails_before_allocating() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(1u32 << 20).to_ne_bytes());
        let err = from_bytes::<Vec<u64>>(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_content_errors_name_path() {
        let content = Content::new("level.bin", vec![1u8]);
        let err = from_content::<u32>(&content).unwrap_err();
        assert!(matches!(err, Error::InContent { .. }));
        assert_eq!(err.offset(), Some(0));
    }
}
