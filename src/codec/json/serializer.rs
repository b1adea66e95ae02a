//! Schema'd value to JSON text in a caller-provided buffer.

use std::fmt::{self, Write as _};

use crate::codec::{escape_str, Serializer};
use crate::schema::{enum_key, Field, FieldRef, Record, ScalarRef};
use crate::util::{Error, JsonOptions, Result, ScalarSlice};

/// Fixed output window that keeps counting past its end.
///
/// Bytes are copied only while they fit; `required` always advances, so a
/// failed write still reports the exact size the output needs.
struct Window<'a> {
    buf: &'a mut [u8],
    required: usize,
}

impl<'a> Window<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, required: 0 }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        let end = self.required + bytes.len();
        if end <= self.buf.len() {
            self.buf[self.required..end].copy_from_slice(bytes);
        }
        self.required = end;
    }

    fn finish(self) -> Result<usize> {
        if self.required > self.buf.len() {
            return Err(Error::BufferTooSmall {
                required: self.required,
                capacity: self.buf.len(),
            });
        }
        Ok(self.required)
    }
}

impl fmt::Write for Window<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes());
        Ok(())
    }
}

/// Encodes a schema'd value as JSON into a bounded byte buffer.
///
/// Records become objects with their schema keys, enums their string keys,
/// absent optionals are left out of their record. On success
/// [`Serializer::write`] returns the number of bytes used; when the buffer
/// is too small it fails with [`Error::BufferTooSmall`] carrying the exact
/// size required, and nothing is written past the buffer's end.
pub struct JsonSerializer<'a> {
    out: Window<'a>,
    options: JsonOptions,
}

impl<'a> JsonSerializer<'a> {
    /// Create a serializer writing into `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            out: Window::new(buf),
            options: JsonOptions::default(),
        }
    }

    /// Use custom layout options.
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    fn value(&mut self, field: &dyn Field, depth: usize) -> Result<()> {
        match field.view() {
            FieldRef::Scalar(leaf) => self.scalar(leaf),
            FieldRef::Enum(e) => {
                self.string(enum_key(e)?);
                Ok(())
            }
            FieldRef::Record(record) => self.record(record, depth),
            FieldRef::Tuple(tuple) => self.list(tuple.arity(), |i| tuple.element(i), depth),
            FieldRef::Sequence(seq) => match seq.scalars() {
                Some(numbers) => self.numbers(numbers),
                None => self.list(seq.len(), |i| seq.element(i), depth),
            },
            FieldRef::Buffer(buf) => self.numbers(buf.scalars()),
            FieldRef::Optional(opt) => match opt.get() {
                Some(inner) => self.value(inner, depth),
                None => {
                    self.out.put(b"null");
                    Ok(())
                }
            },
        }
    }

    fn scalar(&mut self, leaf: ScalarRef<'_>) -> Result<()> {
        match leaf {
            ScalarRef::Str(s) => self.string(s),
            ScalarRef::Float32(v) if !v.is_finite() => return Err(non_finite(v as f64)),
            ScalarRef::Float64(v) if !v.is_finite() => return Err(non_finite(v)),
            other => {
                let _ = write!(self.out, "{}", other);
            }
        }
        Ok(())
    }

    fn string(&mut self, s: &str) {
        escape_str(s, |piece| self.out.put(piece.as_bytes()));
    }

    fn record(&mut self, record: &dyn Record, depth: usize) -> Result<()> {
        let present: Vec<usize> = (0..record.field_count())
            .filter(|&i| !is_absent(record.field(i)))
            .collect();
        if present.is_empty() {
            self.out.put(b"{}");
            return Ok(());
        }

        self.out.put(b"{");
        for (n, &i) in present.iter().enumerate() {
            if n > 0 {
                self.out.put(b",");
            }
            self.newline(depth + 1);
            self.string(record.key(i));
            let colon: &[u8] = if self.options.pretty { b" : " } else { b":" };
            self.out.put(colon);
            self.value(record.field(i), depth + 1)?;
        }
        self.newline(depth);
        self.out.put(b"}");
        Ok(())
    }

    fn list<'f>(&mut self, len: usize, element: impl Fn(usize) -> &'f dyn Field, depth: usize) -> Result<()> {
        self.out.put(b"[");
        for i in 0..len {
            if i > 0 {
                self.separator();
            }
            self.value(element(i), depth)?;
        }
        self.out.put(b"]");
        Ok(())
    }

    fn numbers(&mut self, numbers: ScalarSlice<'_>) -> Result<()> {
        self.out.put(b"[");
        for i in 0..numbers.len() {
            if i > 0 {
                self.separator();
            }
            match numbers {
                ScalarSlice::Float32(s) if !s[i].is_finite() => return Err(non_finite(s[i] as f64)),
                ScalarSlice::Float64(s) if !s[i].is_finite() => return Err(non_finite(s[i])),
                _ => {
                    let _ = numbers.write_element(i, &mut self.out);
                }
            }
        }
        self.out.put(b"]");
        Ok(())
    }

    fn separator(&mut self) {
        let comma: &[u8] = if self.options.pretty { b", " } else { b"," };
        self.out.put(comma);
    }

    fn newline(&mut self, depth: usize) {
        if !self.options.pretty {
            return;
        }
        self.out.put(b"\n");
        let mut unit = [0u8; 4];
        let unit = self.options.indent.encode_utf8(&mut unit).as_bytes();
        for _ in 0..depth {
            self.out.put(unit);
        }
    }
}

impl Serializer for JsonSerializer<'_> {
    type Output = usize;

    fn write(mut self, source: &dyn Field) -> Result<usize> {
        self.value(source, 0)?;
        self.out.finish()
    }
}

fn is_absent(field: &dyn Field) -> bool {
    matches!(field.view(), FieldRef::Optional(opt) if opt.get().is_none())
}

fn non_finite(v: f64) -> Error {
    Error::unsupported("JSON", format!("non-finite number {}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Buffer;
    use crate::{enum_schema, schema};

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    enum Shape {
        #[default]
        Cube,
        Sphere,
    }

    enum_schema!(Shape { Cube => "cube", Sphere => "sphere" });

    #[derive(Debug, Default)]
    struct Collider {
        shape: Shape,
        radius: f32,
        layer: Option<u8>,
    }

    schema!(Collider { shape, radius, layer });

    #[derive(Debug, Default)]
    struct Body {
        name: String,
        mass: f64,
        colliders: Vec<Collider>,
        tags: Vec<u16>,
        offset: (i32, i32),
    }

    schema!(Body { name, mass, colliders, tags, offset });

    fn encode(field: &dyn Field) -> Result<String> {
        let mut buf = vec![0u8; 4096];
        let n = JsonSerializer::new(&mut buf).write(field)?;
        buf.truncate(n);
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_record_layout() {
        let c = Collider {
            shape: Shape::Sphere,
            radius: 0.5,
            layer: Some(3),
        };
        assert_eq!(
            encode(&c).unwrap(),
            "{\n\t\"shape\" : \"sphere\",\n\t\"radius\" : 0.5,\n\t\"layer\" : 3\n}"
        );
    }

    #[test]
    fn test_absent_optional_is_skipped() {
        let c = Collider::default();
        assert_eq!(encode(&c).unwrap(), "{\n\t\"shape\" : \"cube\",\n\t\"radius\" : 0\n}");
    }

    #[test]
    fn test_nested_indent_and_lists() {
        let b = Body {
            name: "crate".into(),
            mass: 2.5,
            colliders: vec![Collider::default()],
            tags: vec![1, 2],
            offset: (-1, 4),
        };
        let expected = "{\n\t\"name\" : \"crate\",\n\t\"mass\" : 2.5,\n\t\"colliders\" : [{\n\t\t\"shape\" : \"cube\",\n\t\t\"radius\" : 0\n\t}],\n\t\"tags\" : [1, 2],\n\t\"offset\" : [-1, 4]\n}";
        assert_eq!(encode(&b).unwrap(), expected);
    }

    #[test]
    fn test_compact_layout() {
        let c = Collider::default();
        let mut buf = [0u8; 64];
        let n = JsonSerializer::new(&mut buf)
            .with_options(JsonOptions { indent: ' ', pretty: false })
            .write(&c)
            .unwrap();
        assert_eq!(&buf[..n], br#"{"shape":"cube","radius":0}"#);
    }

    #[test]
    fn test_overflow_reports_required_size() {
        let c = Collider {
            shape: Shape::Sphere,
            radius: 0.5,
            layer: None,
        };
        let full = encode(&c).unwrap();
        assert_eq!(full.len(), 40);

        let mut storage = [0xAAu8; 64];
        let err = JsonSerializer::new(&mut storage[..10]).write(&c).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { required: 40, capacity: 10 }));
        assert_eq!(err.additional(), Some(30));
        assert!(storage[10..].iter().all(|&b| b == 0xAA));
        assert_eq!(&storage[..10], &full.as_bytes()[..10]);
    }

    #[test]
    fn test_exact_fit() {
        let c = Collider::default();
        let len = encode(&c).unwrap().len();
        let mut buf = vec![0u8; len];
        assert_eq!(JsonSerializer::new(&mut buf).write(&c).unwrap(), len);
    }

    #[test]
    fn test_buffer_and_strings() {
        let buf = Buffer::from_slice(&[1.5f32, -2.0]);
        assert_eq!(encode(&buf).unwrap(), "[1.5, -2]");
        assert_eq!(encode(&String::from("a\"b\n")).unwrap(), r#""a\"b\n""#);
        let none: Option<u8> = None;
        assert_eq!(encode(&none).unwrap(), "null");
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err = encode(&f32::NAN).unwrap_err();
        assert!(matches!(err, Error::Unsupported { format: "JSON", .. }));
        let err = encode(&vec![1.0f64, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }
}
