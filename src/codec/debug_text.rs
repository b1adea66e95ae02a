//! Bracketed text for replay logs and diagnostics.
//!
//! Records print as `{a, b}` in schema order, tuples as `(a, b)`,
//! sequences as `[a, b]` and buffers as `uint16_t[1, 2]` with their
//! element type in front. Strings are quoted, enums print their bare key,
//! an absent optional prints `null`. Whitespace between tokens is
//! insignificant, so [`DebugTextStructurer`] reads back everything
//! [`DebugTextSerializer`] writes.

use std::fmt::Write as _;

use smallvec::SmallVec;

use super::{escape_str, Serializer, Structurer};
use crate::schema::{enum_key, Field, FieldMut, FieldRef, ScalarMut, ScalarRef};
use crate::util::{Buffer, DecodeOptions, Error, Number, Result, ScalarType};

/// Closing brackets of the containers currently open.
type BracketStack = SmallVec<[u8; 16]>;

fn closer(open: u8) -> u8 {
    match open {
        b'{' => b'}',
        b'(' => b')',
        _ => b']',
    }
}

/// Encodes a value as debug text.
#[derive(Debug, Default)]
pub struct DebugTextSerializer {
    out: String,
    stack: BracketStack,
}

impl DebugTextSerializer {
    /// Create a serializer.
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self, bracket: u8) {
        self.out.push(bracket as char);
        self.stack.push(closer(bracket));
    }

    fn close(&mut self) {
        if let Some(bracket) = self.stack.pop() {
            self.out.push(bracket as char);
        }
    }

    fn value(&mut self, field: &dyn Field) -> Result<()> {
        match field.view() {
            FieldRef::Scalar(ScalarRef::Str(s)) => escape_str(s, |piece| self.out.push_str(piece)),
            FieldRef::Scalar(leaf) => {
                let _ = write!(self.out, "{}", leaf);
            }
            FieldRef::Enum(e) => self.out.push_str(enum_key(e)?),
            FieldRef::Record(record) => {
                self.open(b'{');
                for i in 0..record.field_count() {
                    self.separator(i);
                    self.value(record.field(i))?;
                }
                self.close();
            }
            FieldRef::Tuple(tuple) => {
                self.open(b'(');
                for i in 0..tuple.arity() {
                    self.separator(i);
                    self.value(tuple.element(i))?;
                }
                self.close();
            }
            FieldRef::Sequence(seq) => {
                self.open(b'[');
                for i in 0..seq.len() {
                    self.separator(i);
                    self.value(seq.element(i))?;
                }
                self.close();
            }
            FieldRef::Buffer(buf) => {
                self.out.push_str(buf.value_type().name());
                self.open(b'[');
                let numbers = buf.scalars();
                for i in 0..numbers.len() {
                    self.separator(i);
                    let _ = numbers.write_element(i, &mut self.out);
                }
                self.close();
            }
            FieldRef::Optional(opt) => match opt.get() {
                Some(inner) => self.value(inner)?,
                None => self.out.push_str("null"),
            },
        }
        Ok(())
    }

    fn separator(&mut self, index: usize) {
        if index > 0 {
            self.out.push_str(", ");
        }
    }
}

impl Serializer for DebugTextSerializer {
    type Output = String;

    fn write(mut self, source: &dyn Field) -> Result<String> {
        self.value(source)?;
        debug_assert!(self.stack.is_empty());
        Ok(self.out)
    }
}

/// Decodes debug text into a schema'd value.
///
/// The destination schema drives the parse; brackets are checked against
/// a stack of the containers opened so far.
#[derive(Debug)]
pub struct DebugTextStructurer<'a> {
    text: &'a str,
    pos: usize,
    stack: BracketStack,
    options: DecodeOptions,
}

impl<'a> DebugTextStructurer<'a> {
    /// Create a structurer over `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            stack: BracketStack::new(),
            options: DecodeOptions::default(),
        }
    }

    /// Use custom decode limits.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    fn syntax(&self, message: impl Into<String>) -> Error {
        Error::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.text.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.syntax(format!("expected '{}', found '{}'", byte as char, b as char))),
            None => Err(self.syntax(format!("expected '{}', found end of text", byte as char))),
        }
    }

    fn open(&mut self, bracket: u8) -> Result<()> {
        self.expect(bracket)?;
        self.stack.push(closer(bracket));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let bracket = self
            .stack
            .pop()
            .ok_or_else(|| self.syntax("unbalanced closing bracket"))?;
        self.expect(bracket)
    }

    /// Consume a `,` between elements, or report that the container ends.
    fn more(&mut self) -> Result<bool> {
        match (self.peek(), self.stack.last().copied()) {
            (Some(b','), _) => {
                self.pos += 1;
                Ok(true)
            }
            (Some(b), Some(c)) if b == c => Ok(false),
            (found, _) => Err(self.syntax(format!(
                "expected ',' or closing bracket, found {}",
                found.map_or("end of text".to_string(), |b| format!("'{}'", b as char))
            ))),
        }
    }

    /// Bare token up to the next delimiter.
    fn token(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let text = self.text;
        let rest = &text[self.pos..];
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '{' | '}' | '(' | ')' | '[' | ']' | '"'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.syntax("expected a value"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn peek_token(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let token = self.token().ok();
        self.pos = start;
        token
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect(b'"')?;
        let bytes = self.text.as_bytes();
        let mut out = String::new();
        let mut start = self.pos;
        loop {
            match bytes.get(self.pos) {
                None => return Err(self.syntax("unterminated string")),
                Some(b'"') => {
                    out.push_str(&self.text[start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[start..self.pos]);
                    let escaped = match bytes.get(self.pos + 1) {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'b') => '\u{8}',
                        Some(b'f') => '\u{c}',
                        Some(b'u') => {
                            let hex = self
                                .text
                                .get(self.pos + 2..self.pos + 6)
                                .ok_or_else(|| self.syntax("truncated \\u escape"))?;
                            let c = u32::from_str_radix(hex, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| self.syntax(format!("bad \\u escape {:?}", hex)))?;
                            self.pos += 4;
                            c
                        }
                        _ => return Err(self.syntax("bad escape")),
                    };
                    out.push(escaped);
                    self.pos += 2;
                    start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn value(&mut self, field: &mut dyn Field, depth: usize) -> Result<()> {
        self.options.check_depth(depth)?;
        match field.view_mut() {
            FieldMut::Scalar(ScalarMut::Str(s)) => *s = self.quoted()?,
            FieldMut::Scalar(mut leaf) => {
                let token = self.token()?;
                leaf.parse_text(token)?;
            }
            FieldMut::Enum(e) => {
                let token = self.token()?;
                e.set_key(token)?;
            }
            FieldMut::Record(record) => {
                self.open(b'{')?;
                for i in 0..record.field_count() {
                    if i > 0 {
                        self.expect(b',')?;
                    }
                    self.value(record.field_mut(i), depth + 1)?;
                }
                self.close()?;
            }
            FieldMut::Tuple(tuple) => {
                self.open(b'(')?;
                for i in 0..tuple.arity() {
                    if i > 0 {
                        self.expect(b',')?;
                    }
                    self.value(tuple.element_mut(i), depth + 1)?;
                }
                self.close()?;
            }
            FieldMut::Sequence(seq) => {
                self.open(b'[')?;
                seq.resize(0);
                if self.peek() != Some(b']') {
                    loop {
                        let len = seq.len();
                        self.options.check_count(len + 1)?;
                        seq.resize(len + 1);
                        self.value(seq.element_mut(len), depth + 1)?;
                        if !self.more()? {
                            break;
                        }
                    }
                }
                self.close()?;
            }
            FieldMut::Buffer(buf) => self.buffer(buf)?,
            FieldMut::Optional(opt) => {
                if self.peek_token() == Some("null") {
                    self.token()?;
                    opt.clear();
                } else {
                    self.value(opt.insert_default(), depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn buffer(&mut self, buf: &mut Buffer) -> Result<()> {
        let name = self.token()?;
        let value_type = ScalarType::from_name(name)
            .ok_or_else(|| self.syntax(format!("unknown element type {:?}", name)))?;
        self.open(b'[')?;
        let mut numbers = Vec::new();
        if self.peek() != Some(b']') {
            loop {
                let token = self.token()?;
                let n = Number::parse(token).ok_or_else(|| self.syntax(format!("bad number {:?}", token)))?;
                numbers.push(n);
                self.options.check_count(numbers.len())?;
                if !self.more()? {
                    break;
                }
            }
        }
        self.close()?;

        buf.reshape_dyn(value_type, numbers.len())?;
        let mut storage = buf.scalars_mut();
        for (i, n) in numbers.into_iter().enumerate() {
            storage.set(i, n)?;
        }
        Ok(())
    }
}

impl DebugTextStructurer<'_> {
    /// Decode in place; fields read before a failure stay written.
    fn decode(mut self, target: &mut dyn Field) -> Result<()> {
        self.value(target, 0)?;
        if self.peek().is_some() {
            return Err(self.syntax("trailing characters"));
        }
        Ok(())
    }
}

impl Structurer for DebugTextStructurer<'_> {
    fn read_value<T: Field + Default>(self) -> Result<T> {
        let mut value = T::default();
        self.decode(&mut value)?;
        Ok(value)
    }
}

/// Encode a value as debug text.
pub fn to_string(source: &dyn Field) -> Result<String> {
    DebugTextSerializer::new().write(source)
}

/// Decode debug text into a fresh value.
pub fn from_str<T: Field + Default>(text: &str) -> Result<T> {
    DebugTextStructurer::new(text).read_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enum_schema, schema};
    use glam::Vec3;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    enum Team {
        #[default]
        Red,
        Blue,
    }

    enum_schema!(Team { Red => "red", Blue => "blue" });

    #[derive(Debug, Default, PartialEq)]
    struct Spawn {
        team: Team,
        at: Vec3,
        label: Option<String>,
    }

    schema!(Spawn { team, at, label });

    #[derive(Debug, Default, PartialEq)]
    struct Snapshot {
        tick: u64,
        paused: bool,
        spawns: Vec<Spawn>,
        heights: Buffer,
    }

    schema!(Snapshot { tick, paused, spawns, heights });

    fn sample() -> Snapshot {
        Snapshot {
            tick: 42,
            paused: false,
            spawns: vec![
                Spawn {
                    team: Team::Blue,
                    at: Vec3::new(1.0, -2.5, 0.0),
                    label: Some("gate \"A\"".into()),
                },
                Spawn::default(),
            ],
            heights: Buffer::from_slice(&[1u16, 2]),
        }
    }

    #[test]
    fn test_layout() {
        assert_eq!(
            to_string(&sample()).unwrap(),
            r#"{42, false, [{blue, (1, -2.5, 0), "gate \"A\""}, {red, (0, 0, 0), null}], uint16_t[1, 2]}"#
        );
    }

    #[test]
    fn test_round_trip() {
        let s = sample();
        let text = to_string(&s).unwrap();
        assert_eq!(from_str::<Snapshot>(&text).unwrap(), s);
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        #[derive(Debug, Default, PartialEq)]
        struct Normals {
            data: Buffer,
            values: Vec<f32>,
            single: f64,
        }
        schema!(Normals { data, values, single });

        let n = Normals {
            data: Buffer::from_slice(&[-0.0f32, 1.0]),
            values: vec![-0.0, 0.0],
            single: -0.0,
        };
        let text = to_string(&n).unwrap();
        assert_eq!(text, "{float32_t[-0, 1], [-0, 0], -0}");

        let back: Normals = from_str(&text).unwrap();
        assert_eq!(back.data.as_bytes(), n.data.as_bytes());
        assert!(back.values[0].is_sign_negative());
        assert!(back.values[1].is_sign_positive());
        assert!(back.single.is_sign_negative());
        assert_eq!(back, n);
    }

    #[test]
    fn test_failed_read_leaves_target() {
        let mut s = sample();
        let err = DebugTextStructurer::new("{7, true, [], uint16_t[1, 2]} extra")
            .read(&mut s)
            .unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
        assert_eq!(s, sample());
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let text = "{ 7 ,true,[ ] ,\n\tfloat32_t[ 0.5 ]\n}";
        let s: Snapshot = from_str(text).unwrap();
        assert_eq!(s.tick, 7);
        assert!(s.paused);
        assert!(s.spawns.is_empty());
        assert_eq!(s.heights.as_slice::<f32>().unwrap(), [0.5]);
    }

    #[test]
    fn test_mismatched_bracket() {
        let err = from_str::<Snapshot>("{1, true, [}, uint8_t[]}").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_trailing_characters() {
        let err = from_str::<Vec<u8>>("[1, 2] 3").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 7, .. }));
    }

    #[test]
    fn test_depth_limit() {
        let err = DebugTextStructurer::new("[[[1]]]")
            .with_options(DecodeOptions::default().with_max_depth(2))
            .read_value::<Vec<Vec<Vec<u8>>>>()
            .unwrap_err();
        assert!(matches!(err, Error::DepthLimit { limit: 2 }));
    }
}
