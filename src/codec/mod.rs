//! Schema-walking codecs.
//!
//! A codec is a single-use visitor bound to one input (a byte range, a
//! parsed JSON tree, a text) or one output. Construct it, call
//! [`Structurer::read`] or [`Serializer::write`] once, discard it.
//!
//! - [`json`] - JSON tree decoder and bounded-buffer JSON encoder
//! - [`ini`] - `key=value` settings with one level of sections
//! - [`debug_text`] - bracketed round-trip text for replay logs
//! - [`binary`] - positional native-endian binary in declaration order

pub mod binary;
pub mod debug_text;
pub mod ini;
pub mod json;

use crate::schema::Field;
use crate::util::Result;

/// Decoder from an external representation into a schema'd value.
///
/// Decoding always fills a fresh value; a failed decode never leaves a
/// half-written target behind.
pub trait Structurer: Sized {
    /// Decode into a fresh value, consuming the structurer.
    fn read_value<T: Field + Default>(self) -> Result<T>;

    /// Decode and replace `target`. On failure `target` is untouched.
    fn read<T: Field + Default>(self, target: &mut T) -> Result<()> {
        *target = self.read_value()?;
        Ok(())
    }
}

/// Encoder from a schema'd value into an external representation.
pub trait Serializer: Sized {
    /// What a successful write produces.
    type Output;

    /// Encode `source`, consuming the serializer.
    fn write(self, source: &dyn Field) -> Result<Self::Output>;
}

/// Quote and escape `s` as a JSON string literal, pushing pieces through
/// `put`. Covers `"`, `\` and every control character.
pub(crate) fn escape_str(s: &str, mut put: impl FnMut(&str)) {
    put("\"");
    let mut start = 0;
    for (i, b) in s.bytes().enumerate() {
        let escaped = match b {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0c => "\\f",
            0x00..=0x1f | 0x7f => {
                put(&s[start..i]);
                put(&format!("\\u{:04x}", b));
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        put(&s[start..i]);
        put(escaped);
        start = i + 1;
    }
    put(&s[start..]);
    put("\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        escape_str(s, |piece| out.push_str(piece));
        out
    }

    #[test]
    fn test_escape_str() {
        assert_eq!(escaped("plain"), "\"plain\"");
        assert_eq!(escaped("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(escaped("l1\nl2\t"), r#""l1\nl2\t""#);
        assert_eq!(escaped("\u{1}x\u{7f}"), r#""\u0001x\u007f""#);
        assert_eq!(escaped("é✓"), "\"é✓\"");
    }

    #[test]
    fn test_escape_agrees_with_serde_json() {
        let s = "tab\there \"quoted\" \\ \u{0}\u{1f} done";
        let parsed: String = serde_json::from_str(&escaped(s)).unwrap();
        assert_eq!(parsed, s);
    }
}
