//! Field views - the shapes a codec can find behind a schema accessor.
//!
//! Every schema'd value implements [`Field`], which exposes it as one of a
//! small set of shapes ([`FieldRef`] / [`FieldMut`]). Codecs match on the
//! shape and recurse, so no codec ever branches on a concrete Rust type.

use std::fmt;

use crate::util::{Buffer, Error, Number, Result, Scalar, ScalarSlice, ScalarSliceMut, ScalarType};

/// A value the codecs can walk.
pub trait Field {
    /// Immutable view of this value's shape.
    fn view(&self) -> FieldRef<'_>;

    /// Mutable view of this value's shape.
    fn view_mut(&mut self) -> FieldMut<'_>;

    /// Contiguous numeric view of a run of `Self`, if `Self` is a numeric
    /// scalar. Lets `Vec<f32>` and friends advertise bulk copy.
    #[doc(hidden)]
    fn scalar_slice(_items: &[Self]) -> Option<ScalarSlice<'_>>
    where
        Self: Sized,
    {
        None
    }

    /// Mutable counterpart of [`Field::scalar_slice`].
    #[doc(hidden)]
    fn scalar_slice_mut(_items: &mut [Self]) -> Option<ScalarSliceMut<'_>>
    where
        Self: Sized,
    {
        None
    }
}

/// Immutable shape of a field.
pub enum FieldRef<'a> {
    /// Bool, number or string leaf
    Scalar(ScalarRef<'a>),
    /// Enum serialized through its value table
    Enum(&'a dyn EnumField),
    /// Schema'd record
    Record(&'a dyn Record),
    /// Fixed-arity positional value
    Tuple(&'a dyn Tuple),
    /// Resizable homogeneous sequence
    Sequence(&'a dyn Sequence),
    /// Runtime-typed bulk numeric storage
    Buffer(&'a Buffer),
    /// Value that may be absent
    Optional(&'a dyn Optional),
}

/// Mutable shape of a field.
pub enum FieldMut<'a> {
    Scalar(ScalarMut<'a>),
    Enum(&'a mut dyn EnumField),
    Record(&'a mut dyn Record),
    Tuple(&'a mut dyn Tuple),
    Sequence(&'a mut dyn Sequence),
    Buffer(&'a mut Buffer),
    Optional(&'a mut dyn Optional),
}

impl FieldRef<'_> {
    /// Short description of the shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.kind(),
            Self::Enum(_) => "enum",
            Self::Record(_) => "record",
            Self::Tuple(_) => "tuple",
            Self::Sequence(_) => "sequence",
            Self::Buffer(_) => "buffer",
            Self::Optional(_) => "optional",
        }
    }
}

impl FieldMut<'_> {
    /// Short description of the shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.kind(),
            Self::Enum(_) => "enum",
            Self::Record(_) => "record",
            Self::Tuple(_) => "tuple",
            Self::Sequence(_) => "sequence",
            Self::Buffer(_) => "buffer",
            Self::Optional(_) => "optional",
        }
    }
}

macro_rules! scalar_views {
    ($($variant:ident($t:ty),)*) => {
        /// A leaf value, copied out of its field.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub enum ScalarRef<'a> {
            Bool(bool),
            $($variant($t),)*
            Str(&'a str),
        }

        /// A mutable leaf.
        #[derive(Debug)]
        pub enum ScalarMut<'a> {
            Bool(&'a mut bool),
            $($variant(&'a mut $t),)*
            Str(&'a mut String),
        }

        impl ScalarRef<'_> {
            /// Numeric element type, or `None` for bool and string.
            pub fn scalar_type(&self) -> Option<ScalarType> {
                match self {
                    $(Self::$variant(_) => Some(ScalarType::$variant),)*
                    Self::Bool(_) | Self::Str(_) => None,
                }
            }

            /// Detached number, or `None` for bool and string.
            pub fn number(&self) -> Option<Number> {
                match *self {
                    $(Self::$variant(v) => Some(v.to_number()),)*
                    Self::Bool(_) | Self::Str(_) => None,
                }
            }

            /// Short description of the leaf kind.
            pub fn kind(&self) -> &'static str {
                match self {
                    Self::Bool(_) => "bool",
                    $(Self::$variant(_) => ScalarType::$variant.name(),)*
                    Self::Str(_) => "string",
                }
            }
        }

        impl ScalarMut<'_> {
            /// Short description of the leaf kind.
            pub fn kind(&self) -> &'static str {
                match self {
                    Self::Bool(_) => "bool",
                    $(Self::$variant(_) => ScalarType::$variant.name(),)*
                    Self::Str(_) => "string",
                }
            }

            /// Assign a number; fails for bool/string leaves and for values
            /// the numeric type cannot hold.
            pub fn set_number(&mut self, n: Number) -> Result<()> {
                match self {
                    $(Self::$variant(v) => **v = <$t>::try_from_number(n)?,)*
                    other => return Err(Error::mismatch(other.kind(), "number")),
                }
                Ok(())
            }

            /// Assign a bool; fails for any other leaf.
            pub fn set_bool(&mut self, b: bool) -> Result<()> {
                match self {
                    Self::Bool(v) => **v = b,
                    other => return Err(Error::mismatch(other.kind(), "bool")),
                }
                Ok(())
            }

            /// Assign a string; fails for any other leaf.
            pub fn set_str(&mut self, s: &str) -> Result<()> {
                match self {
                    Self::Str(v) => {
                        v.clear();
                        v.push_str(s);
                    }
                    other => return Err(Error::mismatch(other.kind(), "string")),
                }
                Ok(())
            }

            /// Parse an unquoted text token into the leaf: `true`/`false`
            /// for bools, a decimal number for numeric leaves, the token
            /// itself for strings.
            pub fn parse_text(&mut self, text: &str) -> Result<()> {
                match self {
                    Self::Bool(v) => {
                        **v = match text {
                            "true" => true,
                            "false" => false,
                            _ => return Err(Error::mismatch("bool", format!("{:?}", text))),
                        }
                    }
                    Self::Str(v) => {
                        v.clear();
                        v.push_str(text);
                    }
                    _ => {
                        let n = parse_number_token(text)
                            .ok_or_else(|| Error::mismatch(self.kind(), format!("{:?}", text)))?;
                        self.set_number(n)?;
                    }
                }
                Ok(())
            }
        }

        impl fmt::Display for ScalarRef<'_> {
            /// Shortest round-trip text; strings are written unquoted.
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    Self::Bool(v) => write!(f, "{}", v),
                    $(Self::$variant(v) => write!(f, "{}", v),)*
                    Self::Str(v) => f.write_str(v),
                }
            }
        }

        $(
            impl Field for $t {
                #[inline]
                fn view(&self) -> FieldRef<'_> {
                    FieldRef::Scalar(ScalarRef::$variant(*self))
                }

                #[inline]
                fn view_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::Scalar(ScalarMut::$variant(self))
                }

                fn scalar_slice(items: &[Self]) -> Option<ScalarSlice<'_>> {
                    Some(ScalarSlice::$variant(items))
                }

                fn scalar_slice_mut(items: &mut [Self]) -> Option<ScalarSliceMut<'_>> {
                    Some(ScalarSliceMut::$variant(items))
                }
            }
        )*
    };
}

scalar_views! {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
}

/// Decimal number, plus the non-finite spellings Rust prints for floats.
fn parse_number_token(text: &str) -> Option<Number> {
    match text {
        "NaN" => Some(Number::Float(f64::NAN)),
        "inf" => Some(Number::Float(f64::INFINITY)),
        "-inf" => Some(Number::Float(f64::NEG_INFINITY)),
        _ => Number::parse(text),
    }
}

/// Enum value that serializes as a string key.
///
/// Implemented for every [`EnumSchema`](super::EnumSchema) type.
pub trait EnumField {
    /// Name of the enum type.
    fn enum_name(&self) -> &'static str;

    /// Canonical key, or `None` if the value is missing from the table.
    fn key(&self) -> Option<&'static str>;

    /// Position of the value in its table.
    fn ordinal(&self) -> Option<usize>;

    /// Assign from a key; fails with [`Error::UnknownEnumKey`].
    fn set_key(&mut self, key: &str) -> Result<()>;

    /// Assign from a table position.
    fn set_ordinal(&mut self, ordinal: usize) -> Result<()>;
}

/// Type-erased access to a schema'd record.
///
/// Implemented for every [`Schema`](super::Schema) type.
pub trait Record {
    /// Name of the record type.
    fn record_name(&self) -> &'static str;

    /// Number of schema entries.
    fn field_count(&self) -> usize;

    /// Key of entry `index`.
    fn key(&self, index: usize) -> &'static str;

    /// Index of the entry named `key`.
    fn find(&self, key: &str) -> Option<usize>;

    /// Field of entry `index`.
    fn field(&self, index: usize) -> &dyn Field;

    /// Mutable field of entry `index`.
    fn field_mut(&mut self, index: usize) -> &mut dyn Field;
}

/// Fixed-arity positional value (arrays, tuples, vectors, matrices).
pub trait Tuple {
    /// Number of elements.
    fn arity(&self) -> usize;

    /// Element `index`.
    fn element(&self, index: usize) -> &dyn Field;

    /// Mutable element `index`.
    fn element_mut(&mut self, index: usize) -> &mut dyn Field;
}

/// Resizable homogeneous sequence.
///
/// `resize` plus per-element access is the baseline capability; sequences
/// of numeric scalars additionally expose their storage as one contiguous
/// [`ScalarSlice`] for bulk copy.
pub trait Sequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns true if the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize to `len` elements, filling with defaults.
    fn resize(&mut self, len: usize);

    /// Element `index`.
    fn element(&self, index: usize) -> &dyn Field;

    /// Mutable element `index`.
    fn element_mut(&mut self, index: usize) -> &mut dyn Field;

    /// Contiguous numeric storage, when elements are numeric scalars.
    fn scalars(&self) -> Option<ScalarSlice<'_>>;

    /// Mutable contiguous numeric storage.
    fn scalars_mut(&mut self) -> Option<ScalarSliceMut<'_>>;
}

/// Value that may be absent. Present values encode as the pointee.
pub trait Optional {
    /// The value, if present.
    fn get(&self) -> Option<&dyn Field>;

    /// The value, if present.
    fn get_mut(&mut self) -> Option<&mut dyn Field>;

    /// Replace with a default value and return it.
    fn insert_default(&mut self) -> &mut dyn Field;

    /// Make absent.
    fn clear(&mut self);
}
