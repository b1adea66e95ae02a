//! Numeric scalar types - the element types a [`Buffer`](super::Buffer) can hold.

use bytemuck::{Pod, Zeroable};
use std::fmt;

use super::{Error, Result};

/// Runtime identity of a numeric element type.
///
/// These are the ten element types bulk numeric payloads can be reshaped
/// to. Each has a fixed size and a native-endian binary representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScalarType {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Unsigned 8-bit integer
    #[default]
    Uint8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 64-bit integer
    Int64 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 8,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 9,
}

impl ScalarType {
    /// Number of scalar types.
    pub const COUNT: usize = 10;

    /// All scalar types, in tag order.
    pub const ALL: [ScalarType; Self::COUNT] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8_t",
            Self::Uint8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::Uint16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::Uint32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::Uint64 => "uint64_t",
            Self::Float32 => "float32_t",
            Self::Float64 => "float64_t",
        }
    }

    /// Parse a scalar type from its name string.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Convert from the u8 tag used by the binary codec.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Int8),
            1 => Some(Self::Uint8),
            2 => Some(Self::Int16),
            3 => Some(Self::Uint16),
            4 => Some(Self::Int32),
            5 => Some(Self::Uint32),
            6 => Some(Self::Int64),
            7 => Some(Self::Uint64),
            8 => Some(Self::Float32),
            9 => Some(Self::Float64),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Expands `$body` once with `$T` aliased to the Rust type of a runtime
/// [`ScalarType`].
#[macro_export]
macro_rules! dispatch_scalar {
    ($ty:expr, $T:ident => $body:expr) => {
        match $ty {
            $crate::util::ScalarType::Int8 => { type $T = i8; $body }
            $crate::util::ScalarType::Uint8 => { type $T = u8; $body }
            $crate::util::ScalarType::Int16 => { type $T = i16; $body }
            $crate::util::ScalarType::Uint16 => { type $T = u16; $body }
            $crate::util::ScalarType::Int32 => { type $T = i32; $body }
            $crate::util::ScalarType::Uint32 => { type $T = u32; $body }
            $crate::util::ScalarType::Int64 => { type $T = i64; $body }
            $crate::util::ScalarType::Uint64 => { type $T = u64; $body }
            $crate::util::ScalarType::Float32 => { type $T = f32; $body }
            $crate::util::ScalarType::Float64 => { type $T = f64; $body }
        }
    };
}

/// A numeric value detached from its storage type.
///
/// Text formats and the JSON tree deliver numbers in one of these three
/// kinds; [`Scalar::from_number`] narrows them losslessly into a concrete
/// element type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    /// Parse a decimal token. Integers without sign parse as `UInt`,
    /// negative integers as `Int`, anything else as `Float`. `-0` is
    /// `Float(-0.0)` so float destinations keep the sign.
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(u) = s.parse::<u64>() {
            return Some(Self::UInt(u));
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(if i == 0 { Self::Float(-0.0) } else { Self::Int(i) });
        }
        s.parse::<f64>().ok().map(Self::Float)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(u) = n.as_u64() {
            Self::UInt(u)
        } else if let Some(i) = n.as_i64() {
            Self::Int(i)
        } else {
            Self::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Trait for the Rust types behind each [`ScalarType`].
pub trait Scalar: Pod + Zeroable + Copy + Default + PartialEq + fmt::Display + 'static {
    /// The corresponding runtime type identity.
    const TYPE: ScalarType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Narrow a number into this type, or `None` if it does not fit.
    fn from_number(n: Number) -> Option<Self>;

    /// Widen into a detached number.
    fn to_number(self) -> Number;

    /// Like [`Scalar::from_number`], reporting the failure.
    fn try_from_number(n: Number) -> Result<Self> {
        Self::from_number(n).ok_or_else(|| Error::NumericRange {
            value: n.to_string(),
            target: Self::TYPE,
        })
    }
}

macro_rules! impl_integer_scalar {
    ($($t:ty => $variant:ident, $wide:ident;)*) => {$(
        impl Scalar for $t {
            const TYPE: ScalarType = ScalarType::$variant;

            fn from_number(n: Number) -> Option<Self> {
                match n {
                    Number::Int(i) => <$t>::try_from(i).ok(),
                    Number::UInt(u) => <$t>::try_from(u).ok(),
                    // Integral floats only.
                    Number::Float(f) => {
                        let i = f as i128;
                        if f.is_finite() && i as f64 == f {
                            <$t>::try_from(i).ok()
                        } else {
                            None
                        }
                    }
                }
            }

            #[inline]
            fn to_number(self) -> Number {
                Number::$wide(self as _)
            }
        }
    )*};
}

impl_integer_scalar! {
    i8 => Int8, Int;
    u8 => Uint8, UInt;
    i16 => Int16, Int;
    u16 => Uint16, UInt;
    i32 => Int32, Int;
    u32 => Uint32, UInt;
    i64 => Int64, Int;
    u64 => Uint64, UInt;
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::Float32;

    fn from_number(n: Number) -> Option<Self> {
        let v = match n {
            Number::Int(i) => i as f32,
            Number::UInt(u) => u as f32,
            Number::Float(f) => f as f32,
        };
        // Finite doubles beyond f32::MAX do not fit.
        match n {
            Number::Float(f) if f.is_finite() && !v.is_finite() => None,
            _ => Some(v),
        }
    }

    #[inline]
    fn to_number(self) -> Number {
        Number::Float(self as f64)
    }
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::Float64;

    fn from_number(n: Number) -> Option<Self> {
        Some(match n {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        })
    }

    #[inline]
    fn to_number(self) -> Number {
        Number::Float(self)
    }
}

macro_rules! scalar_slices {
    ($($variant:ident($t:ty),)*) => {
        /// Borrowed homogeneous run of scalars, tagged with its element type.
        #[derive(Debug, Clone, Copy)]
        pub enum ScalarSlice<'a> {
            $($variant(&'a [$t]),)*
        }

        /// Mutable counterpart of [`ScalarSlice`].
        #[derive(Debug)]
        pub enum ScalarSliceMut<'a> {
            $($variant(&'a mut [$t]),)*
        }

        impl ScalarSlice<'_> {
            /// Element type of the slice.
            pub fn scalar_type(&self) -> ScalarType {
                match self {
                    $(Self::$variant(_) => ScalarType::$variant,)*
                }
            }

            /// Number of elements.
            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(s) => s.len(),)*
                }
            }

            /// Returns true if the slice holds no elements.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Element `index` as a detached number.
            pub fn get(&self, index: usize) -> Number {
                match self {
                    $(Self::$variant(s) => s[index].to_number(),)*
                }
            }

            /// Raw native-endian bytes of the whole slice.
            pub fn as_bytes(&self) -> &[u8] {
                match self {
                    $(Self::$variant(s) => bytemuck::cast_slice(s),)*
                }
            }

            /// Write element `index` in its shortest round-trip text form.
            pub fn write_element(&self, index: usize, out: &mut impl fmt::Write) -> fmt::Result {
                match self {
                    $(Self::$variant(s) => write!(out, "{}", s[index]),)*
                }
            }
        }

        impl ScalarSliceMut<'_> {
            /// Element type of the slice.
            pub fn scalar_type(&self) -> ScalarType {
                match self {
                    $(Self::$variant(_) => ScalarType::$variant,)*
                }
            }

            /// Number of elements.
            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(s) => s.len(),)*
                }
            }

            /// Returns true if the slice holds no elements.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Store a number at `index`, failing if it does not fit.
            pub fn set(&mut self, index: usize, n: Number) -> Result<()> {
                match self {
                    $(Self::$variant(s) => s[index] = <$t>::try_from_number(n)?,)*
                }
                Ok(())
            }

            /// Raw native-endian bytes of the whole slice.
            pub fn as_bytes_mut(&mut self) -> &mut [u8] {
                match self {
                    $(Self::$variant(s) => bytemuck::cast_slice_mut(s),)*
                }
            }
        }
    };
}

scalar_slices! {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(ScalarType::Int8.num_bytes(), 1);
        assert_eq!(ScalarType::Uint16.num_bytes(), 2);
        assert_eq!(ScalarType::Float32.num_bytes(), 4);
        assert_eq!(ScalarType::Int64.num_bytes(), 8);
        for ty in ScalarType::ALL {
            dispatch_scalar!(ty, T => assert_eq!(std::mem::size_of::<T>(), ty.num_bytes()));
        }
    }

    #[test]
    fn test_scalar_roundtrip() {
        for (i, ty) in ScalarType::ALL.into_iter().enumerate() {
            assert_eq!(ScalarType::from_u8(i as u8), Some(ty));
            assert_eq!(ScalarType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ScalarType::from_u8(10), None);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(i8::from_number(Number::Int(-8)), Some(-8));
        assert_eq!(i8::from_number(Number::UInt(200)), None);
        assert_eq!(u8::from_number(Number::Int(-1)), None);
        assert_eq!(u16::from_number(Number::Float(300.0)), Some(300));
        assert_eq!(u16::from_number(Number::Float(0.5)), None);
        assert_eq!(f32::from_number(Number::Float(1e300)), None);
        assert_eq!(f32::from_number(Number::UInt(3)), Some(3.0));
    }

    #[test]
    fn test_number_parse() {
        assert_eq!(Number::parse("42"), Some(Number::UInt(42)));
        assert_eq!(Number::parse("-42"), Some(Number::Int(-42)));
        assert_eq!(Number::parse("0.25"), Some(Number::Float(0.25)));
        assert_eq!(Number::parse("abc"), None);

        let Some(Number::Float(z)) = Number::parse("-0") else {
            panic!("-0 must parse as a float");
        };
        assert!(z == 0.0 && z.is_sign_negative());
        assert_eq!(i32::from_number(Number::parse("-0").unwrap()), Some(0));
    }

    #[test]
    fn test_slice_set_reports_range() {
        let mut v = [0u8; 2];
        let mut s = ScalarSliceMut::Uint8(&mut v);
        s.set(0, Number::UInt(255)).unwrap();
        assert!(matches!(s.set(1, Number::UInt(256)), Err(Error::NumericRange { .. })));
        assert_eq!(v, [255, 0]);
    }
}
