//! Buffer - untyped byte store with a runtime element type.

use std::fmt;

use super::{Error, Result, Scalar, ScalarSlice, ScalarSliceMut, ScalarType};

/// Growable byte store that remembers its element type and count.
///
/// Used for large homogeneous numeric payloads (vertex, normal, index and
/// pixel arrays) so they are stored as one allocation instead of one
/// boxed value per element. Storage is 8-byte aligned, which satisfies
/// every [`ScalarType`], so typed views are plain `bytemuck` casts.
///
/// Invariant: `byte_size() == element_size() * len()`.
#[derive(Clone, Default)]
pub struct Buffer {
    words: Vec<u64>,
    value_type: ScalarType,
    len: usize,
}

impl Buffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a copy of `values`.
    pub fn from_slice<T: Scalar>(values: &[T]) -> Self {
        let mut buf = Self::new();
        buf.words = vec![0; words_for(std::mem::size_of_val(values))];
        buf.value_type = T::TYPE;
        buf.len = values.len();
        buf.as_bytes_mut().copy_from_slice(bytemuck::cast_slice(values));
        buf
    }

    /// Reallocate to `len` zeroed elements of type `T`.
    pub fn reshape<T: Scalar>(&mut self, len: usize) -> Result<()> {
        self.reshape_dyn(T::TYPE, len)
    }

    /// Reallocate to `len` zeroed elements of a runtime scalar type.
    ///
    /// On failure the buffer is left empty and the error must be treated as
    /// a decode failure for the owning field.
    pub fn reshape_dyn(&mut self, value_type: ScalarType, len: usize) -> Result<()> {
        *self = Self::default();
        let bytes = len
            .checked_mul(value_type.num_bytes())
            .ok_or_else(|| Error::invalid(format!("buffer of {} x {} overflows", len, value_type)))?;
        let mut words = Vec::new();
        words
            .try_reserve_exact(words_for(bytes))
            .map_err(|e| Error::invalid(format!("cannot allocate {} bytes: {}", bytes, e)))?;
        words.resize(words_for(bytes), 0);
        self.words = words;
        self.value_type = value_type;
        self.len = len;
        Ok(())
    }

    /// Copy `src` element-wise into the buffer.
    ///
    /// The element type must match and `src` must have exactly `len()`
    /// elements.
    pub fn copy<T: Scalar>(&mut self, src: &[T]) -> Result<()> {
        self.check_type::<T>()?;
        if src.len() != self.len {
            return Err(Error::ExtentMismatch {
                expected: self.len,
                actual: src.len(),
            });
        }
        self.as_bytes_mut().copy_from_slice(bytemuck::cast_slice(src));
        Ok(())
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current element type.
    #[inline]
    pub fn value_type(&self) -> ScalarType {
        self.value_type
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.value_type.num_bytes()
    }

    /// Total payload size in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.len * self.element_size()
    }

    /// Raw native-endian payload.
    pub fn as_bytes(&self) -> &[u8] {
        let size = self.byte_size();
        &bytemuck::cast_slice(&self.words)[..size]
    }

    /// Mutable raw payload.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let size = self.byte_size();
        &mut bytemuck::cast_slice_mut(&mut self.words)[..size]
    }

    /// Typed view; fails if `T` is not the current element type.
    pub fn as_slice<T: Scalar>(&self) -> Result<&[T]> {
        self.check_type::<T>()?;
        Ok(bytemuck::cast_slice(self.as_bytes()))
    }

    /// Mutable typed view; fails if `T` is not the current element type.
    pub fn as_mut_slice<T: Scalar>(&mut self) -> Result<&mut [T]> {
        self.check_type::<T>()?;
        Ok(bytemuck::cast_slice_mut(self.as_bytes_mut()))
    }

    /// View tagged with the runtime element type.
    pub fn scalars(&self) -> ScalarSlice<'_> {
        let bytes = self.as_bytes();
        crate::dispatch_scalar!(self.value_type, T => {
            ScalarSlice::from(bytemuck::cast_slice::<u8, T>(bytes))
        })
    }

    /// Mutable view tagged with the runtime element type.
    pub fn scalars_mut(&mut self) -> ScalarSliceMut<'_> {
        let value_type = self.value_type;
        let bytes = self.as_bytes_mut();
        crate::dispatch_scalar!(value_type, T => {
            ScalarSliceMut::from(bytemuck::cast_slice_mut::<u8, T>(bytes))
        })
    }

    fn check_type<T: Scalar>(&self) -> Result<()> {
        if T::TYPE != self.value_type {
            return Err(Error::mismatch(T::TYPE.name(), self.value_type.name()));
        }
        Ok(())
    }
}

#[inline]
fn words_for(bytes: usize) -> usize {
    bytes.div_ceil(8)
}

macro_rules! impl_slice_from {
    ($($variant:ident($t:ty),)*) => {$(
        impl<'a> From<&'a [$t]> for ScalarSlice<'a> {
            fn from(s: &'a [$t]) -> Self {
                Self::$variant(s)
            }
        }

        impl<'a> From<&'a mut [$t]> for ScalarSliceMut<'a> {
            fn from(s: &'a mut [$t]) -> Self {
                Self::$variant(s)
            }
        }
    )*};
}

impl_slice_from! {
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

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.value_type == other.value_type
            && self.len == other.len
            && self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer<{}>[{}]", self.value_type, self.len)
    }
}
