//! Content (a loaded file) and Cursor (a read position into it).

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, NativeEndian};

use super::{Buffer, Error, Result, Scalar};

/// A whole file held in memory, together with the path it came from.
///
/// The loader layer creates these; decoders only borrow the byte range
/// for the duration of one decode pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Content {
    path: PathBuf,
    data: Vec<u8>,
}

impl Content {
    /// Wrap already-loaded bytes.
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Read a whole file into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        tracing::debug!(path = %path.display(), size = data.len(), "loaded content");
        Ok(Self::new(path, data))
    }

    /// Source path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the content holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Explicit byte offset into a byte range.
///
/// A cursor carries no I/O, only position. Each read takes the range it
/// reads from, checks bounds against its end and advances on success; a
/// failed read leaves the position unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
}

impl Cursor {
    /// Cursor at offset 0.
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Cursor at an arbitrary offset.
    pub const fn at(pos: usize) -> Self {
        Self { pos }
    }

    /// Current offset.
    #[inline]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of `data`.
    #[inline]
    pub fn remaining(&self, data: &[u8]) -> usize {
        data.len().saturating_sub(self.pos)
    }

    /// Returns true once every byte of `data` has been consumed.
    #[inline]
    pub fn is_at_end(&self, data: &[u8]) -> bool {
        self.pos >= data.len()
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take<'a>(&mut self, data: &'a [u8], len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or(Error::UnexpectedEof {
                offset: self.pos,
                requested: len,
                size: data.len(),
            })?;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a u8.
    pub fn read_u8(&mut self, data: &[u8]) -> Result<u8> {
        Ok(self.take(data, 1)?[0])
    }

    /// Read a native-endian u16.
    pub fn read_u16(&mut self, data: &[u8]) -> Result<u16> {
        Ok(NativeEndian::read_u16(self.take(data, 2)?))
    }

    /// Read a native-endian u32.
    pub fn read_u32(&mut self, data: &[u8]) -> Result<u32> {
        Ok(NativeEndian::read_u32(self.take(data, 4)?))
    }

    /// Read a native-endian i32.
    pub fn read_i32(&mut self, data: &[u8]) -> Result<i32> {
        Ok(NativeEndian::read_i32(self.take(data, 4)?))
    }

    /// Read a native-endian f32.
    pub fn read_f32(&mut self, data: &[u8]) -> Result<f32> {
        Ok(NativeEndian::read_f32(self.take(data, 4)?))
    }

    /// Read `N` consecutive native-endian f32 values.
    pub fn read_f32s<const N: usize>(&mut self, data: &[u8]) -> Result<[f32; N]> {
        let mut out = [0.0f32; N];
        NativeEndian::read_f32_into(self.take(data, N * 4)?, &mut out);
        Ok(out)
    }

    /// Read any scalar by its native-endian bytes.
    pub fn read_scalar<T: Scalar>(&mut self, data: &[u8]) -> Result<T> {
        Ok(bytemuck::pod_read_unaligned(self.take(data, T::SIZE)?))
    }

    /// Read a `string16`: u16 length followed by that many bytes, no NUL.
    pub fn read_string16(&mut self, data: &[u8]) -> Result<String> {
        let start = self.pos;
        let len = self.read_u16(data)? as usize;
        let bytes = self.take(data, len).inspect_err(|_| self.pos = start)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            self.pos = start;
            Error::from(e)
        })
    }

    /// Reshape `buf` to `count` elements of `T` and fill it from the next
    /// `count * size_of::<T>()` bytes.
    pub fn read_buffer<T: Scalar>(&mut self, data: &[u8], buf: &mut Buffer, count: usize) -> Result<()> {
        let bytes = count
            .checked_mul(T::SIZE)
            .ok_or_else(|| Error::invalid(format!("element count {} overflows", count)))?;
        // Check bounds before allocating so a bogus count cannot force a
        // huge allocation.
        let src = self.take(data, bytes)?;
        buf.reshape::<T>(count)?;
        buf.as_bytes_mut().copy_from_slice(src);
        Ok(())
    }
}
