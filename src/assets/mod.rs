//! Game asset records and their binary structurers.
//!
//! Each asset format has a hand-written structurer for its wire grammar
//! plus a schema registration, so the decoded value can be dumped through
//! any of the generic codecs.
//!
//! | extension | record                       | structurer              |
//! |-----------|------------------------------|-------------------------|
//! | `.arm`    | [`Armature`]                 | [`ArmatureStructurer`]  |
//! | `.lvl`    | [`Level`]                    | [`LevelStructurer`]     |
//! | `.plh`    | [`Placeholder`]              | [`PlaceholderStructurer`] |
//! | `.png`    | [`Image`]                    | [`ImageStructurer`]     |

mod armature;
mod png;
mod level;
mod placeholder;

pub use armature::{Action, Armature, ArmatureStructurer, Frame, Joint, JointPose};
pub use png::{Image, ImageColor, ImageStructurer};
pub use level::{Level, LevelStructurer, Mesh};
pub use placeholder::{Placeholder, PlaceholderStructurer, VertexWeight};

use glam::{Mat4, Quat, Vec3};

use crate::util::{mat4_from_wire, quat_from_wire, Buffer, Content, Cursor, DecodeOptions, Result, Scalar};

/// Cursor over one content blob with the helpers every asset grammar
/// shares.
pub(crate) struct AssetReader<'a> {
    content: &'a Content,
    cursor: Cursor,
    options: DecodeOptions,
}

impl<'a> AssetReader<'a> {
    pub fn new(content: &'a Content, options: DecodeOptions) -> Self {
        Self {
            content,
            cursor: Cursor::new(),
            options,
        }
    }

    #[inline]
    fn data(&self) -> &'a [u8] {
        self.content.data()
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining(self.data())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.cursor.read_u8(self.data())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.cursor.read_u16(self.data())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.cursor.read_u32(self.data())
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.cursor.read_i32(self.data())
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.cursor.read_f32(self.data())
    }

    pub fn string(&mut self) -> Result<String> {
        self.cursor.read_string16(self.data())
    }

    pub fn vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::from_array(self.cursor.read_f32s::<3>(self.data())?))
    }

    pub fn quat(&mut self) -> Result<Quat> {
        Ok(quat_from_wire(self.cursor.read_f32s::<4>(self.data())?))
    }

    pub fn mat4(&mut self) -> Result<Mat4> {
        Ok(mat4_from_wire(self.cursor.read_f32s::<16>(self.data())?))
    }

    /// Read `count` elements of `T` into a fresh buffer.
    pub fn buffer<T: Scalar>(&mut self, count: usize) -> Result<Buffer> {
        self.options.check_count(count)?;
        let mut buf = Buffer::new();
        self.cursor.read_buffer::<T>(self.data(), &mut buf, count)?;
        Ok(buf)
    }

    /// Fail unless `count` records of at least `size` bytes each can still
    /// be read. Checked before allocating for wire-declared counts.
    pub fn ensure_records(&self, count: usize, size: usize) -> Result<()> {
        self.options.check_count(count)?;
        let needed = count.saturating_mul(size);
        if needed > self.remaining() {
            return Err(crate::Error::UnexpectedEof {
                offset: self.pos(),
                requested: needed,
                size: self.data().len(),
            });
        }
        Ok(())
    }

    /// Log and wrap a decode failure with the content path.
    pub fn fail(&self, kind: &str, error: crate::Error) -> crate::Error {
        tracing::warn!(
            path = %self.content.path().display(),
            offset = self.pos(),
            error = %error,
            "{} decode failed",
            kind
        );
        error.in_content(self.content.path())
    }

    /// Note unread bytes after a complete decode.
    pub fn finish(&self, kind: &str) {
        let left = self.remaining();
        if left > 0 {
            tracing::debug!(path = %self.content.path().display(), left, "{} has trailing bytes", kind);
        }
    }
}

#[cfg(test)]
pub(crate) mod wire {
    //! Fixture writers for asset grammars.

    use byteorder::{NativeEndian, WriteBytesExt};
    use glam::{Mat4, Quat, Vec3};

    pub fn string(out: &mut Vec<u8>, s: &str) {
        out.write_u16::<NativeEndian>(s.len() as u16).unwrap();
        out.extend_from_slice(s.as_bytes());
    }

    pub fn f32s(out: &mut Vec<u8>, values: &[f32]) {
        for &v in values {
            out.write_f32::<NativeEndian>(v).unwrap();
        }
    }

    pub fn vec3(out: &mut Vec<u8>, v: Vec3) {
        f32s(out, &v.to_array());
    }

    pub fn quat(out: &mut Vec<u8>, q: Quat) {
        f32s(out, &q.to_array());
    }

    pub fn mat4(out: &mut Vec<u8>, m: Mat4) {
        f32s(out, &m.to_cols_array());
    }
}
