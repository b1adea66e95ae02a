//! Static level geometry (`.lvl`).
//!
//! ```text
//! Level := name:string16 nmeshes:u16 Mesh[nmeshes]
//! Mesh  := name:string16 matrix:mat4 nvertices:u32
//!          vertices:f32[3*nvertices] normals:f32[3*nvertices]
//!          has_uvs:u8 uvs:f32[2*nvertices]?
//!          ntriangles:u32 indices:u32[3*ntriangles]
//! ```

use glam::Mat4;

use super::AssetReader;
use crate::schema;
use crate::util::{Buffer, Content, DecodeOptions, Error, Result};

/// One mesh placed in the level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub matrix: Mat4,
    /// Positions, 3 × f32 per vertex.
    pub vertices: Buffer,
    /// Normals, 3 × f32 per vertex.
    pub normals: Buffer,
    /// Texture coordinates, 2 × f32 per vertex.
    pub uvs: Option<Buffer>,
    /// Triangle list, 3 × u32 per triangle.
    pub indices: Buffer,
}

schema!(Mesh { name, matrix, vertices, normals, uvs, indices });

impl Mesh {
    /// Number of vertices (position triples).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles (index triples).
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A level: named list of meshes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    pub name: String,
    pub meshes: Vec<Mesh>,
}

schema!(Level { name, meshes });

/// Decodes `.lvl` content.
pub struct LevelStructurer<'a> {
    reader: AssetReader<'a>,
}

impl<'a> LevelStructurer<'a> {
    /// Create a structurer bound to `content`.
    pub fn new(content: &'a Content) -> Self {
        Self::with_options(content, DecodeOptions::default())
    }

    /// Create a structurer with custom decode limits. `max_elements`
    /// bounds every declared vertex and index count.
    pub fn with_options(content: &'a Content, options: DecodeOptions) -> Self {
        Self {
            reader: AssetReader::new(content, options),
        }
    }

    /// Decode into `target`, which is left untouched on failure.
    pub fn read(mut self, target: &mut Level) -> Result<()> {
        match self.decode() {
            Ok(level) => {
                self.reader.finish("level");
                tracing::debug!(name = %level.name, meshes = level.meshes.len(), "decoded level");
                *target = level;
                Ok(())
            }
            Err(e) => Err(self.reader.fail("level", e)),
        }
    }

    /// Decode into a fresh [`Level`].
    pub fn read_value(self) -> Result<Level> {
        let mut level = Level::default();
        self.read(&mut level)?;
        Ok(level)
    }

    fn decode(&mut self) -> Result<Level> {
        let name = self.reader.string()?;
        let nmeshes = self.reader.u16()?;
        let meshes = (0..nmeshes).map(|_| self.mesh()).collect::<Result<Vec<_>>>()?;
        Ok(Level { name, meshes })
    }

    fn mesh(&mut self) -> Result<Mesh> {
        let r = &mut self.reader;
        let name = r.string()?;
        let matrix = r.mat4()?;
        let nvertices = r.u32()? as usize;
        let components = nvertices
            .checked_mul(3)
            .ok_or_else(|| Error::invalid(format!("vertex count {} overflows", nvertices)))?;
        let vertices = r.buffer::<f32>(components)?;
        let normals = r.buffer::<f32>(components)?;
        let uvs = match r.u8()? {
            0 => None,
            _ => Some(r.buffer::<f32>(nvertices * 2)?),
        };
        let ntriangles = r.u32()? as usize;
        let indices = r.buffer::<u32>(ntriangles.saturating_mul(3))?;

        if let Some(&max) = indices.as_slice::<u32>()?.iter().max() {
            if max as usize >= nvertices {
                tracing::warn!(mesh = %name, index = max, nvertices, "triangle index past vertex count");
            }
        }

        Ok(Mesh {
            name,
            matrix,
            vertices,
            normals,
            uvs,
            indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::wire;
    use byteorder::{NativeEndian, WriteBytesExt};

    fn mesh_bytes(out: &mut Vec<u8>, name: &str, with_uvs: bool) {
        wire::string(out, name);
        wire::mat4(out, Mat4::IDENTITY);
        out.write_u32::<NativeEndian>(3).unwrap();
        wire::f32s(out, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        wire::f32s(out, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        out.write_u8(with_uvs as u8).unwrap();
        if with_uvs {
            wire::f32s(out, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        }
        out.write_u32::<NativeEndian>(1).unwrap();
        for i in [0u32, 1, 2] {
            out.write_u32::<NativeEndian>(i).unwrap();
        }
    }

    #[test]
    fn test_decode_level() {
        let mut bytes = Vec::new();
        wire::string(&mut bytes, "arena");
        bytes.write_u16::<NativeEndian>(2).unwrap();
        mesh_bytes(&mut bytes, "floor", true);
        mesh_bytes(&mut bytes, "wall", false);

        let level = LevelStructurer::new(&Content::new("arena.lvl", bytes)).read_value().unwrap();
        assert_eq!(level.name, "arena");
        assert_eq!(level.meshes.len(), 2);

        let floor = &level.meshes[0];
        assert_eq!(floor.vertex_count(), 3);
        assert_eq!(floor.triangle_count(), 1);
        assert_eq!(floor.vertices.as_slice::<f32>().unwrap()[3], 1.0);
        assert_eq!(floor.uvs.as_ref().map(Buffer::len), Some(6));
        assert_eq!(floor.indices.as_slice::<u32>().unwrap(), [0, 1, 2]);
        assert!(level.meshes[1].uvs.is_none());
    }

    #[test]
    fn test_vertex_count_past_end() {
        let mut bytes = Vec::new();
        wire::string(&mut bytes, "huge");
        bytes.write_u16::<NativeEndian>(1).unwrap();
        wire::string(&mut bytes, "m");
        wire::mat4(&mut bytes, Mat4::IDENTITY);
        bytes.write_u32::<NativeEndian>(1_000_000).unwrap();

        let err = LevelStructurer::new(&Content::new("huge.lvl", bytes))
            .read_value()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InContent { ref source, .. } if matches!(**source, Error::UnexpectedEof { .. })
        ));
    }
}
