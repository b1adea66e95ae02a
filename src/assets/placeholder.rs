//! Skinned placeholder mesh (`.plh`).
//!
//! ```text
//! Placeholder := name:string16 matrix:mat4 nvertices:u32
//!                vertices:f32[3*nvertices] normals:f32[3*nvertices]
//!                Weights[nvertices] ntriangles:u32 indices:u32[3*ntriangles]
//! Weights     := ngroups:u8 (group:u16 weight:f32)[ngroups]
//! ```
//!
//! Only the first group of each vertex is kept; the rest are read and
//! dropped.

use glam::Mat4;

use super::AssetReader;
use crate::schema;
use crate::util::{Buffer, Content, DecodeOptions, Error, Result};

/// Smallest wire size of one `Weights` entry (no groups).
const MIN_WEIGHTS_WIRE_SIZE: usize = 1;

/// Dominant bone influence of a vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexWeight {
    pub group: u16,
    pub weight: f32,
}

schema!(VertexWeight { group, weight });

/// A placeholder mesh bound to an armature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placeholder {
    pub name: String,
    pub matrix: Mat4,
    /// Positions, 3 × f32 per vertex.
    pub vertices: Buffer,
    /// Normals, 3 × f32 per vertex.
    pub normals: Buffer,
    /// One entry per vertex; zero weight when the vertex has no group.
    pub weights: Vec<VertexWeight>,
    /// Triangle list, 3 × u32 per triangle.
    pub indices: Buffer,
}

schema!(Placeholder { name, matrix, vertices, normals, weights, indices });

/// Decodes `.plh` content.
pub struct PlaceholderStructurer<'a> {
    reader: AssetReader<'a>,
}

impl<'a> PlaceholderStructurer<'a> {
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
    pub fn read(mut self, target: &mut Placeholder) -> Result<()> {
        match self.decode() {
            Ok(placeholder) => {
                self.reader.finish("placeholder");
                *target = placeholder;
                Ok(())
            }
            Err(e) => Err(self.reader.fail("placeholder", e)),
        }
    }

    /// Decode into a fresh [`Placeholder`].
    pub fn read_value(self) -> Result<Placeholder> {
        let mut placeholder = Placeholder::default();
        self.read(&mut placeholder)?;
        Ok(placeholder)
    }

    fn decode(&mut self) -> Result<Placeholder> {
        let r = &mut self.reader;
        let name = r.string()?;
        let matrix = r.mat4()?;
        let nvertices = r.u32()? as usize;
        let components = nvertices
            .checked_mul(3)
            .ok_or_else(|| Error::invalid(format!("vertex count {} overflows", nvertices)))?;
        let vertices = r.buffer::<f32>(components)?;
        let normals = r.buffer::<f32>(components)?;

        r.ensure_records(nvertices, MIN_WEIGHTS_WIRE_SIZE)?;
        let mut weights = Vec::with_capacity(nvertices);
        let mut dropped = 0usize;
        for _ in 0..nvertices {
            let ngroups = r.u8()?;
            let mut weight = VertexWeight::default();
            for g in 0..ngroups {
                let group = r.u16()?;
                let value = r.f32()?;
                if g == 0 {
                    weight = VertexWeight { group, weight: value };
                } else {
                    dropped += 1;
                }
            }
            weights.push(weight);
        }
        if dropped > 0 {
            tracing::debug!(placeholder = %name, dropped, "kept only the first weight group per vertex");
        }

        let ntriangles = r.u32()? as usize;
        let indices = r.buffer::<u32>(ntriangles.saturating_mul(3))?;

        Ok(Placeholder {
            name,
            matrix,
            vertices,
            normals,
            weights,
            indices,
        })
    }
}
