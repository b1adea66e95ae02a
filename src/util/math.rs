//! Math type re-exports.
//!
//! Asset records use `glam` types for transforms; the schema registry
//! treats them as fixed-arity tuples of f32.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Column-major 4x4 matrix from its 16 wire floats.
#[inline]
pub fn mat4_from_wire(values: [f32; 16]) -> Mat4 {
    Mat4::from_cols_array(&values)
}

/// Quaternion from its 4 wire floats (x, y, z, w).
#[inline]
pub fn quat_from_wire(values: [f32; 4]) -> Quat {
    Quat::from_array(values)
}
