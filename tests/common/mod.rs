//! Wire fixtures shared by the integration tests.

#![allow(dead_code)]

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

pub fn u32s(out: &mut Vec<u8>, values: &[u32]) {
    for &v in values {
        out.write_u32::<NativeEndian>(v).unwrap();
    }
}

pub fn mat4(out: &mut Vec<u8>, m: Mat4) {
    f32s(out, &m.to_cols_array());
}

/// Joint chain node: name and children, written in preorder.
pub struct Chain {
    pub name: &'static str,
    pub children: Vec<Chain>,
}

pub fn leaf(name: &'static str) -> Chain {
    Chain { name, children: Vec::new() }
}

pub fn node(name: &'static str, children: Vec<Chain>) -> Chain {
    Chain { name, children }
}

fn chain(out: &mut Vec<u8>, c: &Chain) {
    string(out, c.name);
    mat4(out, Mat4::IDENTITY);
    mat4(out, Mat4::IDENTITY);
    out.write_u16::<NativeEndian>(c.children.len() as u16).unwrap();
    for child in &c.children {
        chain(out, child);
    }
}

fn count(c: &Chain) -> usize {
    1 + c.children.iter().map(count).sum::<usize>()
}

/// Armature with one single-frame action whose poses are written in
/// reverse joint order, with root positions and no orientations.
pub fn armature(name: &str, roots: &[Chain]) -> Vec<u8> {
    let njoints = roots.iter().map(count).sum::<usize>();
    let mut out = Vec::new();
    string(&mut out, name);
    out.write_u16::<NativeEndian>(njoints as u16).unwrap();
    out.write_u16::<NativeEndian>(roots.len() as u16).unwrap();
    for root in roots {
        chain(&mut out, root);
    }

    out.write_u16::<NativeEndian>(1).unwrap();
    string(&mut out, "idle");
    out.write_i32::<NativeEndian>(0).unwrap();
    for index in (0..njoints).rev() {
        out.write_u16::<NativeEndian>(index as u16).unwrap();
        f32s(&mut out, &Vec3::new(index as f32, 0.0, 0.0).to_array());
        f32s(&mut out, &Quat::IDENTITY.to_array());
        f32s(&mut out, &Vec3::ONE.to_array());
    }
    out.write_u8(1).unwrap();
    f32s(&mut out, &[0.0, 1.0, 0.0]);
    out.write_u8(0).unwrap();
    out
}

/// Level holding a single triangle mesh, with or without UVs.
pub fn level(name: &str, with_uvs: bool) -> Vec<u8> {
    let mut out = Vec::new();
    string(&mut out, name);
    out.write_u16::<NativeEndian>(1).unwrap();
    string(&mut out, "floor");
    mat4(&mut out, Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)));
    out.write_u32::<NativeEndian>(3).unwrap();
    f32s(&mut out, &[0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 0.0, 1.5]);
    f32s(&mut out, &[0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
    out.write_u8(with_uvs as u8).unwrap();
    if with_uvs {
        f32s(&mut out, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }
    out.write_u32::<NativeEndian>(1).unwrap();
    u32s(&mut out, &[0, 1, 2]);
    out
}
