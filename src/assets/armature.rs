//! Skeletal armature (`.arm`).
//!
//! ```text
//! Armature   := name:string16 njoints:u16 nroots:u16 JointChain[nroots]
//!               nactions:u16 Action[nactions]
//! JointChain := name:string16 matrix:mat4 inv_matrix:mat4 nchildren:u16
//!               JointChain[nchildren]
//! Action     := name:string16 length:i32 Frame[length+1]
//!               has_positions:u8 vec3[length+1]?
//!               has_orientations:u8 quat[length+1]?
//! Frame      := (index:u16 translation:vec3 rotation:quat scale:vec3)[njoints]
//! ```
//!
//! Joints are stored in preorder with only a child count per joint; the
//! decoder rebuilds `parent_index` for each. Frame entries carry an
//! explicit joint index and may appear in any order.

use glam::{Mat4, Quat, Vec3};

use super::AssetReader;
use crate::schema;
use crate::util::{Content, DecodeOptions, Error, Result};

/// Wire size of one frame entry: index, translation, rotation, scale.
const POSE_WIRE_SIZE: usize = 2 + 12 + 16 + 12;

/// One bone of the hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, -1 for roots.
    pub parent_index: i32,
    pub child_count: u16,
    pub matrix: Mat4,
    pub inv_matrix: Mat4,
}

schema!(Joint { name, parent_index, child_count, matrix, inv_matrix });

/// Local transform of one joint in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointPose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

schema!(JointPose { translation, rotation, scale });

/// Poses of every joint, indexed like [`Armature::joints`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub poses: Vec<JointPose>,
}

schema!(Frame { poses });

/// A named animation clip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    pub name: String,
    /// Index of the last frame; the clip holds `length + 1` frames.
    pub length: i32,
    pub frames: Vec<Frame>,
    /// Root motion per frame.
    pub positions: Option<Vec<Vec3>>,
    /// Root orientation per frame.
    pub orientations: Option<Vec<Quat>>,
}

schema!(Action { name, length, frames, positions, orientations });

/// Skeleton plus its animation clips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Armature {
    pub name: String,
    pub root_count: u16,
    /// Joints in preorder; parents always precede their children.
    pub joints: Vec<Joint>,
    pub actions: Vec<Action>,
}

schema!(Armature { name, root_count, joints, actions });

impl Armature {
    /// Indices of the direct children of joint `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(move |(_, j)| j.parent_index >= 0 && j.parent_index as usize == index)
            .map(|(i, _)| i)
    }

    /// Find an action by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Decodes `.arm` content.
pub struct ArmatureStructurer<'a> {
    reader: AssetReader<'a>,
}

impl<'a> ArmatureStructurer<'a> {
    /// Create a structurer bound to `content`.
    pub fn new(content: &'a Content) -> Self {
        Self::with_options(content, DecodeOptions::default())
    }

    /// Create a structurer with custom decode limits. `max_depth` bounds
    /// the joint hierarchy depth.
    pub fn with_options(content: &'a Content, options: DecodeOptions) -> Self {
        Self {
            reader: AssetReader::new(content, options),
        }
    }

    /// Decode into `target`. On failure `target` is left untouched and
    /// the error names the content path.
    pub fn read(mut self, target: &mut Armature) -> Result<()> {
        match self.decode() {
            Ok(armature) => {
                self.reader.finish("armature");
                tracing::debug!(
                    name = %armature.name,
                    joints = armature.joints.len(),
                    actions = armature.actions.len(),
                    "decoded armature"
                );
                *target = armature;
                Ok(())
            }
            Err(e) => Err(self.reader.fail("armature", e)),
        }
    }

    /// Decode into a fresh value.
    pub fn read_value(self) -> Result<Armature> {
        let mut armature = Armature::default();
        self.read(&mut armature)?;
        Ok(armature)
    }

    fn decode(&mut self) -> Result<Armature> {
        let r = &mut self.reader;
        let name = r.string()?;
        let njoints = r.u16()? as usize;
        let root_count = r.u16()?;

        let joints = self.joint_chains(njoints, root_count)?;

        let r = &mut self.reader;
        let nactions = r.u16()?;
        let mut actions = Vec::with_capacity(nactions as usize);
        for _ in 0..nactions {
            actions.push(self.action(njoints)?);
        }

        Ok(Armature {
            name,
            root_count,
            joints,
            actions,
        })
    }

    fn joint(&mut self, parent_index: i32) -> Result<Joint> {
        let r = &mut self.reader;
        Ok(Joint {
            name: r.string()?,
            parent_index,
            matrix: r.mat4()?,
            inv_matrix: r.mat4()?,
            child_count: r.u16()?,
        })
    }

    /// Rebuild the flat preorder joint array from per-joint child counts.
    ///
    /// Uses an explicit stack of `(joint index, children still to read)`
    /// so hierarchy depth is bounded by `max_depth` rather than the call
    /// stack.
    fn joint_chains(&mut self, njoints: usize, nroots: u16) -> Result<Vec<Joint>> {
        let mut joints: Vec<Joint> = Vec::with_capacity(njoints);
        let mut stack: Vec<(usize, u16)> = Vec::new();

        for _ in 0..nroots {
            let mut parent = -1;
            loop {
                if joints.len() == njoints {
                    return Err(Error::JointCountMismatch {
                        declared: njoints,
                        decoded: njoints + 1,
                    });
                }
                let joint = self.joint(parent)?;
                let index = joints.len();
                if joint.child_count > 0 {
                    stack.push((index, joint.child_count));
                    self.reader.options().check_depth(stack.len())?;
                }
                joints.push(joint);

                // Next parent: innermost joint with children left to read.
                while let Some(top) = stack.last_mut() {
                    if top.1 == 0 {
                        stack.pop();
                    } else {
                        top.1 -= 1;
                        break;
                    }
                }
                match stack.last() {
                    Some(&(index, _)) => parent = index as i32,
                    None => break,
                }
            }
        }

        if joints.len() != njoints {
            return Err(Error::JointCountMismatch {
                declared: njoints,
                decoded: joints.len(),
            });
        }
        Ok(joints)
    }

    fn action(&mut self, njoints: usize) -> Result<Action> {
        let r = &mut self.reader;
        let name = r.string()?;
        let length = r.i32()?;
        if length < 0 {
            return Err(Error::invalid(format!("action {:?} has negative length {}", name, length)));
        }
        let nframes = length as usize + 1;
        r.ensure_records(nframes, njoints * POSE_WIRE_SIZE)?;
        r.options().check_count(nframes.saturating_mul(njoints))?;

        let mut frames = Vec::new();
        for _ in 0..nframes {
            frames.push(self.frame(njoints)?);
        }

        let r = &mut self.reader;
        let positions = if r.u8()? != 0 {
            r.ensure_records(nframes, 12)?;
            Some((0..nframes).map(|_| r.vec3()).collect::<Result<Vec<_>>>()?)
        } else {
            None
        };
        let orientations = if r.u8()? != 0 {
            r.ensure_records(nframes, 16)?;
            Some((0..nframes).map(|_| r.quat()).collect::<Result<Vec<_>>>()?)
        } else {
            None
        };

        Ok(Action {
            name,
            length,
            frames,
            positions,
            orientations,
        })
    }

    /// One frame; entries land at their wire-supplied joint index.
    fn frame(&mut self, njoints: usize) -> Result<Frame> {
        let r = &mut self.reader;
        let mut poses = vec![JointPose::default(); njoints];
        for _ in 0..njoints {
            let index = r.u16()? as usize;
            if index >= njoints {
                return Err(Error::invalid(format!(
                    "frame entry for joint {} but armature has {}",
                    index, njoints
                )));
            }
            poses[index] = JointPose {
                translation: r.vec3()?,
                rotation: r.quat()?,
                scale: r.vec3()?,
            };
        }
        Ok(Frame { poses })
    }
}
