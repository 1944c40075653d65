//! Host scene interface
//!
//! The exporter reads the scene through [`Host`] and never holds on to host
//! objects past one pass. The only mutation is the frame cursor, which the
//! animation pass borrows and restores.

mod document;

pub use document::DocumentHost;

use glam::Mat4;
use puppet_shared::{Bone, Material, MeshData, Object};
use std::ops::RangeInclusive;

use crate::error::{ExportError, ExportResult};

/// Host query failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("unknown object '{0}'")]
    UnknownObject(String),

    #[error("object '{0}' is not an armature")]
    NotAnArmature(String),

    #[error("armature '{armature}' has no bone '{bone}'")]
    UnknownBone { armature: String, bone: String },

    #[error("object parent chain loops through '{0}'")]
    ParentCycle(String),

    #[error("keyframes of '{0}' are not in increasing frame order")]
    UnorderedTrack(String),

    #[error("scene evaluation failed: {0}")]
    Evaluation(String),
}

/// Closed frame interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Number of frames (0 when `end < start`)
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end as i64 - self.start as i64 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frames(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

/// Read-only scene queries plus the frame cursor
pub trait Host {
    fn scene_name(&self) -> &str;

    fn frame_range(&self) -> FrameRange;

    fn frame_current(&self) -> i32;

    /// Move the frame cursor and re-evaluate the scene.
    ///
    /// Assumed expensive; transform queries reflect the last frame set.
    fn frame_set(&mut self, frame: i32) -> Result<(), HostError>;

    /// The selected object
    fn active_object(&self) -> Option<&Object>;

    /// Objects parented to `parent`, in host order
    fn children(&self, parent: &str) -> Vec<&Object>;

    /// Scene-wide material collection, in host order
    fn materials(&self) -> &[Material];

    /// Evaluated world transform of an object
    fn matrix_world(&self, object: &str) -> Result<Mat4, HostError>;

    /// Evaluated transform of an object relative to its parent
    fn matrix_local(&self, object: &str) -> Result<Mat4, HostError>;

    /// Evaluated pose of a bone in armature space
    fn bone_matrix(&self, armature: &str, bone: &str) -> Result<Mat4, HostError>;
}

/// The active armature with its bones and mesh children
pub struct Rig<'a> {
    pub armature: &'a Object,
    pub bones: &'a [Bone],
    /// Mesh children in host child order; other child types are skipped
    pub meshes: Vec<(&'a Object, &'a MeshData)>,
}

impl<'a> Rig<'a> {
    /// Resolve the active object as an armature
    pub fn active<H: Host>(host: &'a H) -> ExportResult<Self> {
        let armature = host.active_object().ok_or(ExportError::NoActiveObject)?;
        let data = armature
            .as_armature()
            .ok_or_else(|| ExportError::NotAnArmature {
                name: armature.name.clone(),
                kind: armature.kind(),
            })?;

        let meshes = host
            .children(&armature.name)
            .into_iter()
            .filter_map(|child| child.as_mesh().map(|mesh| (child, mesh)))
            .collect();

        Ok(Self {
            armature,
            bones: &data.bones,
            meshes,
        })
    }

    pub fn name(&self) -> &'a str {
        &self.armature.name
    }

    /// Bones with the deformation flag, in bone-list order
    pub fn deform_bones(&self) -> impl Iterator<Item = &'a Bone> + 'a {
        self.bones.iter().filter(|b| b.use_deform)
    }
}
