//! Export errors
//!
//! Absent skin weights, absent shape keys and meshes without faces are not
//! errors; they have well-defined output. Everything here aborts the pass
//! that raised it.

use puppet_shared::ObjectKind;
use std::path::PathBuf;

use crate::host::HostError;

/// Failure of a puppet or animation pass
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Output file could not be created or written
    #[error("failed to write {path:?}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no active object to export")]
    NoActiveObject,

    #[error("active object '{name}' is {kind}, expected ARMATURE")]
    NotAnArmature { name: String, kind: ObjectKind },

    /// Shape key coordinates would not line up with the base mesh
    #[error("shape key '{shape}' on mesh '{mesh}' has {actual} vertices, mesh has {expected}")]
    ShapeMismatch {
        mesh: String,
        shape: String,
        expected: usize,
        actual: usize,
    },

    #[error("face {face} of mesh '{mesh}' uses material slot {slot}, but the mesh has {slots} slots")]
    MissingMaterialSlot {
        mesh: String,
        face: usize,
        slot: usize,
        slots: usize,
    },

    #[error("face {face} of mesh '{mesh}' uses material '{material}', which is not in the scene")]
    UnresolvedMaterial {
        mesh: String,
        face: usize,
        material: String,
    },

    #[error("bone '{bone}' has unknown parent '{parent}'")]
    UnknownParentBone { bone: String, parent: String },

    #[error("bone hierarchy loops through '{0}'")]
    BoneCycle(String),

    #[error("invalid frame range [{start}, {end}]")]
    InvalidFrameRange { start: i32, end: i32 },

    #[error("host query failed: {0}")]
    Host(#[from] HostError),

    /// The host frame could not be put back; host state is now inconsistent
    #[error("failed to restore host frame {frame}: {source}")]
    HostStateCorruption {
        frame: i32,
        #[source]
        source: HostError,
    },
}

impl ExportError {
    /// True when host state may have been left modified
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExportError::HostStateCorruption { .. })
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
