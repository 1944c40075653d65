//! Shared scene model for the puppet exporter.
//!
//! These are the host-side types the exporter reads: objects, armature bones,
//! meshes, materials and keyframed transform tracks. They are plain serde
//! structs so a scene can be captured to JSON by the host and replayed by the
//! exporter without the host being present.

pub mod scene;
pub mod track;

pub use scene::*;
pub use track::*;
