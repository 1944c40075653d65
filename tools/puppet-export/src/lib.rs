//! puppet-export library
//!
//! Writes a rigged character scene as Puppet text files: a static puppet
//! (materials, meshes, skeleton, skin weights) and a sampled animation.

pub mod animation;
pub mod config;
pub mod error;
pub mod export;
pub mod formats;
pub mod host;
pub mod material;
pub mod matrix;
pub mod mesh;
pub mod naming;
pub mod puppet;
pub mod skeleton;

pub use animation::{export_animation, sample_animation, AnimationSnapshot, AnimationSummary, FrameCursor};
pub use config::{ExportConfig, ExportOptions};
pub use error::{ExportError, ExportResult};
pub use export::{run_export, ExportReport};
pub use host::{DocumentHost, FrameRange, Host, HostError, Rig};
pub use puppet::{export_puppet, Puppet, PuppetSummary};
pub use skeleton::ChildrenMode;
