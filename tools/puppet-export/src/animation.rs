//! Animation export
//!
//! Sampling walks the scene frame range once, caching every transform, and
//! only then is the file written. The host frame is put back afterwards,
//! whether sampling succeeded or not.

use glam::Mat4;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{ExportError, ExportResult};
use crate::formats::{RecordKind, RecordWriter};
use crate::host::{FrameRange, Host, HostError, Rig};
use crate::naming::normalize;

/// Exclusive use of the host frame cursor.
///
/// Remembers the frame current at acquisition. [`FrameCursor::release`]
/// restores it and reports failure; dropping an unreleased cursor (early
/// return or unwinding) restores it and logs failure.
pub struct FrameCursor<'h, H: Host> {
    host: &'h mut H,
    restore: i32,
    released: bool,
}

impl<'h, H: Host> FrameCursor<'h, H> {
    pub fn acquire(host: &'h mut H) -> Self {
        let restore = host.frame_current();
        Self {
            host,
            restore,
            released: false,
        }
    }

    /// Frame that will be restored
    pub fn restore_frame(&self) -> i32 {
        self.restore
    }

    /// Move to `frame` and re-evaluate the scene
    pub fn seek(&mut self, frame: i32) -> Result<(), HostError> {
        self.host.frame_set(frame)
    }

    /// Queries against the scene as evaluated at the last seek
    pub fn host(&self) -> &H {
        &*self.host
    }

    pub fn release(mut self) -> ExportResult<()> {
        self.released = true;
        let frame = self.restore;
        self.host
            .frame_set(frame)
            .map_err(|source| ExportError::HostStateCorruption { frame, source })
    }
}

impl<H: Host> Drop for FrameCursor<'_, H> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.host.frame_set(self.restore) {
            tracing::error!("Failed to restore host frame {}: {}", self.restore, e);
        }
    }
}

/// Per-frame transforms of one named entity
#[derive(Debug, Clone)]
pub struct PoseTrack {
    pub name: String,
    pub poses: Vec<Mat4>,
}

/// Every sampled transform of one animation pass
#[derive(Debug, Clone)]
pub struct AnimationSnapshot {
    pub scene: String,
    pub puppet: String,
    pub range: FrameRange,
    /// Armature world transform per frame
    pub armature: Vec<Mat4>,
    /// Mesh transforms relative to the armature, in child order
    pub meshes: Vec<PoseTrack>,
    /// Deforming bone poses in armature space, in bone-list order
    pub bones: Vec<PoseTrack>,
}

/// Counts reported after a successful animation export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSummary {
    pub frames: usize,
    pub meshes: usize,
    pub bones: usize,
}

impl AnimationSnapshot {
    pub fn summary(&self) -> AnimationSummary {
        AnimationSummary {
            frames: self.range.len(),
            meshes: self.meshes.len(),
            bones: self.bones.len(),
        }
    }
}

/// Host names to query each frame
struct Targets {
    armature: String,
    meshes: Vec<String>,
    bones: Vec<String>,
}

struct Tracks {
    armature: Vec<Mat4>,
    meshes: Vec<Vec<Mat4>>,
    bones: Vec<Vec<Mat4>>,
}

/// Per-track reservation ceiling; longer ranges grow as frames arrive
const RESERVED_FRAMES: usize = 4096;

fn reserved_frames(range: FrameRange) -> usize {
    range.len().min(RESERVED_FRAMES)
}

fn sample_frames<H: Host>(
    cursor: &mut FrameCursor<'_, H>,
    targets: &Targets,
    range: FrameRange,
) -> ExportResult<Tracks> {
    let frames = reserved_frames(range);
    let mut tracks = Tracks {
        armature: Vec::with_capacity(frames),
        meshes: vec![Vec::with_capacity(frames); targets.meshes.len()],
        bones: vec![Vec::with_capacity(frames); targets.bones.len()],
    };

    for frame in range.frames() {
        cursor.seek(frame)?;
        let host = cursor.host();

        tracks.armature.push(host.matrix_world(&targets.armature)?);
        for (track, mesh) in tracks.meshes.iter_mut().zip(&targets.meshes) {
            track.push(host.matrix_local(mesh)?);
        }
        for (track, bone) in tracks.bones.iter_mut().zip(&targets.bones) {
            track.push(host.bone_matrix(&targets.armature, bone)?);
        }
    }

    Ok(tracks)
}

/// Sample the active armature over the scene frame range.
///
/// The host is advanced once per frame and then returned to the frame it
/// was on. A failed restore is reported as
/// [`ExportError::HostStateCorruption`] even if sampling also failed.
pub fn sample_animation<H: Host>(host: &mut H) -> ExportResult<AnimationSnapshot> {
    let range = host.frame_range();
    if range.is_empty() {
        return Err(ExportError::InvalidFrameRange {
            start: range.start,
            end: range.end,
        });
    }

    let scene = normalize(host.scene_name());
    let targets = {
        let rig = Rig::active(&*host)?;
        Targets {
            armature: rig.name().to_string(),
            meshes: rig.meshes.iter().map(|(o, _)| o.name.clone()).collect(),
            bones: rig.deform_bones().map(|b| b.name.clone()).collect(),
        }
    };

    let mut cursor = FrameCursor::acquire(host);
    tracing::debug!(
        "Sampling frames {}..={} (restoring {})",
        range.start,
        range.end,
        cursor.restore_frame()
    );
    let sampled = sample_frames(&mut cursor, &targets, range);
    let restored = cursor.release();

    let tracks = match (sampled, restored) {
        (Ok(tracks), Ok(())) => tracks,
        (Err(e), Ok(())) => return Err(e),
        (sampled, Err(fatal)) => {
            if let Err(e) = sampled {
                tracing::error!("Sampling failed before the frame restore did: {}", e);
            }
            return Err(fatal);
        }
    };

    Ok(AnimationSnapshot {
        scene,
        puppet: normalize(&targets.armature),
        range,
        armature: tracks.armature,
        meshes: pose_tracks(&targets.meshes, tracks.meshes),
        bones: pose_tracks(&targets.bones, tracks.bones),
    })
}

fn pose_tracks(names: &[String], poses: Vec<Vec<Mat4>>) -> Vec<PoseTrack> {
    names
        .iter()
        .zip(poses)
        .map(|(name, poses)| PoseTrack {
            name: normalize(name),
            poses,
        })
        .collect()
}

pub fn write_animation<W: Write>(w: &mut RecordWriter<W>, snapshot: &AnimationSnapshot) -> io::Result<()> {
    w.begin(RecordKind::Animation)?;
    w.field("name", &snapshot.scene)?;
    w.field("puppet", &snapshot.puppet)?;
    w.field("meshes", snapshot.meshes.len())?;
    w.field("bones", snapshot.bones.len())?;
    w.field("frames", snapshot.range.len())?;
    w.end()?;

    w.begin(RecordKind::Puppet)?;
    w.field("name", &snapshot.puppet)?;
    for m in &snapshot.armature {
        w.matrix(m)?;
    }
    w.end()?;

    for (kind, tracks) in [
        (RecordKind::Mesh, &snapshot.meshes),
        (RecordKind::Bone, &snapshot.bones),
    ] {
        for track in tracks {
            w.begin(kind)?;
            w.field("name", &track.name)?;
            for m in &track.poses {
                w.matrix(m)?;
            }
            w.end()?;
        }
    }
    w.flush()
}

/// Sample the animation and write it to `path`
pub fn export_animation<H: Host>(host: &mut H, path: &Path) -> ExportResult<AnimationSummary> {
    let snapshot = sample_animation(host)?;

    let resource = |source: io::Error| ExportError::Resource {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(resource)?;
    let mut writer = RecordWriter::new(BufWriter::new(file));
    write_animation(&mut writer, &snapshot).map_err(resource)?;

    let summary = snapshot.summary();
    tracing::info!(
        "Wrote animation '{}' to {:?} ({} frames, {} meshes, {} bones)",
        snapshot.scene,
        path,
        summary.frames,
        summary.meshes,
        summary.bones
    );
    Ok(summary)
}
