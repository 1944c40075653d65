//! Host backed by a captured scene document
//!
//! Evaluates keyframe tracks at the current frame. Objects and bones without
//! a track keep their static transform.

use anyhow::{Context, Result};
use glam::Mat4;
use puppet_shared::{Material, Object, Scene};
use std::path::Path;

use super::{FrameRange, Host, HostError};

/// [`Host`] over a [`Scene`] loaded from JSON
#[derive(Debug, Clone)]
pub struct DocumentHost {
    scene: Scene,
    frame: i32,
    evaluations: usize,
}

impl DocumentHost {
    /// Wrap a scene, checking that every track is usable
    pub fn new(scene: Scene) -> Result<Self, HostError> {
        for object in &scene.objects {
            if object.track.as_ref().is_some_and(|t| !t.is_ordered()) {
                return Err(HostError::UnorderedTrack(object.name.clone()));
            }
            if let Some(armature) = object.as_armature() {
                for bone in &armature.bones {
                    if bone.track.as_ref().is_some_and(|t| !t.is_ordered()) {
                        return Err(HostError::UnorderedTrack(format!(
                            "{}/{}",
                            object.name, bone.name
                        )));
                    }
                }
            }
        }

        let frame = scene.frame_current;
        Ok(Self {
            scene,
            frame,
            evaluations: 0,
        })
    }

    /// Load a scene document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene: {:?}", path))?;
        let scene = Scene::from_json(&json)
            .with_context(|| format!("Failed to parse scene: {:?}", path))?;
        Ok(Self::new(scene)?)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of frame re-evaluations so far
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn object(&self, name: &str) -> Result<&Object, HostError> {
        self.scene
            .object(name)
            .ok_or_else(|| HostError::UnknownObject(name.to_string()))
    }

    fn local_at_frame(&self, object: &Object) -> Mat4 {
        object
            .track
            .as_ref()
            .and_then(|t| t.sample(self.frame))
            .unwrap_or(object.matrix_local)
    }
}

impl Host for DocumentHost {
    fn scene_name(&self) -> &str {
        &self.scene.name
    }

    fn frame_range(&self) -> FrameRange {
        FrameRange::new(self.scene.frame_start, self.scene.frame_end)
    }

    fn frame_current(&self) -> i32 {
        self.frame
    }

    fn frame_set(&mut self, frame: i32) -> Result<(), HostError> {
        self.frame = frame;
        self.evaluations += 1;
        Ok(())
    }

    fn active_object(&self) -> Option<&Object> {
        self.scene.active()
    }

    fn children(&self, parent: &str) -> Vec<&Object> {
        self.scene.children(parent).collect()
    }

    fn materials(&self) -> &[Material] {
        &self.scene.materials
    }

    fn matrix_world(&self, object: &str) -> Result<Mat4, HostError> {
        let mut current = self.object(object)?;
        let mut world = self.local_at_frame(current);

        // A chain longer than the object count must revisit an object
        let mut remaining = self.scene.objects.len();
        while let Some(parent) = current.parent.as_deref() {
            if remaining == 0 {
                return Err(HostError::ParentCycle(object.to_string()));
            }
            remaining -= 1;

            current = self.object(parent)?;
            world = self.local_at_frame(current) * world;
        }

        Ok(world)
    }

    fn matrix_local(&self, object: &str) -> Result<Mat4, HostError> {
        Ok(self.local_at_frame(self.object(object)?))
    }

    fn bone_matrix(&self, armature: &str, bone: &str) -> Result<Mat4, HostError> {
        let data = self
            .object(armature)?
            .as_armature()
            .ok_or_else(|| HostError::NotAnArmature(armature.to_string()))?;

        let bone = data
            .bones
            .iter()
            .find(|b| b.name == bone)
            .ok_or_else(|| HostError::UnknownBone {
                armature: armature.to_string(),
                bone: bone.to_string(),
            })?;

        Ok(bone
            .track
            .as_ref()
            .and_then(|t| t.sample(self.frame))
            .unwrap_or(bone.matrix_local))
    }
}
