//! Scene builders shared by the integration tests

#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};
use puppet_shared::{
    ArmatureData, Bone, CustomProperty, GroupWeight, Interpolation, Keyframe, Material, MeshData,
    Object, ObjectData, Polygon, PropertyValue, Scene, ShapeKey, TransformTrack, Vertex,
};
use std::path::{Path, PathBuf};

pub fn object(name: &str, parent: Option<&str>, data: ObjectData) -> Object {
    Object {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        matrix_local: Mat4::IDENTITY,
        hide: false,
        track: None,
        data,
    }
}

pub fn bone(name: &str, parent: Option<&str>, deform: bool) -> Bone {
    Bone {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        use_deform: deform,
        matrix_local: Mat4::IDENTITY,
        track: None,
    }
}

pub fn material(name: &str, properties: &[(&str, PropertyValue)]) -> Material {
    Material {
        name: name.to_string(),
        properties: properties
            .iter()
            .map(|(key, value)| CustomProperty {
                key: key.to_string(),
                value: value.clone(),
            })
            .collect(),
    }
}

pub fn vertex(x: f32, y: f32, z: f32, groups: &[(usize, f32)]) -> Vertex {
    Vertex {
        co: Vec3::new(x, y, z),
        normal: Vec3::Z,
        groups: groups
            .iter()
            .map(|&(group, weight)| GroupWeight { group, weight })
            .collect(),
    }
}

pub fn face(vertices: &[u32], material_index: usize) -> Polygon {
    Polygon {
        vertices: vertices.to_vec(),
        material_index,
    }
}

/// Armature "Rig", quad mesh "Body", deforming bone "Spine", material "Skin"
pub fn spine_rig() -> Scene {
    let body = MeshData {
        vertices: vec![
            vertex(0.0, 0.0, 0.0, &[(0, 1.0)]),
            vertex(1.0, 0.0, 0.0, &[(0, 1.0)]),
            vertex(1.0, 1.0, 0.0, &[(0, 0.5)]),
            vertex(0.0, 1.0, 0.0, &[]),
        ],
        polygons: vec![face(&[0, 1, 2, 3], 0)],
        materials: vec!["Skin".into()],
        vertex_groups: vec!["Spine".into()],
        shape_keys: vec![],
    };

    Scene {
        name: "Scene".into(),
        frame_start: 1,
        frame_end: 1,
        frame_current: 1,
        materials: vec![material("Skin", &[("duke_density", PropertyValue::Float(1.0))])],
        objects: vec![
            object(
                "Rig",
                None,
                ObjectData::Armature(ArmatureData {
                    bones: vec![bone("Spine", None, true)],
                }),
            ),
            object("Body", Some("Rig"), ObjectData::Mesh(body)),
        ],
        active_object: Some("Rig".into()),
    }
}

fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// A character with every feature the exporter handles:
/// control bones between deforming bones, shape keys, mixed triangles and
/// quads, two meshes, duplicate material names, and animated tracks.
pub fn puppet_rig() -> Scene {
    let torso = MeshData {
        vertices: vec![
            vertex(0.0, 0.0, 0.0, &[(0, 1.0)]),
            vertex(1.0, 0.0, 0.0, &[(0, 0.75), (1, 0.25)]),
            vertex(1.0, 1.0, 0.0, &[(1, 1.0)]),
            vertex(0.0, 1.0, 0.0, &[(1, 0.5)]),
            vertex(0.5, 2.0, 0.0, &[(2, 1.0)]),
        ],
        polygons: vec![face(&[0, 1, 2, 3], 1), face(&[3, 2, 4], 0)],
        materials: vec!["Cloth".into(), "Skin".into()],
        vertex_groups: vec!["Hips".into(), "Chest".into(), "Head Top".into()],
        shape_keys: vec![
            ShapeKey {
                name: "Basis".into(),
                data: vec![
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(0.5, 2.0, 0.0),
                ],
            },
            ShapeKey {
                name: "Breathe.In".into(),
                data: vec![
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.25, 0.0, 0.0),
                    Vec3::new(1.25, 1.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(0.5, 2.0, 0.0),
                ],
            },
        ],
    };

    let prop = MeshData {
        vertices: vec![
            vertex(0.0, 0.0, 0.0, &[]),
            vertex(0.0, 0.0, 1.0, &[]),
            vertex(0.0, 1.0, 0.0, &[]),
        ],
        polygons: vec![face(&[0, 1, 2], 0)],
        materials: vec!["Metal".into()],
        vertex_groups: vec![],
        shape_keys: vec![],
    };

    let sway = TransformTrack::new(
        Interpolation::Linear,
        vec![
            Keyframe {
                frame: 1,
                matrix: Mat4::IDENTITY,
            },
            Keyframe {
                frame: 5,
                matrix: Mat4::from_rotation_translation(
                    Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                    Vec3::new(0.0, 1.0, 0.0),
                ),
            },
        ],
    );

    let walk = TransformTrack::new(
        Interpolation::Linear,
        vec![
            Keyframe {
                frame: 1,
                matrix: Mat4::IDENTITY,
            },
            Keyframe {
                frame: 5,
                matrix: translation(4.0, 0.0, 0.0),
            },
        ],
    );

    let mut chest = bone("Chest", Some("Spine Ctrl"), true);
    chest.matrix_local = translation(0.0, 1.0, 0.0);
    chest.track = Some(sway);

    let mut rig = object(
        "Hero Rig",
        Some("Stage"),
        ObjectData::Armature(ArmatureData {
            bones: vec![
                bone("Hips", None, true),
                bone("Spine Ctrl", Some("Hips"), false),
                chest,
                bone("Head Top", Some("Chest"), true),
                bone("IK.Target", None, false),
                bone("Hand.L", Some("IK.Target"), true),
            ],
        }),
    );
    rig.track = Some(walk);

    let mut stage = object("Stage", None, ObjectData::Empty);
    stage.matrix_local = translation(0.0, 0.0, 10.0);

    let mut prop_object = object("Sword", Some("Hero Rig"), ObjectData::Mesh(prop));
    prop_object.hide = true;
    prop_object.matrix_local = translation(0.5, 0.0, 0.0);

    Scene {
        name: "Walk Cycle".into(),
        frame_start: 1,
        frame_end: 5,
        frame_current: 3,
        materials: vec![
            material(
                "Skin",
                &[
                    ("duke_density", PropertyValue::Float(1.0)),
                    ("duke_stiff", PropertyValue::Bool(true)),
                ],
            ),
            material(
                "Cloth",
                &[
                    ("duke_youngs modulus", PropertyValue::Float(2.5e6)),
                    ("duke_layers", PropertyValue::Int(2)),
                    ("render_only", PropertyValue::Text("x".into())),
                ],
            ),
            material("Metal", &[]),
            material("Skin", &[("duke_density", PropertyValue::Float(9.0))]),
        ],
        objects: vec![
            stage,
            rig,
            object("Torso", Some("Hero Rig"), ObjectData::Mesh(torso)),
            object("Pole Target", Some("Hero Rig"), ObjectData::Empty),
            prop_object,
        ],
        active_object: Some("Hero Rig".into()),
    }
}

/// Write `scene` as JSON into `dir`
pub fn write_scene(dir: &Path, name: &str, scene: &Scene) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, scene.to_json().expect("scene serializes")).expect("write scene");
    path
}
