//! Scene document types
//!
//! A scene is a flat list of objects linked by parent name, mirroring how the
//! host stores them. Matrices are serialized as 16 floats in column-major
//! order (glam's serde layout).

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::track::TransformTrack;

/// Root of a captured host scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub name: String,

    /// First frame of the playback range (inclusive)
    #[serde(default = "default_frame_start")]
    pub frame_start: i32,

    /// Last frame of the playback range (inclusive)
    #[serde(default = "default_frame_end")]
    pub frame_end: i32,

    /// Frame the host was showing when the scene was captured
    #[serde(default = "default_frame_start")]
    pub frame_current: i32,

    /// Scene-wide material collection, in host order
    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub objects: Vec<Object>,

    /// Name of the selected object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_object: Option<String>,
}

fn default_frame_start() -> i32 {
    1
}

fn default_frame_end() -> i32 {
    250
}

impl Scene {
    /// Parse a scene document from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the scene document to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Find an object by name (first match)
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// The selected object, if it exists
    pub fn active(&self) -> Option<&Object> {
        self.active_object.as_deref().and_then(|name| self.object(name))
    }

    /// Objects parented to `parent`, in document order
    pub fn children<'a>(&'a self, parent: &str) -> impl Iterator<Item = &'a Object> {
        self.objects
            .iter()
            .filter(move |o| o.parent.as_deref() == Some(parent))
    }
}

/// A scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Object {
    pub name: String,

    /// Name of the parent object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Transform relative to the parent (identity by default)
    #[serde(default)]
    pub matrix_local: Mat4,

    /// Hidden in the viewport
    #[serde(default)]
    pub hide: bool,

    /// Keyframed `matrix_local`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TransformTrack>,

    pub data: ObjectData,
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self.data {
            ObjectData::Armature(_) => ObjectKind::Armature,
            ObjectData::Mesh(_) => ObjectKind::Mesh,
            ObjectData::Empty => ObjectKind::Empty,
        }
    }

    pub fn as_armature(&self) -> Option<&ArmatureData> {
        match &self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Object payload, tagged by host object type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ObjectData {
    Armature(ArmatureData),
    Mesh(MeshData),
    Empty,
}

/// Host object type without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Armature,
    Mesh,
    Empty,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Armature => "ARMATURE",
            ObjectKind::Mesh => "MESH",
            ObjectKind::Empty => "EMPTY",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Armature payload: the bone list in host traversal order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmatureData {
    #[serde(default)]
    pub bones: Vec<Bone>,
}

/// A single bone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bone {
    pub name: String,

    /// Name of the parent bone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Whether the bone deforms meshes
    #[serde(default = "default_true")]
    pub use_deform: bool,

    /// Rest pose in armature space
    #[serde(default)]
    pub matrix_local: Mat4,

    /// Keyframed pose in armature space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TransformTrack>,
}

fn default_true() -> bool {
    true
}

/// Mesh payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshData {
    #[serde(default)]
    pub vertices: Vec<Vertex>,

    #[serde(default)]
    pub polygons: Vec<Polygon>,

    /// Material slot names (mesh-local index space)
    #[serde(default)]
    pub materials: Vec<String>,

    /// Vertex group names, indexed by `GroupWeight::group`
    #[serde(default)]
    pub vertex_groups: Vec<String>,

    /// Shape keys in key order; empty when the mesh has none
    #[serde(default)]
    pub shape_keys: Vec<ShapeKey>,
}

impl MeshData {
    /// Index of the first vertex group called `name`
    pub fn vertex_group_index(&self, name: &str) -> Option<usize> {
        self.vertex_groups.iter().position(|g| g == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vertex {
    pub co: Vec3,

    #[serde(default)]
    pub normal: Vec3,

    /// Vertex group memberships
    #[serde(default)]
    pub groups: Vec<GroupWeight>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupWeight {
    pub group: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Polygon {
    pub vertices: Vec<u32>,

    /// Mesh-local material slot
    #[serde(default)]
    pub material_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeKey {
    pub name: String,
    /// Positions parallel to the mesh vertices
    pub data: Vec<Vec3>,
}

/// A material with its custom properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Material {
    pub name: String,

    /// Custom properties in host enumeration order
    #[serde(default)]
    pub properties: Vec<CustomProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomProperty {
    pub key: String,
    pub value: PropertyValue,
}

/// Scalar custom property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(true) => f.write_str("True"),
            PropertyValue::Bool(false) => f.write_str("False"),
            PropertyValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the fractional part ("1.0", not "1")
            PropertyValue::Float(v) => write!(f, "{:?}", v),
            PropertyValue::Text(v) => f.write_str(v),
        }
    }
}
