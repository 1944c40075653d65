//! Mesh records: shapes, optional normals, and padded face rows

use glam::{Mat4, Vec3};
use puppet_shared::{MeshData, Object};
use std::io::{self, Write};

use crate::config::ExportOptions;
use crate::error::{ExportError, ExportResult};
use crate::formats::{RecordKind, RecordWriter};
use crate::material::MaterialIndex;
use crate::naming::normalize;

/// Filler for face rows shorter than `ngon`
pub const FACE_PAD: i64 = -1;

/// One named set of vertex positions
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub positions: Vec<Vec3>,
}

/// Shapes of a mesh; never empty.
///
/// A mesh with shape keys has one shape per key. A mesh without them has a
/// single shape named after the mesh holding the base positions.
#[derive(Debug, Clone)]
pub struct ShapeList {
    shapes: Vec<Shape>,
}

impl ShapeList {
    pub fn from_mesh(mesh_name: &str, mesh: &MeshData) -> ExportResult<Self> {
        if mesh.shape_keys.is_empty() {
            return Ok(Self {
                shapes: vec![Shape {
                    name: normalize(mesh_name),
                    positions: mesh.vertices.iter().map(|v| v.co).collect(),
                }],
            });
        }

        let expected = mesh.vertices.len();
        let shapes = mesh
            .shape_keys
            .iter()
            .map(|key| {
                if key.data.len() != expected {
                    return Err(ExportError::ShapeMismatch {
                        mesh: mesh_name.to_string(),
                        shape: key.name.clone(),
                        expected,
                        actual: key.data.len(),
                    });
                }
                Ok(Shape {
                    name: normalize(&key.name),
                    positions: key.data.clone(),
                })
            })
            .collect::<ExportResult<Vec<_>>>()?;

        Ok(Self { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// False: a list always holds at least one shape
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }
}

/// One face: vertex indices and global material index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRow {
    pub vertices: Vec<u32>,
    pub material: usize,
}

/// Faces of one mesh, padded to the mesh's own largest polygon
#[derive(Debug, Clone)]
pub struct FaceTable {
    /// Largest face vertex count; 0 for a mesh without faces
    pub ngon: usize,
    pub rows: Vec<FaceRow>,
}

impl FaceTable {
    /// Resolve every face's material slot to a scene-wide index
    pub fn build(mesh_name: &str, mesh: &MeshData, materials: &MaterialIndex) -> ExportResult<Self> {
        let ngon = mesh
            .polygons
            .iter()
            .map(|p| p.vertices.len())
            .max()
            .unwrap_or(0);

        let rows = mesh
            .polygons
            .iter()
            .enumerate()
            .map(|(face, polygon)| {
                let slot = polygon.material_index;
                let name = mesh.materials.get(slot).ok_or_else(|| {
                    ExportError::MissingMaterialSlot {
                        mesh: mesh_name.to_string(),
                        face,
                        slot,
                        slots: mesh.materials.len(),
                    }
                })?;
                let material =
                    materials
                        .resolve(name)
                        .ok_or_else(|| ExportError::UnresolvedMaterial {
                            mesh: mesh_name.to_string(),
                            face,
                            material: name.clone(),
                        })?;
                Ok(FaceRow {
                    vertices: polygon.vertices.clone(),
                    material,
                })
            })
            .collect::<ExportResult<Vec<_>>>()?;

        Ok(Self { ngon, rows })
    }

    /// `i0 i1 ... -1 -1 ,material`; every index is followed by a space
    pub fn format_row(&self, row: &FaceRow) -> String {
        let mut line = String::with_capacity(self.ngon * 4 + 4);
        for v in &row.vertices {
            line.push_str(&v.to_string());
            line.push(' ');
        }
        for _ in row.vertices.len()..self.ngon {
            line.push_str(&FACE_PAD.to_string());
            line.push(' ');
        }
        line.push(',');
        line.push_str(&row.material.to_string());
        line
    }
}

/// A mesh child of the armature, ready to write
#[derive(Debug, Clone)]
pub struct MeshRecord {
    pub name: String,
    pub visible: bool,
    /// Transform relative to the armature
    pub pose: Mat4,
    pub vertex_count: usize,
    pub shapes: ShapeList,
    pub normals: Option<Vec<Vec3>>,
    pub faces: FaceTable,
}

impl MeshRecord {
    pub fn gather(
        object: &Object,
        mesh: &MeshData,
        pose: Mat4,
        materials: &MaterialIndex,
        options: &ExportOptions,
    ) -> ExportResult<Self> {
        let shapes = ShapeList::from_mesh(&object.name, mesh)?;
        let faces = FaceTable::build(&object.name, mesh, materials)?;
        let normals = options
            .vertex_normals
            .then(|| mesh.vertices.iter().map(|v| v.normal).collect());

        tracing::debug!(
            "Mesh '{}': {} shapes, {} vertices, {} faces (ngon {})",
            object.name,
            shapes.len(),
            mesh.vertices.len(),
            faces.rows.len(),
            faces.ngon
        );

        Ok(Self {
            name: normalize(&object.name),
            visible: !object.hide,
            pose,
            vertex_count: mesh.vertices.len(),
            shapes,
            normals,
            faces,
        })
    }
}

pub fn write_mesh<W: Write>(w: &mut RecordWriter<W>, mesh: &MeshRecord) -> io::Result<()> {
    w.begin(RecordKind::Mesh)?;
    w.field("name", &mesh.name)?;
    w.field("visible", if mesh.visible { "True" } else { "False" })?;
    w.matrix_field("pose", &mesh.pose)?;
    w.field("shapes", mesh.shapes.len())?;
    w.field("vertices", mesh.vertex_count)?;
    w.field("faces", mesh.faces.rows.len())?;
    w.end()?;

    for shape in mesh.shapes.iter() {
        w.begin(RecordKind::Shape)?;
        w.field("name", &shape.name)?;
        for p in &shape.positions {
            w.vector(*p)?;
        }
        w.end()?;
    }

    if let Some(normals) = &mesh.normals {
        w.begin(RecordKind::Vertex)?;
        for n in normals {
            w.vector(*n)?;
        }
        w.end()?;
    }

    w.begin(RecordKind::Face)?;
    w.field("ngon", mesh.faces.ngon)?;
    for row in &mesh.faces.rows {
        w.line(&mesh.faces.format_row(row))?;
    }
    w.end()
}
