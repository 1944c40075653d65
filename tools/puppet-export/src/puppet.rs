//! Static puppet export (materials, meshes, skeleton, skin weights)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::ExportOptions;
use crate::error::{ExportError, ExportResult};
use crate::formats::{RecordKind, RecordWriter};
use crate::host::{Host, Rig};
use crate::material::{write_material, MaterialIndex, MaterialRecord};
use crate::mesh::{write_mesh, MeshRecord};
use crate::naming::normalize;
use crate::skeleton::{write_bone, BoneRecord, Skeleton};

/// Everything the puppet file holds, gathered before anything is written
#[derive(Debug, Clone)]
pub struct Puppet {
    pub name: String,
    pub materials: Vec<MaterialRecord>,
    pub meshes: Vec<MeshRecord>,
    pub bones: Vec<BoneRecord>,
}

/// Counts reported after a successful puppet export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuppetSummary {
    pub materials: usize,
    pub meshes: usize,
    pub bones: usize,
}

impl Puppet {
    /// Read and validate the active armature
    pub fn gather<H: Host>(host: &H, options: &ExportOptions) -> ExportResult<Self> {
        let rig = Rig::active(host)?;
        let skeleton = Skeleton::build(rig.bones, options.children)?;

        let scene_materials = host.materials();
        let index = MaterialIndex::build(scene_materials);
        if index.len() < scene_materials.len() {
            tracing::warn!(
                "{} duplicate material names; faces use the first occurrence",
                scene_materials.len() - index.len()
            );
        }

        let materials = scene_materials
            .iter()
            .map(|m| MaterialRecord::from_material(m, &options.property_prefix))
            .collect();

        let meshes = rig
            .meshes
            .iter()
            .map(|(object, mesh)| {
                let pose = host.matrix_local(&object.name)?;
                MeshRecord::gather(object, mesh, pose, &index, options)
            })
            .collect::<ExportResult<Vec<_>>>()?;

        let bones = BoneRecord::gather_all(&skeleton, rig.armature, &rig.meshes);

        Ok(Self {
            name: normalize(rig.name()),
            materials,
            meshes,
            bones,
        })
    }

    pub fn summary(&self) -> PuppetSummary {
        PuppetSummary {
            materials: self.materials.len(),
            meshes: self.meshes.len(),
            bones: self.bones.len(),
        }
    }
}

pub fn write_puppet<W: Write>(w: &mut RecordWriter<W>, puppet: &Puppet) -> io::Result<()> {
    w.begin(RecordKind::Puppet)?;
    w.field("name", &puppet.name)?;
    w.field("materials", puppet.materials.len())?;
    w.field("meshes", puppet.meshes.len())?;
    w.field("bones", puppet.bones.len())?;
    w.end()?;

    for material in &puppet.materials {
        write_material(w, material)?;
    }
    for mesh in &puppet.meshes {
        write_mesh(w, mesh)?;
    }
    for bone in &puppet.bones {
        write_bone(w, bone)?;
    }
    w.flush()
}

/// Gather the puppet and write it to `path`.
///
/// The file is only created once the scene has been validated.
pub fn export_puppet<H: Host>(
    host: &H,
    path: &Path,
    options: &ExportOptions,
) -> ExportResult<PuppetSummary> {
    let puppet = Puppet::gather(host, options)?;

    let resource = |source: io::Error| ExportError::Resource {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(resource)?;
    let mut writer = RecordWriter::new(BufWriter::new(file));
    write_puppet(&mut writer, &puppet).map_err(resource)?;

    let summary = puppet.summary();
    tracing::info!(
        "Wrote puppet '{}' to {:?} ({} materials, {} meshes, {} bones)",
        puppet.name,
        path,
        summary.materials,
        summary.meshes,
        summary.bones
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DocumentHost;
    use puppet_shared::Scene;

    fn host(json: &str) -> DocumentHost {
        DocumentHost::new(Scene::from_json(json).unwrap()).unwrap()
    }

    const TWO_MESHES: &str = r#"{
        "name": "Scene",
        "active_object": "Rig",
        "materials": [ { "name": "Skin" }, { "name": "Cloth" } ],
        "objects": [
            { "name": "Rig", "data": { "type": "ARMATURE", "bones": [
                { "name": "Hips" }, { "name": "IK", "use_deform": false } ] } },
            { "name": "Shirt", "parent": "Rig", "data": { "type": "MESH",
                "vertices": [ { "co": [0,0,0] }, { "co": [1,0,0] }, { "co": [0,1,0] } ],
                "polygons": [ { "vertices": [0,1,2] } ], "materials": ["Cloth"] } },
            { "name": "Pole", "parent": "Rig", "data": { "type": "EMPTY" } },
            { "name": "Cube", "parent": "Rig", "data": { "type": "MESH" } }
        ]
    }"#;

    #[test]
    fn test_gather_counts() {
        let puppet = Puppet::gather(&host(TWO_MESHES), &ExportOptions::default()).unwrap();
        assert_eq!(
            puppet.summary(),
            PuppetSummary {
                materials: 2,
                meshes: 2,
                bones: 1
            }
        );
        assert_eq!(puppet.meshes[0].faces.rows[0].material, 1);
        assert_eq!(puppet.bones[0].weights.len(), 2);
    }

    #[test]
    fn test_header_then_records_in_order() {
        let puppet = Puppet::gather(&host(TWO_MESHES), &ExportOptions::default()).unwrap();
        let mut w = RecordWriter::new(Vec::new());
        write_puppet(&mut w, &puppet).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();

        assert!(text.starts_with("type : puppet\nname : Rig\nmaterials : 2\nmeshes : 2\nbones : 1\n\n"));
        let kinds: Vec<_> = text
            .lines()
            .filter_map(|l| l.strip_prefix("type : "))
            .collect();
        assert_eq!(
            kinds,
            vec![
                "puppet", "material", "material", "mesh", "shape", "face", "mesh", "shape", "face",
                "bone", "weights", "weights"
            ]
        );
    }

    #[test]
    fn test_invalid_scene_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puppet.txt");
        let broken = TWO_MESHES.replace(r#""materials": ["Cloth"]"#, r#""materials": ["Denim"]"#);

        let err = export_puppet(&host(&broken), &path, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::UnresolvedMaterial { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("puppet.txt");
        let err = export_puppet(&host(TWO_MESHES), &path, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::Resource { path: ref p, .. } if *p == path));
    }
}
