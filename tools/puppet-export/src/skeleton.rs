//! Deformation skeleton
//!
//! Only deforming bones are exported. Links are recomputed over the filtered
//! set: a deforming bone's parent is its nearest deforming ancestor, or the
//! armature itself when there is none.

use glam::Mat4;
use hashbrown::HashMap;
use puppet_shared::{Bone, MeshData, Object};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::error::{ExportError, ExportResult};
use crate::formats::{RecordKind, RecordWriter};
use crate::matrix::format_scalar;
use crate::naming::normalize;

/// Which bones the `children` line lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildrenMode {
    /// Direct children that deform; grandchildren behind a non-deforming
    /// bone are not listed
    #[default]
    Direct,
    /// Deforming bones whose nearest deforming ancestor is this bone
    Bridged,
}

/// One deforming bone in the filtered hierarchy
#[derive(Debug, Clone)]
pub struct SkeletonBone {
    /// Position in the host bone list
    pub source: usize,
    /// Position of the parent in [`Skeleton::bones`]; `None` means the armature
    pub parent: Option<usize>,
    /// Positions in [`Skeleton::bones`], in bone-list order
    pub children: Vec<usize>,
}

/// Arena of deforming bones in bone-list order
#[derive(Debug, Clone)]
pub struct Skeleton<'a> {
    source: &'a [Bone],
    bones: Vec<SkeletonBone>,
}

impl<'a> Skeleton<'a> {
    pub fn build(bones: &'a [Bone], mode: ChildrenMode) -> ExportResult<Self> {
        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            by_name.entry(bone.name.as_str()).or_insert(i);
        }

        let direct_parent = bones
            .iter()
            .map(|bone| match bone.parent.as_deref() {
                None => Ok(None),
                Some(parent) => by_name.get(parent).copied().map(Some).ok_or_else(|| {
                    ExportError::UnknownParentBone {
                        bone: bone.name.clone(),
                        parent: parent.to_string(),
                    }
                }),
            })
            .collect::<ExportResult<Vec<_>>>()?;

        // Every chain is walked, so a loop among non-deforming bones is still reported
        let deform_ancestor = (0..bones.len())
            .map(|i| nearest_deforming_ancestor(bones, &direct_parent, i))
            .collect::<ExportResult<Vec<_>>>()?;

        let slot: HashMap<usize, usize> = bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.use_deform)
            .enumerate()
            .map(|(slot, (source, _))| (source, slot))
            .collect();

        let link = |source: usize| match mode {
            ChildrenMode::Bridged => deform_ancestor[source],
            ChildrenMode::Direct => direct_parent[source].filter(|p| bones[*p].use_deform),
        };

        let mut arena: Vec<SkeletonBone> = bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.use_deform)
            .map(|(source, _)| SkeletonBone {
                source,
                parent: deform_ancestor[source].and_then(|p| slot.get(&p).copied()),
                children: Vec::new(),
            })
            .collect();

        for child in 0..arena.len() {
            if let Some(owner) = link(arena[child].source).and_then(|p| slot.get(&p).copied()) {
                arena[owner].children.push(child);
            }
        }

        Ok(Self {
            source: bones,
            bones: arena,
        })
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[SkeletonBone] {
        &self.bones
    }

    /// Host bone behind an arena entry
    pub fn bone(&self, node: &SkeletonBone) -> &'a Bone {
        &self.source[node.source]
    }
}

fn nearest_deforming_ancestor(
    bones: &[Bone],
    direct_parent: &[Option<usize>],
    start: usize,
) -> ExportResult<Option<usize>> {
    let mut current = direct_parent[start];
    let mut steps = 0;
    while let Some(i) = current {
        if steps >= bones.len() {
            return Err(ExportError::BoneCycle(bones[start].name.clone()));
        }
        steps += 1;

        if bones[i].use_deform {
            return Ok(Some(i));
        }
        current = direct_parent[i];
    }
    Ok(None)
}

/// `(vertex index, weight)` pairs of one mesh for one bone
#[derive(Debug, Clone)]
pub struct WeightsRecord {
    pub mesh: String,
    pub weights: Vec<(usize, f32)>,
}

/// Weights of the vertex group named after `bone`, in ascending vertex order.
///
/// A mesh without such a group has no weights for the bone. A vertex listing
/// the group more than once contributes its first entry only.
pub fn skin_weights(mesh: &MeshData, bone: &str) -> Vec<(usize, f32)> {
    let Some(group) = mesh.vertex_group_index(bone) else {
        return Vec::new();
    };

    mesh.vertices
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            v.groups
                .iter()
                .find(|g| g.group == group)
                .map(|g| (i, g.weight))
        })
        .collect()
}

/// A deforming bone ready to write
#[derive(Debug, Clone)]
pub struct BoneRecord {
    pub name: String,
    pub parent: String,
    pub children: Vec<String>,
    /// Rest pose in armature space
    pub pose: Mat4,
    /// One entry per mesh child, in child order
    pub weights: Vec<WeightsRecord>,
}

impl BoneRecord {
    /// Records for every deforming bone, in bone-list order
    pub fn gather_all(
        skeleton: &Skeleton<'_>,
        armature: &Object,
        meshes: &[(&Object, &MeshData)],
    ) -> Vec<Self> {
        skeleton
            .bones()
            .iter()
            .map(|node| {
                let bone = skeleton.bone(node);
                let parent = match node.parent {
                    Some(p) => normalize(&skeleton.bone(&skeleton.bones()[p]).name),
                    None => normalize(&armature.name),
                };
                let children = node
                    .children
                    .iter()
                    .map(|c| normalize(&skeleton.bone(&skeleton.bones()[*c]).name))
                    .collect();

                let weights: Vec<WeightsRecord> = meshes
                    .iter()
                    .map(|(object, mesh)| WeightsRecord {
                        mesh: normalize(&object.name),
                        weights: skin_weights(mesh, &bone.name),
                    })
                    .collect();

                if !meshes.is_empty() && weights.iter().all(|w| w.weights.is_empty()) {
                    tracing::warn!("Deforming bone '{}' has no skin weights on any mesh", bone.name);
                }

                Self {
                    name: normalize(&bone.name),
                    parent,
                    children,
                    pose: bone.matrix_local,
                    weights,
                }
            })
            .collect()
    }
}

pub fn write_bone<W: Write>(w: &mut RecordWriter<W>, bone: &BoneRecord) -> io::Result<()> {
    w.begin(RecordKind::Bone)?;
    w.field("name", &bone.name)?;
    w.field("parent", &bone.parent)?;
    w.field("children", bone.children.len())?;
    if !bone.children.is_empty() {
        let list: String = bone.children.iter().map(|c| format!(" {}", c)).collect();
        w.line(&list)?;
    }
    w.matrix_field("pose", &bone.pose)?;
    w.end()?;

    for record in &bone.weights {
        w.begin(RecordKind::Weights)?;
        w.field("name", &record.mesh)?;
        w.field("weights", record.weights.len())?;
        for (vertex, weight) in &record.weights {
            w.line(&format!("{} {}", vertex, format_scalar(*weight)))?;
        }
        w.end()?;
    }
    Ok(())
}
