//! Material records and global material indices

use hashbrown::HashMap;
use puppet_shared::{Material, PropertyValue};
use std::io::{self, Write};

use crate::formats::{RecordKind, RecordWriter};
use crate::naming::normalize;

/// A material ready to write
#[derive(Debug, Clone)]
pub struct MaterialRecord {
    pub name: String,
    /// (normalized key without prefix, value), in host property order
    pub properties: Vec<(String, PropertyValue)>,
}

impl MaterialRecord {
    /// Keep the properties whose key starts with `prefix`
    pub fn from_material(material: &Material, prefix: &str) -> Self {
        let properties = material
            .properties
            .iter()
            .filter_map(|p| {
                p.key
                    .strip_prefix(prefix)
                    .map(|key| (normalize(key), p.value.clone()))
            })
            .collect();

        Self {
            name: normalize(&material.name),
            properties,
        }
    }
}

pub fn write_material<W: Write>(w: &mut RecordWriter<W>, material: &MaterialRecord) -> io::Result<()> {
    w.begin(RecordKind::Material)?;
    w.field("name", &material.name)?;
    w.field("properties", material.properties.len())?;
    for (key, value) in &material.properties {
        w.field(key, value)?;
    }
    w.end()
}

/// Scene-wide material positions by name; the first material with a name wins
#[derive(Debug, Clone, Default)]
pub struct MaterialIndex {
    by_name: HashMap<String, usize>,
}

impl MaterialIndex {
    pub fn build(materials: &[Material]) -> Self {
        let mut by_name = HashMap::with_capacity(materials.len());
        for (i, material) in materials.iter().enumerate() {
            by_name.entry(material.name.clone()).or_insert(i);
        }
        Self { by_name }
    }

    /// Global index of the material called `name`
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Distinct names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
