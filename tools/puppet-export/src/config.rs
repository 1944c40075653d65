//! export.toml parsing
//!
//! Every key is optional. Relative output paths are resolved against the
//! directory holding the config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::skeleton::ChildrenMode;

/// Prefix marking material properties for export
pub const DEFAULT_PROPERTY_PREFIX: &str = "duke_";

/// export.toml structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub puppet: PuppetSection,
    pub animation: AnimationSection,
    pub options: ExportOptions,
}

/// Static puppet pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PuppetSection {
    pub enable: bool,
    pub path: PathBuf,
}

impl Default for PuppetSection {
    fn default() -> Self {
        Self {
            enable: true,
            path: PathBuf::from("puppet.txt"),
        }
    }
}

/// Animation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationSection {
    pub enable: bool,
    pub path: PathBuf,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            enable: true,
            path: PathBuf::from("animation.txt"),
        }
    }
}

/// Options shared by both passes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Material properties starting with this prefix are exported, prefix removed
    pub property_prefix: String,

    /// How the `children` line treats non-deforming intermediate bones
    pub children: ChildrenMode,

    /// Emit a `vertex` block with per-vertex normals after the shapes
    pub vertex_normals: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            children: ChildrenMode::default(),
            vertex_normals: false,
        }
    }
}

impl ExportConfig {
    /// Load config from file, resolving output paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse export.toml")
    }

    /// Make relative output paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.puppet.path.is_relative() {
            self.puppet.path = base.join(&self.puppet.path);
        }
        if self.animation.path.is_relative() {
            self.animation.path = base.join(&self.animation.path);
        }
    }
}
