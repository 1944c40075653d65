//! puppet-export - Puppet text exporter
//!
//! Exports the active armature of a scene document as a static puppet file
//! and a sampled animation file.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use puppet_export::{
    host::Rig, run_export, skeleton::Skeleton, ChildrenMode, DocumentHost, ExportConfig, Host,
};

#[derive(Parser)]
#[command(name = "puppet-export")]
#[command(about = "Puppet scene exporter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the active armature
    Export {
        /// Scene document (JSON)
        scene: PathBuf,

        /// Path to export.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Puppet output file (overrides config)
        #[arg(long)]
        puppet: Option<PathBuf>,

        /// Animation output file (overrides config)
        #[arg(long)]
        animation: Option<PathBuf>,

        /// Skip the puppet pass
        #[arg(long)]
        no_puppet: bool,

        /// Skip the animation pass
        #[arg(long)]
        no_animation: bool,
    },

    /// List what an export would include
    Inspect {
        /// Scene document (JSON)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            scene,
            config,
            puppet,
            animation,
            no_puppet,
            no_animation,
        } => {
            let mut config = match config {
                Some(path) => ExportConfig::load(&path)?,
                None => ExportConfig::default(),
            };
            if let Some(path) = puppet {
                config.puppet.path = path;
            }
            if let Some(path) = animation {
                config.animation.path = path;
            }
            if no_puppet {
                config.puppet.enable = false;
            }
            if no_animation {
                config.animation.enable = false;
            }

            tracing::info!("Loading scene {:?}", scene);
            let mut host = DocumentHost::load(&scene)?;
            let report = run_export(&mut host, &config);

            let failed = report.failures().len();
            if failed > 0 {
                bail!("{} export pass(es) failed", failed);
            }
            tracing::info!("Done!");
        }

        Commands::Inspect { scene } => {
            let host = DocumentHost::load(&scene)?;
            inspect(&host)?;
        }
    }

    Ok(())
}

fn inspect(host: &DocumentHost) -> Result<()> {
    let rig = Rig::active(host)?;
    let range = host.frame_range();
    tracing::info!("Scene '{}'", host.scene_name());
    tracing::info!(
        "Frames {}..={} ({} frames)",
        range.start,
        range.end,
        range.len()
    );
    tracing::info!("Armature '{}'", rig.name());

    for (object, mesh) in &rig.meshes {
        tracing::info!(
            "  mesh '{}': {} vertices, {} faces, {} shape keys",
            object.name,
            mesh.vertices.len(),
            mesh.polygons.len(),
            mesh.shape_keys.len()
        );
    }

    let skeleton = Skeleton::build(rig.bones, ChildrenMode::default())?;
    let mut nodes = skeleton.bones().iter().peekable();
    for (i, bone) in rig.bones.iter().enumerate() {
        let Some(node) = nodes.next_if(|n| n.source == i) else {
            tracing::info!("  bone '{}' (not deforming)", bone.name);
            continue;
        };
        let parent = node
            .parent
            .map(|p| skeleton.bone(&skeleton.bones()[p]).name.as_str())
            .unwrap_or(rig.name());
        tracing::info!(
            "  bone '{}' -> parent '{}', {} children",
            bone.name,
            parent,
            node.children.len()
        );
    }
    Ok(())
}
