//! Rig Inspector
//!
//! Loads a glTF file, builds its skeleton and animations, spawns one entity
//! per skinned mesh and plays every animation for a few simulated frames.
//!
//! Usage: `rig_inspect <file.gltf|file.glb> [frames] [--optimize]`

use std::path::PathBuf;

use anyhow::{Context, bail};
use glam::{Affine3A, Mat4, Vec3};

use myth_rig::{
    AnimationBuildOptions, GltfImporter, LoadFlags, Scene, SceneAsset, SkinnedRenderer,
};

const FRAME_DT: f32 = 1.0 / 60.0;

/// Stand-in renderer: tracks how far skinning moved vertices at the origin.
#[derive(Default)]
struct SummaryRenderer {
    entities: usize,
    max_offset: f32,
}

impl SkinnedRenderer for SummaryRenderer {
    fn submit(&mut self, world_transform: &Affine3A, skinning_matrices: &[Mat4]) {
        self.entities += 1;
        let world = Mat4::from(*world_transform);
        for skin in skinning_matrices {
            let moved = (world * *skin).transform_point3(Vec3::ZERO);
            self.max_offset = self.max_offset.max(moved.length());
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: rig_inspect <file.gltf|file.glb> [frames] [--optimize]");
    };

    let mut frames = 120usize;
    let mut options = AnimationBuildOptions::default();
    for arg in args {
        if arg == "--optimize" {
            options.optimize = true;
        } else {
            frames = arg.parse().with_context(|| format!("invalid frame count '{arg}'"))?;
        }
    }

    let asset = SceneAsset::load(&GltfImporter::new(), &path, LoadFlags::ALL, options)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let Some(skeleton) = &asset.skeleton else {
        bail!("{} contains no node hierarchy", path.display());
    };
    log::info!(
        "Skeleton '{}': {} joints, {} roots",
        skeleton.name,
        skeleton.num_joints(),
        skeleton.roots().count()
    );

    for (animation, stats) in asset.animations.iter().zip(&asset.stats) {
        log::info!(
            "Animation '{}': {:.3}s, keys raw {} / final {} / optimized {}, {} unanimated joints",
            animation.name,
            animation.duration(),
            stats.raw_keys,
            stats.final_keys,
            stats.optimized_keys,
            stats.unanimated_joints
        );
    }

    let mut scene = Scene::new();
    let entities: Vec<_> = (0..asset.meshes.len())
        .filter_map(|index| asset.spawn(&mut scene, index))
        .collect();
    if entities.is_empty() {
        log::warn!("No skinned meshes found; nothing to animate");
        return Ok(());
    }
    for mesh in &asset.meshes {
        log::info!("Mesh '{}': {} bone slots", mesh.name, mesh.slot_count());
    }

    // `None` first: the rest pose baseline.
    let selections = std::iter::once(None).chain(asset.animations.iter().cloned().map(Some));
    for selection in selections {
        let label = selection.as_ref().map_or("<rest pose>", |a| a.name.as_str()).to_string();
        for &key in &entities {
            scene.set_animation(key, selection.clone());
        }

        for _ in 0..frames {
            scene.update(FRAME_DT);
        }

        let mut renderer = SummaryRenderer::default();
        scene.extract(&mut renderer);
        log::info!(
            "{label}: {} entities after {frames} frames, max skinned origin offset {:.4}",
            renderer.entities,
            renderer.max_offset
        );
    }

    Ok(())
}
