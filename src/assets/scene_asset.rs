use std::path::Path;
use std::sync::Arc;

use crate::animation::builder::{AnimationBuildOptions, AnimationBuilder, AnimationStats};
use crate::animation::clip::Animation;
use crate::assets::import::{AssetBundle, AssetImporter, LoadFlags};
use crate::errors::Result;
use crate::scene::EntityKey;
use crate::scene::scene::Scene;
use crate::scene::skeleton::Skeleton;
use crate::scene::skeleton_builder::SkeletonBuilder;
use crate::scene::skinning::MeshBoneTable;

/// Fully built, shareable assets of one imported file.
///
/// The skeleton is built from the whole node hierarchy. Animations that fail
/// to build are left out (the builder logs why); the others stay usable.
#[derive(Debug, Clone, Default)]
pub struct SceneAsset {
    pub source: String,
    pub skeleton: Option<Arc<Skeleton>>,
    pub meshes: Vec<Arc<MeshBoneTable>>,
    pub animations: Vec<Arc<Animation>>,
    /// Build statistics, parallel to `animations`.
    pub stats: Vec<AnimationStats>,
}

impl SceneAsset {
    /// Imports `path` and builds everything it contains.
    pub fn load(
        importer: &dyn AssetImporter,
        path: &Path,
        flags: LoadFlags,
        options: AnimationBuildOptions,
    ) -> Result<Self> {
        let bundle = importer.import(path, flags)?;
        Self::from_bundle(bundle, options)
    }

    /// Runs the skeleton and animation builders over an imported bundle.
    ///
    /// Fails only if the skeleton cannot be built.
    pub fn from_bundle(bundle: AssetBundle, options: AnimationBuildOptions) -> Result<Self> {
        let AssetBundle {
            source,
            hierarchy,
            meshes,
            animations,
        } = bundle;

        let skeleton = if hierarchy.is_empty() {
            None
        } else {
            Some(Arc::new(SkeletonBuilder::build_forest(&source, &hierarchy)?))
        };

        let mut asset = Self {
            source,
            skeleton,
            meshes: meshes.into_iter().map(Arc::new).collect(),
            animations: Vec::with_capacity(animations.len()),
            stats: Vec::with_capacity(animations.len()),
        };

        match &asset.skeleton {
            Some(skeleton) => {
                let builder = AnimationBuilder::new(options);
                for raw in &animations {
                    let mut stats = AnimationStats::default();
                    if let Ok(animation) = builder.build(skeleton, raw, Some(&mut stats)) {
                        asset.animations.push(Arc::new(animation));
                        asset.stats.push(stats);
                    }
                }
            }
            None if !animations.is_empty() => {
                log::warn!(
                    "'{}': {} animations ignored, no skeleton was loaded",
                    asset.source,
                    animations.len()
                );
            }
            None => {}
        }

        Ok(asset)
    }

    #[must_use]
    pub fn find_animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// Spawns an idle entity pairing the skeleton with `meshes[mesh_index]`.
    ///
    /// `None` without a skeleton or for an out-of-range mesh index.
    pub fn spawn(&self, scene: &mut Scene, mesh_index: usize) -> Option<EntityKey> {
        let skeleton = self.skeleton.as_ref()?;
        let mesh = self.meshes.get(mesh_index)?;
        Some(scene.spawn(Arc::clone(skeleton), Arc::clone(mesh)))
    }
}
