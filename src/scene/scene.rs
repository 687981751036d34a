use std::sync::Arc;

use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::animation::action::LoopMode;
use crate::animation::clip::Animation;
use crate::animation::system::AnimationSystem;
use crate::scene::EntityKey;
use crate::scene::entity::AnimatedEntity;
use crate::scene::skeleton::Skeleton;
use crate::scene::skinning::{BoneRemap, MeshBoneTable};

/// Consumer of the per-frame output.
///
/// Receives one call per entity with its world transform and its skinning
/// matrices in mesh slot order.
pub trait SkinnedRenderer {
    fn submit(&mut self, world_transform: &Affine3A, skinning_matrices: &[Mat4]);
}

/// Owns all animated entities and the shared bone remap tables.
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) entities: SlotMap<EntityKey, AnimatedEntity>,
    remaps: FxHashMap<(Uuid, Uuid), Arc<BoneRemap>>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an idle entity (rest pose) for a built skeleton and mesh.
    pub fn spawn(&mut self, skeleton: Arc<Skeleton>, mesh: Arc<MeshBoneTable>) -> EntityKey {
        let remap = self.remap_for(&skeleton, &mesh);
        let entity = AnimatedEntity::new(skeleton, mesh, remap);
        self.entities.insert(entity)
    }

    /// Removes an entity. Its remap table is dropped from the cache once no
    /// other entity uses it.
    pub fn despawn(&mut self, key: EntityKey) -> Option<AnimatedEntity> {
        let entity = self.entities.remove(key)?;
        let pair = (entity.skeleton.id, entity.mesh.id);
        // The cache and the removed entity hold the last two references.
        if self
            .remaps
            .get(&pair)
            .is_some_and(|remap| Arc::strong_count(remap) <= 2)
        {
            self.remaps.remove(&pair);
        }
        Some(entity)
    }

    /// Binds `animation` (or clears it with `None`) and restarts at time 0.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn set_animation(&mut self, key: EntityKey, animation: Option<Arc<Animation>>) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };

        if let Some(animation) = &animation
            && animation.skeleton_id() != entity.skeleton.id
        {
            log::debug!(
                "Animation '{}' was built for another skeleton than '{}'",
                animation.name,
                entity.skeleton.name
            );
        }

        entity.playback.set_animation(animation);
        true
    }

    pub fn set_loop_mode(&mut self, key: EntityKey, loop_mode: LoopMode) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        entity.playback.loop_mode = loop_mode;
        true
    }

    pub fn set_paused(&mut self, key: EntityKey, paused: bool) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        entity.playback.paused = paused;
        true
    }

    pub fn set_world_transform(&mut self, key: EntityKey, world_transform: Affine3A) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        entity.world_transform = world_transform;
        true
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&AnimatedEntity> {
        self.entities.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut AnimatedEntity> {
        self.entities.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &AnimatedEntity)> {
        self.entities.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Runs one frame of the animation pipeline for every entity.
    ///
    /// Returns the number of entities whose animation could not be sampled
    /// this frame (they keep their previous pose).
    pub fn update(&mut self, dt: f32) -> usize {
        AnimationSystem::update(self, dt)
    }

    /// Hands every entity's world transform and skinning matrices to `renderer`.
    pub fn extract(&self, renderer: &mut dyn SkinnedRenderer) {
        for entity in self.entities.values() {
            renderer.submit(&entity.world_transform, entity.skinning_matrices());
        }
    }

    /// Number of cached (skeleton, mesh) remap tables.
    #[must_use]
    pub fn remap_count(&self) -> usize {
        self.remaps.len()
    }

    fn remap_for(&mut self, skeleton: &Skeleton, mesh: &MeshBoneTable) -> Arc<BoneRemap> {
        self.remaps
            .entry((skeleton.id, mesh.id))
            .or_insert_with(|| Arc::new(BoneRemap::new(skeleton, mesh)))
            .clone()
    }
}
