#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::scene::Scene;

/// Animation system.
///
/// Drives the per-frame pipeline of every entity: advance playback, sample
/// local pose (rest pose when idle), propagate to model space, resolve
/// skinning matrices. Entities share only immutable assets, so with the
/// `parallel` feature they are updated on the rayon pool.
pub struct AnimationSystem;

impl AnimationSystem {
    /// Updates all entities of `scene` by `dt` seconds.
    ///
    /// Returns how many entities kept last frame's pose because their
    /// animation could not be sampled.
    pub fn update(scene: &mut Scene, dt: f32) -> usize {
        #[cfg(feature = "parallel")]
        let skipped = {
            let mut entities: Vec<_> = scene.entities.values_mut().collect();
            entities
                .par_iter_mut()
                .map(|entity| entity.tick(dt))
                .filter(Result::is_err)
                .count()
        };

        #[cfg(not(feature = "parallel"))]
        let skipped = scene
            .entities
            .values_mut()
            .map(|entity| entity.tick(dt))
            .filter(Result::is_err)
            .count();

        skipped
    }
}
