use std::sync::Arc;

use glam::{Affine3A, Mat4};

use crate::animation::action::PlaybackState;
use crate::errors::Result;
use crate::scene::skeleton::Skeleton;
use crate::scene::skinning::{self, BoneRemap, MeshBoneTable, SkinningMatrices};
use crate::scene::transform::Transform;
use crate::scene::transform_system;

/// One skinned character: shared immutable assets plus its own pose buffers.
///
/// Buffers are sized once at spawn and reused every frame.
#[derive(Debug, Clone)]
pub struct AnimatedEntity {
    pub(crate) skeleton: Arc<Skeleton>,
    pub(crate) mesh: Arc<MeshBoneTable>,
    pub(crate) remap: Arc<BoneRemap>,

    pub(crate) playback: PlaybackState,

    pub(crate) local: Vec<Transform>,
    pub(crate) model: Vec<Affine3A>,
    pub(crate) skinning: SkinningMatrices,

    pub world_transform: Affine3A,
}

impl AnimatedEntity {
    pub(crate) fn new(skeleton: Arc<Skeleton>, mesh: Arc<MeshBoneTable>, remap: Arc<BoneRemap>) -> Self {
        let joint_count = skeleton.num_joints();
        let mut local = Vec::with_capacity(joint_count);
        skeleton.copy_rest_pose(&mut local);
        let model = transform_system::rest_pose_model_transforms(&skeleton);

        let mut skinning = SkinningMatrices::new(mesh.slot_count());
        skinning::resolve_with_remap(&remap, &model, &mesh, &mut skinning);

        Self {
            playback: PlaybackState::new(joint_count),
            skeleton,
            mesh,
            remap,
            local,
            model,
            skinning,
            world_transform: Affine3A::IDENTITY,
        }
    }

    /// Advance, sample, propagate and resolve for one frame.
    ///
    /// A sampling failure keeps last frame's local pose; the rest of the
    /// pipeline still runs so the output stays consistent with it, and the
    /// sampling error is returned afterwards.
    pub(crate) fn tick(&mut self, dt: f32) -> Result<()> {
        self.playback.update(dt);

        let sampled = self.playback.sample_local(&self.skeleton, &mut self.local);

        transform_system::propagate(&self.skeleton, &self.local, &mut self.model).inspect_err(|err| {
            log::error!("Hierarchy propagation failed for '{}': {err}", self.skeleton.name);
        })?;

        skinning::resolve_with_remap(&self.remap, &self.model, &self.mesh, &mut self.skinning);
        sampled
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> &Arc<MeshBoneTable> {
        &self.mesh
    }

    #[inline]
    #[must_use]
    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    #[inline]
    pub fn playback_mut(&mut self) -> &mut PlaybackState {
        &mut self.playback
    }

    /// Local transforms of the last frame, joint order.
    #[inline]
    #[must_use]
    pub fn local_pose(&self) -> &[Transform] {
        &self.local
    }

    /// Model-space transforms of the last frame, joint order.
    #[inline]
    #[must_use]
    pub fn model_transforms(&self) -> &[Affine3A] {
        &self.model
    }

    /// Skinning matrices of the last frame, mesh slot order.
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        self.skinning.as_slice()
    }

    #[inline]
    #[must_use]
    pub fn skinning(&self) -> &SkinningMatrices {
        &self.skinning
    }
}
