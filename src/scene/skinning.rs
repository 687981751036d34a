//! Skinning Resolver
//!
//! Bridges two independently indexed bone sets: skeleton joints (topological
//! order) and mesh bone slots (the order the mesh's vertex joint indices refer
//! to). The only correspondence is the joint/bone name.
//!
//! The name lookup is resolved once per (skeleton, mesh) pairing into a dense
//! [`BoneRemap`] table; [`resolve`] performs the per-name lookup directly and
//! [`resolve_with_remap`] replays the precomputed table. Both produce identical
//! results:
//! - every slot starts as identity
//! - joints absent from the mesh are skipped
//! - slots no joint maps to stay identity

use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::scene::skeleton::Skeleton;

/// Per-mesh bone table: name → slot and per-slot inverse bind pose.
#[derive(Debug, Clone)]
pub struct MeshBoneTable {
    pub id: Uuid,
    pub name: String,

    slot_names: Vec<String>,
    inverse_bind_poses: Vec<Mat4>,
    name_to_slot: FxHashMap<String, usize>,
}

impl MeshBoneTable {
    /// Creates a table; slot index = position in `bones`.
    ///
    /// If two slots share a name, lookups resolve to the first one and the
    /// later slot is never written by the resolver.
    pub fn new<I, S>(name: &str, bones: I) -> Self
    where
        I: IntoIterator<Item = (S, Mat4)>,
        S: Into<String>,
    {
        let mut slot_names = Vec::new();
        let mut inverse_bind_poses = Vec::new();
        let mut name_to_slot = FxHashMap::default();

        for (slot, (bone_name, ibm)) in bones.into_iter().enumerate() {
            let bone_name = bone_name.into();
            if let Some(&first) = name_to_slot.get(&bone_name) {
                log::warn!(
                    "Mesh '{name}': bone '{bone_name}' appears in slots {first} and {slot}; slot {slot} will stay identity"
                );
            } else {
                name_to_slot.insert(bone_name.clone(), slot);
            }
            slot_names.push(bone_name);
            inverse_bind_poses.push(ibm);
        }

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slot_names,
            inverse_bind_poses,
            name_to_slot,
        }
    }

    /// A table with no bones (static, non-skinned mesh).
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self::new::<_, String>(name, std::iter::empty())
    }

    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.inverse_bind_poses.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inverse_bind_poses.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.name_to_slot.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn slot_name(&self, slot: usize) -> Option<&str> {
        self.slot_names.get(slot).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_pose(&self, slot: usize) -> Option<&Mat4> {
        self.inverse_bind_poses.get(slot)
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_poses(&self) -> &[Mat4] {
        &self.inverse_bind_poses
    }
}

/// Dense joint-index → slot-index table for one (skeleton, mesh) pairing.
#[derive(Debug, Clone)]
pub struct BoneRemap {
    pub skeleton_id: Uuid,
    pub mesh_id: Uuid,
    joint_to_slot: Vec<Option<u32>>,
    slot_count: usize,
}

impl BoneRemap {
    #[must_use]
    pub fn new(skeleton: &Skeleton, mesh: &MeshBoneTable) -> Self {
        let joint_to_slot: Vec<Option<u32>> = skeleton
            .joints()
            .iter()
            .map(|joint| mesh.find_slot(&joint.name).map(|slot| slot as u32))
            .collect();

        let remap = Self {
            skeleton_id: skeleton.id,
            mesh_id: mesh.id,
            joint_to_slot,
            slot_count: mesh.slot_count(),
        };

        let unmatched = remap.unmatched_slots(mesh).count();
        if unmatched > 0 {
            log::debug!(
                "Skeleton '{}' / mesh '{}': {} of {} bone slots have no matching joint",
                skeleton.name,
                mesh.name,
                unmatched,
                mesh.slot_count()
            );
        }

        remap
    }

    #[inline]
    #[must_use]
    pub fn joint_slot(&self, joint: usize) -> Option<usize> {
        self.joint_to_slot.get(joint).copied().flatten().map(|s| s as usize)
    }

    #[inline]
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joint_to_slot.len()
    }

    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of joints that drive a mesh slot.
    #[must_use]
    pub fn matched_joints(&self) -> usize {
        self.joint_to_slot.iter().filter(|s| s.is_some()).count()
    }

    /// Slots of `mesh` that no joint of the paired skeleton maps to.
    pub fn unmatched_slots<'a>(&'a self, mesh: &'a MeshBoneTable) -> impl Iterator<Item = usize> + 'a {
        (0..mesh.slot_count()).filter(move |slot| {
            !self
                .joint_to_slot
                .iter()
                .any(|s| s.is_some_and(|s| s as usize == *slot))
        })
    }

    #[must_use]
    pub fn matches(&self, skeleton: &Skeleton, mesh: &MeshBoneTable) -> bool {
        self.skeleton_id == skeleton.id && self.mesh_id == mesh.id
    }
}

/// One 4x4 matrix per mesh bone slot, recomputed every frame.
#[derive(Debug, Clone, Default)]
pub struct SkinningMatrices {
    matrices: Vec<Mat4>,
}

impl SkinningMatrices {
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; slot_count],
        }
    }

    /// Resizes to `slot_count` and sets every slot to identity.
    pub fn reset(&mut self, slot_count: usize) {
        self.matrices.clear();
        self.matrices.resize(slot_count, Mat4::IDENTITY);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Raw bytes for a GPU storage/uniform buffer upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Mat4> {
        self.matrices.get(slot)
    }
}

/// Resolves skinning matrices with a per-joint name lookup.
///
/// `skin[slot] = model[joint] * inverse_bind_pose[slot]` for every joint whose
/// name exists in `mesh`.
pub fn resolve(
    skeleton: &Skeleton,
    model_transforms: &[Affine3A],
    mesh: &MeshBoneTable,
    output: &mut SkinningMatrices,
) {
    output.reset(mesh.slot_count());

    for (joint, model) in skeleton.joints().iter().zip(model_transforms) {
        let Some(slot) = mesh.find_slot(&joint.name) else {
            continue;
        };
        output.matrices[slot] = Mat4::from(*model) * mesh.inverse_bind_poses[slot];
    }
}

/// Resolves skinning matrices through a precomputed [`BoneRemap`].
pub fn resolve_with_remap(
    remap: &BoneRemap,
    model_transforms: &[Affine3A],
    mesh: &MeshBoneTable,
    output: &mut SkinningMatrices,
) {
    debug_assert_eq!(remap.mesh_id, mesh.id, "BoneRemap paired with a different mesh");
    output.reset(mesh.slot_count());

    for (slot, model) in remap.joint_to_slot.iter().zip(model_transforms) {
        let Some(slot) = slot.map(|s| s as usize) else {
            continue;
        };
        if let (Some(dst), Some(ibm)) = (output.matrices.get_mut(slot), mesh.inverse_bind_poses.get(slot)) {
            *dst = Mat4::from(*model) * *ibm;
        }
    }
}
