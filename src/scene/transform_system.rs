//! Hierarchy Propagator
//!
//! Composes per-joint local transforms into model (skeleton-root) space.
//!
//! Relies on the topological invariant of [`Skeleton`]: a parent's model
//! transform is always computed before any of its children, so one forward
//! pass over the joint array is enough. The invariant is guaranteed by the
//! builder and only re-checked in debug builds.

use glam::Affine3A;

use crate::errors::{Result, RigError};
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;

/// `model[i] = model[parent[i]] * local[i]` (identity parent for roots).
///
/// `model` is resized to the joint count. Fails if `local` does not hold one
/// transform per joint.
pub fn propagate(skeleton: &Skeleton, local: &[Transform], model: &mut Vec<Affine3A>) -> Result<()> {
    let joint_count = skeleton.num_joints();
    if local.len() != joint_count {
        return Err(RigError::JointCountMismatch {
            expected: joint_count,
            found: local.len(),
        });
    }

    model.clear();
    model.reserve(joint_count);

    for (index, (joint, local)) in skeleton.joints().iter().zip(local).enumerate() {
        let local_matrix = local.to_affine();
        let world = match joint.parent_index() {
            Some(parent) => {
                debug_assert!(parent < index, "joint {index} visited before its parent {parent}");
                model[parent] * local_matrix
            }
            None => local_matrix,
        };
        model.push(world);
    }

    Ok(())
}

/// Convenience wrapper allocating a fresh output buffer.
pub fn propagate_to_vec(skeleton: &Skeleton, local: &[Transform]) -> Result<Vec<Affine3A>> {
    let mut model = Vec::with_capacity(skeleton.num_joints());
    propagate(skeleton, local, &mut model)?;
    Ok(model)
}

/// Model-space transforms of the skeleton's rest pose.
#[must_use]
pub fn rest_pose_model_transforms(skeleton: &Skeleton) -> Vec<Affine3A> {
    let mut model: Vec<Affine3A> = Vec::with_capacity(skeleton.num_joints());
    for joint in skeleton.joints() {
        let local_matrix = joint.rest_pose.to_affine();
        let world = match joint.parent_index() {
            Some(parent) => model[parent] * local_matrix,
            None => local_matrix,
        };
        model.push(world);
    }
    model
}
