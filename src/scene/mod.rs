//! Skeleton, pose and entity side of the pipeline.
//!
//! - Transform: local TRS value
//! - Skeleton / SkeletonBuilder: topologically ordered joints
//! - transform_system: local to model space propagation
//! - skinning: mesh bone tables and skinning matrices
//! - Scene: entity container and per-frame update

pub mod transform;
pub mod skeleton;
pub mod skeleton_builder;
pub mod transform_system;
pub mod skinning;
pub mod entity;
pub mod scene;

pub use transform::Transform;
pub use skeleton::{Joint, NO_PARENT, Skeleton};
pub use skeleton_builder::{MAX_JOINTS, SkeletonBuilder};
pub use skinning::{BoneRemap, MeshBoneTable, SkinningMatrices};
pub use entity::AnimatedEntity;
pub use scene::{Scene, SkinnedRenderer};

use slotmap::new_key_type;

new_key_type! {
    pub struct EntityKey;
}
