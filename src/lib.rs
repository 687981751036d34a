#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod scene;
pub mod animation;
pub mod assets;

pub use errors::{Result, RigError, TrackComponent};
pub use scene::{
    AnimatedEntity, BoneRemap, EntityKey, Joint, MeshBoneTable, Scene, Skeleton, SkeletonBuilder,
    SkinnedRenderer, SkinningMatrices, Transform,
};
pub use animation::{
    Animation, AnimationBuildOptions, AnimationBuilder, AnimationChannel, AnimationStats,
    AnimationSystem, ImportedAnimation, InterpolationMode, JointTrack, Keyframe, KeyframeOptimizer,
    LoopMode, PlaybackState, PlaybackStatus, SamplingContext,
};
pub use assets::{AssetBundle, AssetImporter, ImportedNode, LoadFlags, SceneAsset};
#[cfg(feature = "gltf")]
pub use assets::GltfImporter;
