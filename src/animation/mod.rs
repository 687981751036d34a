mod values;
pub mod tracks;
pub mod raw;
pub mod clip;
pub mod builder;
pub mod optimizer;
pub mod sampling;
pub mod action;
pub mod system;

pub use values::Interpolatable;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use raw::{AnimationChannel, ImportedAnimation, Keyframe};
pub use clip::{Animation, JointTrack};
pub use builder::{AnimationBuildOptions, AnimationBuilder, AnimationStats};
pub use optimizer::KeyframeOptimizer;
pub use sampling::{SamplingContext, sample};
pub use action::{LoopMode, PlaybackState, PlaybackStatus};
pub use system::AnimationSystem;
