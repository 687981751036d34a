//! Imported (unvalidated) animation data.
//!
//! Channels target joints by node name and express key times in ticks; the
//! [`AnimationBuilder`](crate::animation::builder::AnimationBuilder) converts
//! them to seconds and aligns them with a skeleton's joint order.

use glam::{Quat, Vec3};

use crate::animation::tracks::InterpolationMode;

/// A `(time, value)` pair. `time` is in ticks until the builder converts it.
///
/// Ticks stay `f64` so a key at `duration_ticks` converts to exactly the
/// clip duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Keyframes targeting one node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub node_name: String,
    /// Converts key times to seconds: `seconds = ticks / ticks_per_second`.
    pub ticks_per_second: f64,
    pub translation_keys: Vec<Keyframe<Vec3>>,
    pub rotation_keys: Vec<Keyframe<Quat>>,
    pub scale_keys: Vec<Keyframe<Vec3>>,
    pub interpolation: InterpolationMode,
}

impl AnimationChannel {
    /// Empty channel with key times in seconds.
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ticks_per_second: 1.0,
            translation_keys: Vec::new(),
            rotation_keys: Vec::new(),
            scale_keys: Vec::new(),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[must_use]
    pub fn with_ticks_per_second(mut self, ticks_per_second: f64) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.translation_keys.len() + self.rotation_keys.len() + self.scale_keys.len()
    }
}

/// An imported clip: a set of named channels plus the clip length in ticks.
#[derive(Debug, Clone)]
pub struct ImportedAnimation {
    pub name: String,
    pub duration_ticks: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<AnimationChannel>,
}

impl ImportedAnimation {
    pub fn new(name: impl Into<String>, duration_ticks: f64, ticks_per_second: f64) -> Self {
        Self {
            name: name.into(),
            duration_ticks,
            ticks_per_second,
            channels: Vec::new(),
        }
    }

    /// First channel targeting `node_name`.
    #[must_use]
    pub fn find_channel(&self, node_name: &str) -> Option<&AnimationChannel> {
        self.channels.iter().find(|c| c.node_name == node_name)
    }
}
