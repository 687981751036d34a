//! Animation Builder
//!
//! Aligns imported channels with a skeleton: the output holds exactly one
//! [`JointTrack`] per joint, in joint order. Joints without a matching channel
//! (and channel components without keys) hold their rest pose as a single key
//! at time 0, so every track is non-empty and sampling treats all joints the
//! same way.
//!
//! Validation is all-or-nothing: a non-positive duration, a non-ascending key
//! sequence or a key outside `[0, duration]` fails the whole animation.

use std::mem::size_of;

use glam::{Quat, Vec3};

use crate::animation::clip::{Animation, JointTrack};
use crate::animation::optimizer::KeyframeOptimizer;
use crate::animation::raw::{AnimationChannel, ImportedAnimation, Keyframe};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::animation::values::Interpolatable;
use crate::errors::{Result, RigError, TrackComponent};
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;

const VEC3_KEY_SIZE: usize = size_of::<f32>() + size_of::<Vec3>();
const QUAT_KEY_SIZE: usize = size_of::<f32>() + size_of::<Quat>();

/// Build-time settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationBuildOptions {
    /// Run the keyframe optimizer on the built tracks.
    pub optimize: bool,
    /// See [`KeyframeOptimizer::tolerance`].
    pub tolerance: f32,
    /// See [`KeyframeOptimizer::distance`].
    pub distance: f32,
}

impl Default for AnimationBuildOptions {
    fn default() -> Self {
        let optimizer = KeyframeOptimizer::default();
        Self {
            optimize: false,
            tolerance: optimizer.tolerance,
            distance: optimizer.distance,
        }
    }
}

/// Statistics sink filled by [`AnimationBuilder::build`].
///
/// Sizes are in bytes of key data (time + value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationStats {
    /// Keys taken from matching channels.
    pub raw_keys: usize,
    pub raw_size: usize,
    /// Keys after rest-pose filling, before optimization.
    pub final_keys: usize,
    pub final_size: usize,
    /// Keys after optimization (equal to `final_*` when not optimizing).
    pub optimized_keys: usize,
    pub optimized_size: usize,
    /// Joints that got a rest-pose track because no channel matched.
    pub unanimated_joints: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationBuilder {
    pub options: AnimationBuildOptions,
}

impl AnimationBuilder {
    #[must_use]
    pub fn new(options: AnimationBuildOptions) -> Self {
        Self { options }
    }

    /// Builds an animation for `skeleton` from `source`.
    ///
    /// On failure a diagnostic is logged and no animation is produced.
    pub fn build(
        &self,
        skeleton: &Skeleton,
        source: &ImportedAnimation,
        stats: Option<&mut AnimationStats>,
    ) -> Result<Animation> {
        self.build_inner(skeleton, source, stats).inspect_err(|err| {
            log::error!("Animation '{}' building failed: {err}", source.name);
        })
    }

    fn build_inner(
        &self,
        skeleton: &Skeleton,
        source: &ImportedAnimation,
        stats: Option<&mut AnimationStats>,
    ) -> Result<Animation> {
        let duration = ticks_to_seconds(source.duration_ticks, source.ticks_per_second)?;
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(RigError::NonPositiveDuration(duration));
        }

        let mut local_stats = AnimationStats::default();
        let mut tracks = Vec::with_capacity(skeleton.num_joints());

        for (joint_index, joint) in skeleton.joints().iter().enumerate() {
            let track = match source.find_channel(&joint.name) {
                Some(channel) => {
                    local_stats.raw_keys += channel.key_count();
                    local_stats.raw_size += channel_size(channel);
                    convert_channel(channel, &joint.rest_pose)?
                }
                None => {
                    local_stats.unanimated_joints += 1;
                    JointTrack::constant(&joint.rest_pose)
                }
            };
            validate_track(joint_index, &track, duration)?;
            tracks.push(track);
        }

        local_stats.final_keys = tracks.iter().map(JointTrack::key_count).sum();
        local_stats.final_size = tracks.iter().map(track_size).sum();

        if self.options.optimize {
            let optimizer = KeyframeOptimizer::new(self.options.tolerance, self.options.distance);
            for track in &mut tracks {
                optimizer.optimize_track(track);
            }
        }

        local_stats.optimized_keys = tracks.iter().map(JointTrack::key_count).sum();
        local_stats.optimized_size = tracks.iter().map(track_size).sum();

        log::debug!(
            "Built animation '{}' ({:.3}s, {} tracks, {} keys, {} unanimated joints)",
            source.name,
            duration,
            tracks.len(),
            local_stats.optimized_keys,
            local_stats.unanimated_joints
        );

        if let Some(stats) = stats {
            *stats = local_stats;
        }

        Ok(Animation::from_validated(&source.name, duration, tracks, skeleton.id))
    }
}

fn ticks_to_seconds(ticks: f64, ticks_per_second: f64) -> Result<f32> {
    if !(ticks_per_second > 0.0 && ticks_per_second.is_finite()) {
        return Err(RigError::InvalidTickRate(ticks_per_second));
    }
    Ok((ticks / ticks_per_second) as f32)
}

fn convert_channel(channel: &AnimationChannel, rest: &Transform) -> Result<JointTrack> {
    let tps = channel.ticks_per_second;
    let mode = channel.interpolation;

    Ok(JointTrack {
        translation: convert_keys(&channel.translation_keys, tps, mode, rest.translation, |v| v)?,
        rotation: convert_keys(&channel.rotation_keys, tps, mode, rest.rotation, normalize_rotation)?,
        scale: convert_keys(&channel.scale_keys, tps, mode, rest.scale, |v| v)?,
    })
}

fn convert_keys<T, F>(
    keys: &[Keyframe<T>],
    ticks_per_second: f64,
    interpolation: InterpolationMode,
    rest: T,
    map: F,
) -> Result<KeyframeTrack<T>>
where
    T: Interpolatable,
    F: Fn(T) -> T,
{
    if keys.is_empty() {
        return Ok(KeyframeTrack::constant(rest));
    }

    let mut times = Vec::with_capacity(keys.len());
    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        times.push(ticks_to_seconds(key.time, ticks_per_second)?);
        values.push(map(key.value));
    }
    Ok(KeyframeTrack::new(times, values, interpolation))
}

fn validate_track(joint: usize, track: &JointTrack, duration: f32) -> Result<()> {
    validate_times(joint, TrackComponent::Translation, &track.translation.times, duration)?;
    validate_times(joint, TrackComponent::Rotation, &track.rotation.times, duration)?;
    validate_times(joint, TrackComponent::Scale, &track.scale.times, duration)
}

fn validate_times(joint: usize, component: TrackComponent, times: &[f32], duration: f32) -> Result<()> {
    for (index, &time) in times.iter().enumerate() {
        if !(0.0..=duration).contains(&time) {
            return Err(RigError::KeyframeOutOfRange {
                joint,
                component,
                time,
                duration,
            });
        }
        if index > 0 && time <= times[index - 1] {
            return Err(RigError::KeyframesNotAscending {
                joint,
                component,
                index,
            });
        }
    }
    Ok(())
}

fn channel_size(channel: &AnimationChannel) -> usize {
    (channel.translation_keys.len() + channel.scale_keys.len()) * VEC3_KEY_SIZE
        + channel.rotation_keys.len() * QUAT_KEY_SIZE
}

fn track_size(track: &JointTrack) -> usize {
    (track.translation.len() + track.scale.len()) * VEC3_KEY_SIZE
        + track.rotation.len() * QUAT_KEY_SIZE
}

fn normalize_rotation(q: Quat) -> Quat {
    let length = q.length();
    if length > f32::EPSILON && length.is_finite() {
        q / length
    } else {
        Quat::IDENTITY
    }
}
