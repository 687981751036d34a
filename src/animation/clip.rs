use glam::{Quat, Vec3};
use uuid::Uuid;

use crate::animation::tracks::KeyframeTrack;
use crate::scene::transform::Transform;

/// Translation, rotation and scale keys of one joint.
///
/// Each component has its own key count and times; all three are non-empty.
#[derive(Debug, Clone)]
pub struct JointTrack {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl JointTrack {
    /// Single-key track holding `pose` for the whole clip.
    #[must_use]
    pub fn constant(pose: &Transform) -> Self {
        Self {
            translation: KeyframeTrack::constant(pose.translation),
            rotation: KeyframeTrack::constant(pose.rotation),
            scale: KeyframeTrack::constant(pose.scale),
        }
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.translation.len() + self.rotation.len() + self.scale.len()
    }
}

/// Runtime animation: one [`JointTrack`] per joint of the skeleton it was
/// built for, in that skeleton's joint order.
///
/// Immutable after construction; share it through `Arc<Animation>`.
#[derive(Debug, Clone)]
pub struct Animation {
    pub id: Uuid,
    pub name: String,
    duration: f32,
    tracks: Vec<JointTrack>,
    skeleton_id: Uuid,
}

impl Animation {
    pub(crate) fn from_validated(
        name: &str,
        duration: f32,
        tracks: Vec<JointTrack>,
        skeleton_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            duration,
            tracks,
            skeleton_id,
        }
    }

    /// Clip length in seconds, always `> 0`.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[JointTrack] {
        &self.tracks
    }

    #[inline]
    #[must_use]
    pub fn track(&self, joint: usize) -> Option<&JointTrack> {
        self.tracks.get(joint)
    }

    /// Id of the skeleton whose joint order the tracks follow.
    #[inline]
    #[must_use]
    pub fn skeleton_id(&self) -> Uuid {
        self.skeleton_id
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.tracks.iter().map(JointTrack::key_count).sum()
    }
}
