//! Sampling Engine
//!
//! Evaluates every joint track of an [`Animation`] at a normalized time ratio
//! and writes one local-space [`Transform`] per joint.
//!
//! Translation and scale are interpolated linearly, rotation with
//! shortest-path slerp; each component searches its own key interval. Outside
//! a track's key range the first/last key is held.

use uuid::Uuid;

use crate::animation::clip::Animation;
use crate::animation::tracks::KeyframeCursor;
use crate::errors::{Result, RigError};
use crate::scene::transform::Transform;

/// Cursor triple of one joint (translation, rotation, scale).
#[derive(Debug, Clone, Copy, Default)]
struct JointCursor {
    translation: KeyframeCursor,
    rotation: KeyframeCursor,
    scale: KeyframeCursor,
}

/// Per-entity scratch state for [`sample`].
///
/// Holds the cached keyframe intervals of every joint so consecutive frames
/// do not search from scratch. Sized for one skeleton's joint count; never
/// share one context between entities.
#[derive(Debug, Clone, Default)]
pub struct SamplingContext {
    cursors: Vec<JointCursor>,
    animation: Option<Uuid>,
}

impl SamplingContext {
    #[must_use]
    pub fn new(joint_count: usize) -> Self {
        Self {
            cursors: vec![JointCursor::default(); joint_count],
            animation: None,
        }
    }

    /// Re-sizes the context for another skeleton; cached intervals are dropped.
    pub fn resize(&mut self, joint_count: usize) {
        self.cursors.clear();
        self.cursors.resize(joint_count, JointCursor::default());
        self.animation = None;
    }

    /// Drops cached intervals while keeping the joint count.
    pub fn invalidate(&mut self) {
        self.cursors.fill(JointCursor::default());
        self.animation = None;
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.cursors.len()
    }
}

/// Samples `animation` at `ratio` (clamped to `[0, 1]`) into `output`.
///
/// Fails without touching `output` when the animation, the context and the
/// output buffer disagree on the joint count.
pub fn sample(
    animation: &Animation,
    ratio: f32,
    context: &mut SamplingContext,
    output: &mut [Transform],
) -> Result<()> {
    let joint_count = context.joint_count();
    if animation.num_tracks() != joint_count {
        return Err(RigError::JointCountMismatch {
            expected: joint_count,
            found: animation.num_tracks(),
        });
    }
    if output.len() != joint_count {
        return Err(RigError::JointCountMismatch {
            expected: joint_count,
            found: output.len(),
        });
    }

    if context.animation != Some(animation.id) {
        context.invalidate();
        context.animation = Some(animation.id);
    }

    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let time = ratio * animation.duration();

    for ((track, cursor), out) in animation
        .tracks()
        .iter()
        .zip(context.cursors.iter_mut())
        .zip(output.iter_mut())
    {
        // Tracks are non-empty by construction; keep the previous value otherwise.
        if let Some(t) = track.translation.sample_with_cursor(time, &mut cursor.translation) {
            out.translation = t;
        }
        if let Some(r) = track.rotation.sample_with_cursor(time, &mut cursor.rotation) {
            out.rotation = r;
        }
        if let Some(s) = track.scale.sample_with_cursor(time, &mut cursor.scale) {
            out.scale = s;
        }
    }

    Ok(())
}
