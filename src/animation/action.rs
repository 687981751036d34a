use std::sync::Arc;

use crate::animation::clip::Animation;
use crate::animation::sampling::{self, SamplingContext};
use crate::errors::Result;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;

/// What happens when elapsed time reaches the clip duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Restart exactly at 0; any overshoot past `duration` is dropped.
    #[default]
    Restart,
    /// Wrap by modulo, keeping the overshoot.
    Carry,
    /// Stop at `duration` and hold until another animation is bound.
    Once,
}

/// Observable state of a [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No animation bound; sampling yields the rest pose.
    Idle,
    /// Animation bound and time advancing.
    Playing,
}

/// Per-entity playback: bound animation, elapsed time and sampling scratch.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    animation: Option<Arc<Animation>>,
    elapsed: f32,

    pub loop_mode: LoopMode,
    /// User pause. Survives animation swaps.
    pub paused: bool,
    finished: bool,

    context: SamplingContext,
    mismatch_logged: bool,
}

impl PlaybackState {
    /// Idle state for a skeleton with `joint_count` joints.
    #[must_use]
    pub fn new(joint_count: usize) -> Self {
        Self {
            animation: None,
            elapsed: 0.0,
            loop_mode: LoopMode::Restart,
            paused: false,
            finished: false,
            context: SamplingContext::new(joint_count),
            mismatch_logged: false,
        }
    }

    /// Binds (or with `None`, clears) the animation and restarts at 0.
    ///
    /// `Idle -> Playing`, `Playing -> Playing` (swap) or `Playing -> Idle`.
    /// The [`paused`](Self::paused) flag is left as it was.
    pub fn set_animation(&mut self, animation: Option<Arc<Animation>>) {
        self.animation = animation;
        self.elapsed = 0.0;
        self.finished = false;
        self.mismatch_logged = false;
        self.context.invalidate();
    }

    pub fn clear_animation(&mut self) {
        self.set_animation(None);
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        if self.animation.is_some() {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Idle
        }
    }

    /// A [`LoopMode::Once`] animation reached its end.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Elapsed time in seconds, always within `[0, duration]`.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// `elapsed / duration`, `0.0` when idle.
    #[must_use]
    pub fn time_ratio(&self) -> f32 {
        match &self.animation {
            Some(animation) => (self.elapsed / animation.duration()).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Advances elapsed time by `dt` seconds. Negative `dt` is ignored.
    pub fn update(&mut self, dt: f32) {
        if self.paused || self.finished {
            return;
        }
        let Some(animation) = &self.animation else {
            return;
        };

        let duration = animation.duration();
        self.elapsed += dt.max(0.0);

        if self.elapsed >= duration {
            match self.loop_mode {
                LoopMode::Restart => self.elapsed = 0.0,
                LoopMode::Carry => self.elapsed %= duration,
                LoopMode::Once => {
                    self.elapsed = duration;
                    self.finished = true;
                }
            }
        }
    }

    /// Writes this frame's local transforms.
    ///
    /// Idle: the rest pose is copied verbatim. Playing: the bound animation is
    /// sampled at [`time_ratio`](Self::time_ratio). A joint count mismatch
    /// leaves `output` as it was and is logged once per bound animation.
    pub fn sample_local(&mut self, skeleton: &Skeleton, output: &mut Vec<Transform>) -> Result<()> {
        let Some(animation) = &self.animation else {
            skeleton.copy_rest_pose(output);
            return Ok(());
        };

        if output.len() != skeleton.num_joints() {
            skeleton.copy_rest_pose(output);
        }

        let ratio = self.time_ratio();
        let result = sampling::sample(animation, ratio, &mut self.context, output);

        if let Err(err) = &result
            && !self.mismatch_logged
        {
            log::warn!(
                "Skipping sampling of animation '{}' for skeleton '{}': {err}",
                animation.name,
                skeleton.name
            );
            self.mismatch_logged = true;
        }

        result
    }

    /// Re-sizes the sampling context after the skeleton changed.
    pub fn resize(&mut self, joint_count: usize) {
        self.context.resize(joint_count);
        self.mismatch_logged = false;
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &SamplingContext {
        &self.context
    }
}
