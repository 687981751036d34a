//! Keyframe reduction.
//!
//! Drops interior keys that interpolation between the surviving neighbours
//! reproduces within a tolerance. Rotation and scale errors are converted to
//! a positional error measured at `distance` from the joint, so one tolerance
//! (in model units) covers all three components.

use glam::{Quat, Vec3};

use crate::animation::clip::{Animation, JointTrack};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeOptimizer {
    /// Maximum accepted error, in model units.
    pub tolerance: f32,
    /// Distance from the joint at which rotation/scale error is measured.
    pub distance: f32,
}

impl Default for KeyframeOptimizer {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            distance: 1e-1,
        }
    }
}

impl KeyframeOptimizer {
    #[must_use]
    pub fn new(tolerance: f32, distance: f32) -> Self {
        Self {
            tolerance,
            distance,
        }
    }

    /// Returns a reduced copy of `animation`; the input is left untouched.
    #[must_use]
    pub fn optimize(&self, animation: &Animation) -> Animation {
        let tracks = animation
            .tracks()
            .iter()
            .map(|track| {
                let mut track = track.clone();
                self.optimize_track(&mut track);
                track
            })
            .collect();

        Animation::from_validated(
            &animation.name,
            animation.duration(),
            tracks,
            animation.skeleton_id(),
        )
    }

    pub fn optimize_track(&self, track: &mut JointTrack) {
        let distance = self.distance;
        decimate(&mut track.translation, self.tolerance, |a: Vec3, b: Vec3| a.distance(b));
        decimate(&mut track.rotation, self.tolerance, |a: Quat, b: Quat| {
            a.angle_between(b) * distance
        });
        decimate(&mut track.scale, self.tolerance, |a: Vec3, b: Vec3| {
            a.distance(b) * distance
        });
    }
}

/// Greedy forward reduction; the first and last keys always survive.
fn decimate<T, F>(track: &mut KeyframeTrack<T>, tolerance: f32, error: F)
where
    T: Interpolatable,
    F: Fn(T, T) -> f32,
{
    let len = track.len();
    if len <= 2 || track.interpolation != InterpolationMode::Linear {
        return;
    }

    let mut keep = Vec::with_capacity(len);
    keep.push(0usize);
    let mut anchor = 0usize;

    for end in 2..len {
        let (t0, v0) = (track.times[anchor], track.values[anchor]);
        let (t1, v1) = (track.times[end], track.values[end]);
        let span = t1 - t0;

        let within = (anchor + 1..end).all(|mid| {
            let alpha = if span > 0.0 {
                (track.times[mid] - t0) / span
            } else {
                0.0
            };
            let approx = T::interpolate_linear(v0, v1, alpha);
            error(approx, track.values[mid]) <= tolerance
        });

        if !within {
            anchor = end - 1;
            keep.push(anchor);
        }
    }
    keep.push(len - 1);

    if keep.len() == len {
        return;
    }

    track.times = keep.iter().map(|&i| track.times[i]).collect();
    track.values = keep.iter().map(|&i| track.values[i]).collect();
}
