use glam::{Quat, Vec3};

/// Values a keyframe track can interpolate between.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    /// Shortest-path spherical interpolation.
    ///
    /// `Quat::slerp` already flips `end` when the dot product is negative,
    /// so `q` and `-q` keys never take the long way round.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}
