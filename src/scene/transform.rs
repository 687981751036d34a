use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// Rigid transform in TRS form (translation, rotation, scale).
///
/// Used for joint rest poses and for the per-frame local transform buffer.
/// Composition into model space happens on [`Affine3A`], see
/// [`transform_system`](crate::scene::transform_system).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Decomposes a local matrix (e.g. an imported node transform).
    ///
    /// Shear is lost in the decomposition.
    #[must_use]
    pub fn from_matrix(mat: Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Helper: build a rotation from Euler angles (XYZ order).
    #[must_use]
    pub fn from_euler(translation: Vec3, x: f32, y: f32, z: f32) -> Self {
        Self {
            translation,
            rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            scale: Vec3::ONE,
        }
    }

    /// Local matrix as `Affine3A` (what the hierarchy propagator composes).
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Transform {
    fn from(mat: Mat4) -> Self {
        Self::from_matrix(mat)
    }
}
