//! Error Types
//!
//! This module defines the error type shared by the whole animation pipeline.
//!
//! # Overview
//!
//! [`RigError`] covers every failure mode a caller has to check:
//! - Asset import failures (file unreadable, empty scene, malformed glTF)
//! - Build failures (skeleton or animation fails structural/temporal validation)
//! - Sampling failures (animation and sampling context disagree on joint count)
//!
//! Unmatched joint/bone names during skinning are *not* errors; they silently
//! degrade to identity matrices.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, RigError>`.
//!
//! ```rust,ignore
//! use myth_rig::errors::{RigError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Which transform component of a joint track a keyframe belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackComponent {
    Translation,
    Rotation,
    Scale,
}

impl std::fmt::Display for TrackComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TrackComponent::Translation => "translation",
            TrackComponent::Rotation => "rotation",
            TrackComponent::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// The main error type of the rig pipeline.
#[derive(Error, Debug)]
pub enum RigError {
    // ========================================================================
    // Asset Import Errors
    // ========================================================================
    /// The requested asset file does not exist.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The file was read but contains nothing usable for the requested flags.
    #[error("No usable scene in asset: {0}")]
    EmptyScene(String),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// A buffer referenced by the document could not be resolved.
    #[error("Missing buffer data for buffer index {0}")]
    MissingBuffer(usize),

    // ========================================================================
    // Build Errors
    // ========================================================================
    /// The node hierarchy handed to the skeleton builder has no nodes.
    #[error("Skeleton hierarchy is empty")]
    EmptyHierarchy,

    /// Two joints share a name, which makes name-based retargeting ambiguous.
    #[error("Duplicate joint name '{name}' (joints {first} and {second})")]
    DuplicateJointName {
        name: String,
        first: usize,
        second: usize,
    },

    /// The hierarchy has more joints than a single skeleton supports.
    #[error("Too many joints: {count} (max {max})")]
    TooManyJoints { count: usize, max: usize },

    /// Animation duration must be strictly positive.
    #[error("Animation duration must be positive, got {0}")]
    NonPositiveDuration(f32),

    /// Tick rate used to convert channel times to seconds is unusable.
    #[error("Invalid ticks-per-second value: {0}")]
    InvalidTickRate(f64),

    /// Keyframe times of one track component are not strictly ascending.
    #[error("Keyframes not strictly ascending: joint {joint}, {component} key {index}")]
    KeyframesNotAscending {
        joint: usize,
        component: TrackComponent,
        index: usize,
    },

    /// A keyframe lies outside `[0, duration]`.
    #[error("Keyframe out of range: joint {joint}, {component} time {time} not in [0, {duration}]")]
    KeyframeOutOfRange {
        joint: usize,
        component: TrackComponent,
        time: f32,
        duration: f32,
    },

    // ========================================================================
    // Sampling Errors
    // ========================================================================
    /// The animation was built for a different joint count than the sampling
    /// context (or output buffer) is configured for.
    #[error("Joint count mismatch: expected {expected}, found {found}")]
    JointCountMismatch { expected: usize, found: usize },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RigError {
    /// Returns `true` for structural/temporal validation failures of the
    /// skeleton and animation builders.
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            RigError::EmptyHierarchy
                | RigError::DuplicateJointName { .. }
                | RigError::TooManyJoints { .. }
                | RigError::NonPositiveDuration(_)
                | RigError::InvalidTickRate(_)
                | RigError::KeyframesNotAscending { .. }
                | RigError::KeyframeOutOfRange { .. }
        )
    }

    /// Returns `true` for failures that mean "no asset" at import time.
    #[must_use]
    pub fn is_asset_error(&self) -> bool {
        matches!(
            self,
            RigError::AssetNotFound(_)
                | RigError::EmptyScene(_)
                | RigError::Gltf(_)
                | RigError::DataUri(_)
                | RigError::MissingBuffer(_)
                | RigError::Io(_)
        )
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

#[cfg(feature = "gltf")]
impl From<gltf::Error> for RigError {
    fn from(err: gltf::Error) -> Self {
        RigError::Gltf(err.to_string())
    }
}

#[cfg(feature = "gltf")]
impl From<base64::DecodeError> for RigError {
    fn from(err: base64::DecodeError) -> Self {
        RigError::DataUri(err.to_string())
    }
}

/// Alias for `Result<T, RigError>`.
pub type Result<T> = std::result::Result<T, RigError>;
