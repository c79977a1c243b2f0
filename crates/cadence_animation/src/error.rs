//! Error types for cadence_animation

use crate::handle::AnimationHandle;
use thiserror::Error;

/// Errors reported by the animation scheduler
///
/// Scheduling operations on unknown or finished handles are silent no-ops and
/// never produce these; they surface from typed payload access, configuration
/// loading, and invariant checks.
#[derive(Error, Debug)]
pub enum AnimationError {
    /// The handle does not refer to a live animation or group
    #[error("unknown animation handle {0}")]
    UnknownHandle(AnimationHandle),

    /// The payload exists but has a different type
    #[error("payload of {handle} is a {found}, not a {expected}")]
    PayloadType {
        handle: AnimationHandle,
        expected: &'static str,
        found: &'static str,
    },

    /// A table references an individual animation that has no record
    #[error("no animation record for {0}")]
    MissingRecord(AnimationHandle),

    /// Cross-reference tables disagree with each other
    #[error("scheduler invariant violated: {0}")]
    Invariant(String),

    /// Configuration values are out of range
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("failed to parse scheduler config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("failed to read scheduler config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cadence_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
