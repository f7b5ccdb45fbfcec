//! Error types.
//!
//! The planning core has no fatal path for valid-shaped input: `InputError` is
//! raised only at the request boundary and `CollaboratorError` is always caught
//! at the call site.

use thiserror::Error;

/// Rejection of a malformed planning request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("tasks cannot be empty")]
    EmptyTasks,

    #[error("day must be YYYY-MM-DD, got '{0}'")]
    MalformedDay(String),

    #[error("work hours must be within 0..=23, got {0}")]
    HourOutOfRange(u32),

    #[error("work day must end after it starts ({start}:00 >= {end}:00)")]
    EmptyWorkDay { start: u32, end: u32 },

    #[error("unknown energy profile: {0}")]
    UnknownProfile(String),

    #[error("unknown effort tier: {0} (expected low, medium or high)")]
    UnknownEffort(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Failure of an optional external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable")]
    Unavailable,

    #[error("collaborator timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response rejected: {0}")]
    Rejected(String),
}
