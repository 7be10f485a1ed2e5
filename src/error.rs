//! Error types
//!
//! `Error` covers configuration, data and invariant failures and is what the
//! public API returns. `PolicyError` is narrower: the tick loop swallows it
//! (logging a warning) and the bird simply doesn't jump that tick.

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration values that can't produce a playable world
    #[error("configuration error: {0}")]
    Config(String),

    /// No pipe ahead of a live bird. The spawn cadence is supposed to rule
    /// this out, so hitting it means the world is in a broken state.
    #[error("no pipe ahead of x = {x}")]
    NoPipeAhead { x: f32 },

    /// A line in an observation log couldn't be parsed
    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Model weights failed validation
    #[error("model error: {0}")]
    Model(String),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inference failure inside a decision policy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("observation is not finite: {0:?}")]
    NonFiniteInput([f32; 2]),

    #[error("scorer produced a non-finite value: {0}")]
    NonFiniteScore(f32),

    #[error("scorer shape mismatch: {0}")]
    Shape(String),
}
