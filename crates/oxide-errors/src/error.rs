//! Error types for binding.

use thiserror::Error;

/// Errors raised around the binding walk.
///
/// The walk itself never fails: shape mismatches between a response and the
/// model tree end up in [`UnmatchedErrors`](crate::UnmatchedErrors). These
/// variants cover parsing raw input and loading model skeletons.
#[derive(Debug, Error)]
pub enum BindError {
    /// The response body or model skeleton is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body parsed but is not a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(String),

    /// A model skeleton is structurally inconsistent.
    #[error("invalid model at {path}: {message}")]
    InvalidModel {
        /// Path of the offending node.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
