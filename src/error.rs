//! Errors which abort a smoothing operation.
//!
//! Per-element construction failures during reconstruction are not errors, see
//! [`crate::reconstruct::BuildOutcome`].

use thiserror::Error;

/// Result type alias using [`SmoothError`].
pub type Result<T> = std::result::Result<T, SmoothError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmoothError {
    /// Nothing is selected.
    #[error("Active object must be a mesh")]
    NoActiveObject,

    /// The active object holds something other than a mesh.
    #[error("Active object must be a mesh, {name:?} is a {kind}")]
    NotAMesh { name: String, kind: &'static str },

    /// Subdivision level must be at least one.
    #[error("Invalid subdivision level {0} (must be >= 1)")]
    InvalidLevel(u32),

    /// The evaluator produced no mesh.
    #[error("Failed to evaluate mesh")]
    EvaluationFailed,

    /// The evaluated mesh has fewer vertices than the source.
    #[error("Vertex count mismatch: evaluated mesh has {got} vertices, expected at least {expected}")]
    VertexCountMismatch { expected: usize, got: usize },
}

impl SmoothError {
    /// `true` for errors caused by what the caller handed in, rather than by evaluation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NoActiveObject | Self::NotAMesh { .. } | Self::InvalidLevel(_)
        )
    }
}

#[test]
fn test_error_display() {
    let err = SmoothError::VertexCountMismatch {
        expected: 16,
        got: 3,
    };
    let msg = err.to_string();
    assert!(msg.contains("16"));
    assert!(msg.contains('3'));
    assert!(!err.is_invalid_input());
    assert!(SmoothError::NoActiveObject.is_invalid_input());
}
