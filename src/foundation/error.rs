use crate::script::error::SyntaxError;

/// Convenience result type used across the crate.
pub type VidscriptResult<T> = Result<T, VidscriptError>;

/// Top-level error type for parsing, validation and sampling.
#[derive(thiserror::Error, Debug)]
pub enum VidscriptError {
    /// The script text did not match the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Invalid caller-supplied configuration (fps, options, ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// A request the evaluator cannot satisfy, such as an unknown scene index.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Snapshot or tree (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Sink or script I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Escape hatch for external collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VidscriptError {
    /// Build a [`VidscriptError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VidscriptError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`VidscriptError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for VidscriptError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
