/// Convenience result type used across Lamina.
pub type LaminaResult<T> = Result<T, LaminaError>;

/// Top-level error taxonomy used by planner APIs.
///
/// Only user-input problems are typed errors. Tree-shape invariant
/// violations observed mid-walk (a mask without a parent, a stale
/// [`crate::LeafId`]) are programming errors and panic instead.
#[derive(thiserror::Error, Debug)]
pub enum LaminaError {
    /// Invalid user-provided tree-construction data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures reported by consumers while executing a walk's plan.
    #[error("walk error: {0}")]
    Walk(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaminaError {
    /// Build a [`LaminaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LaminaError::Walk`] value.
    pub fn walk(msg: impl Into<String>) -> Self {
        Self::Walk(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
