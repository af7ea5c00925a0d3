//! Error types for the behavior tree engine.
//!
//! Faults never escape a leaf: they are logged and mapped to `Failure` at the
//! leaf boundary. [`LeafError`] is the channel a leaf closure uses to report
//! why it could not evaluate.

/// A fault raised while evaluating a leaf closure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeafError {
    /// A blackboard slot the leaf depends on was empty or had another type.
    #[error("missing blackboard key: {key}")]
    MissingKey {
        /// The slot name.
        key: &'static str,
    },

    /// The leaf could not complete for a domain reason.
    #[error("leaf failed: {reason}")]
    Failed {
        /// Description of the fault.
        reason: String,
    },

    /// The leaf closure panicked.
    #[error("leaf panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl LeafError {
    /// Build a [`LeafError::Failed`] from any displayable reason.
    pub fn failed(reason: impl core::fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }
}
