//! Error types for mode activation.

use thiserror::Error;

use crate::dbus::DbusError;

/// Result type for mode operations.
pub type KeepAwakeResult<T> = Result<T, KeepAwakeError>;

/// Usage and consistency errors raised across the [`Mode`](crate::Mode) boundary.
///
/// Failures of individual methods never show up here; they are recorded as
/// [`MethodOutcome`](crate::MethodOutcome)s instead.
#[derive(Debug, Error)]
pub enum KeepAwakeError {
    /// A Mode was entered a second time.
    #[error(
        "a Mode can only be activated once; use a separate Mode instance to activate again"
    )]
    ContextAlreadyEntered,

    /// The whitelist names methods which are not part of the mode.
    #[error(
        "the following methods are not part of the \"{mode}\" mode: {missing:?}; \
         check the spelling and that the methods belong to this mode"
    )]
    UnrecognizedMethodNames { mode: String, missing: Vec<String> },

    /// More than one outcome claims success in a single activation.
    #[error("an activation result cannot have more than one active method (active methods: {methods:?})")]
    MultipleActiveMethods { methods: Vec<String> },

    /// The mode is marked active but no method is recorded as active.
    #[error("cannot deactivate mode \"{mode}\": the mode is active but has no active method")]
    NoActiveMethod { mode: String },

    /// Activation failed and the on-fail policy is [`OnFail::Error`](crate::OnFail::Error).
    #[error("{0}")]
    ActivationFailed(String),

    /// The active method failed to exit.
    #[error("failed to deactivate method \"{method}\": {source}")]
    Deactivation {
        method: String,
        #[source]
        source: MethodError,
    },

    /// The priority order is malformed.
    #[error("invalid methods priority: {0}")]
    InvalidPriority(String),

    /// Two methods of the same mode were registered under one name.
    #[error("duplicate method name \"{name}\" in mode \"{mode}\"")]
    DuplicateMethodName { mode: String, name: String },

    /// No mode has been entered on the current thread.
    #[error("no modes active on the current thread")]
    NoCurrentMode,
}

/// Errors returned by a [`Method`](crate::Method) from its lifecycle calls.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Spawning a helper process failed.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A helper process misbehaved after spawning.
    #[error("{0}")]
    Process(String),

    /// A D-Bus call failed.
    #[error(transparent)]
    Dbus(#[from] DbusError),

    /// A requirement of the method is not met on this system.
    #[error("{0}")]
    Requirement(String),

    /// Generic failure.
    #[error("{0}")]
    Failed(String),
}

impl MethodError {
    /// Short name of the error kind, used when rendering failure reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            MethodError::Spawn { .. } => "SpawnError",
            MethodError::Process(_) => "ProcessError",
            MethodError::Dbus(_) => "DbusError",
            MethodError::Requirement(_) => "RequirementError",
            MethodError::Failed(_) => "MethodError",
        }
    }

    /// Render as `Kind("message")`, the format used in failure reasons.
    pub fn to_reason(&self) -> String {
        format!("{}(\"{}\")", self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_includes_kind_and_message() {
        let err = MethodError::Failed("Failing on purpose".into());
        assert_eq!(err.to_reason(), "MethodError(\"Failing on purpose\")");
    }

    #[test]
    fn test_unrecognized_names_message() {
        let err = KeepAwakeError::UnrecognizedMethodNames {
            mode: "keep.running".into(),
            missing: vec!["foo".into()],
        };
        let text = err.to_string();
        assert!(text.contains("keep.running"));
        assert!(text.contains("foo"));
    }
}
