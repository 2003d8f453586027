//! Runtime error types.
//!
//! Every variant is an infrastructure failure: the invocation could not be
//! run or its results could not be recorded. What the invoked program does
//! (exit status, missing outputs) is never an error here; it is reported
//! through the response.

use serde::Serialize;
use spindle_storage::StorageError;
use thiserror::Error;

/// Invocation failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid invocation spec: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("failed to create scratch directory: {0}")]
    ScratchDir(#[source] std::io::Error),

    #[error("failed to fetch input {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to materialize {path}: {source}")]
    Materialize {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of a [`RuntimeError`] for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    InvalidRequest,
    Backend,
    Integrity,
    Materialization,
    ExecutionStart,
}

impl RuntimeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RuntimeError::InvalidRequest(_) => FailureKind::InvalidRequest,
            RuntimeError::InvalidPath { .. }
            | RuntimeError::ScratchDir(_)
            | RuntimeError::Materialize { .. } => FailureKind::Materialization,
            RuntimeError::Fetch { source, .. } => match source {
                StorageError::HashMismatch { .. } => FailureKind::Integrity,
                _ => FailureKind::Materialization,
            },
            RuntimeError::EmptyCommand | RuntimeError::Spawn { .. } | RuntimeError::Wait(_) => {
                FailureKind::ExecutionStart
            }
            RuntimeError::Storage(source) => match source {
                StorageError::HashMismatch { .. } => FailureKind::Integrity,
                StorageError::Config(_) => FailureKind::Configuration,
                _ => FailureKind::Backend,
            },
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let mismatch = StorageError::HashMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        let fetch = RuntimeError::Fetch {
            path: "in/a.txt".to_string(),
            source: mismatch,
        };
        assert_eq!(fetch.kind(), FailureKind::Integrity);

        let missing = RuntimeError::Fetch {
            path: "in/a.txt".to_string(),
            source: StorageError::NotFound("abc".to_string()),
        };
        assert_eq!(missing.kind(), FailureKind::Materialization);

        let spawn = RuntimeError::Spawn {
            program: "/nonexistent".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.kind(), FailureKind::ExecutionStart);

        let backend = RuntimeError::Storage(StorageError::S3("timeout".into()));
        assert_eq!(backend.kind(), FailureKind::Backend);

        let config = RuntimeError::Storage(StorageError::Config("bad scheme".into()));
        assert_eq!(config.kind(), FailureKind::Configuration);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::InvalidRequest).unwrap();
        assert_eq!(json, r#""invalid_request""#);
        let json = serde_json::to_string(&FailureKind::ExecutionStart).unwrap();
        assert_eq!(json, r#""execution_start""#);
    }
}
