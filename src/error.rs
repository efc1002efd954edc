//! Crate error types.
//!
//! Two failure classes matter to callers:
//! - [`Error::Validation`]: the request is malformed. Reported before any
//!   allocation happens; no partial result exists.
//! - [`Error::Capacity`]: an internal invariant was violated (the
//!   allocator tried to consume capacity it does not have). Never clamped,
//!   never recovered.

use thiserror::Error;

use crate::validation::ValidationError;

/// Capacity pool invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("worker index {index} out of range (pool has {len} workers)")]
    UnknownWorker { index: usize, len: usize },

    #[error("worker {worker}: {requested_ms} ms requested, {remaining_ms} ms remaining")]
    Exceeded {
        worker: usize,
        requested_ms: i64,
        remaining_ms: i64,
    },

    #[error("worker {worker} is withheld from assignment")]
    Withheld { worker: usize },

    #[error("worker {worker}: no '{task_type}' reservation with {requested_ms} ms free")]
    NoReservation {
        worker: usize,
        task_type: String,
        requested_ms: i64,
    },

    #[error("reservations must be carved before capacity is consumed")]
    Sealed,
}

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("invalid configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("capacity invariant violated: {0}")]
    Capacity(#[from] CapacityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Whether the error was caused by caller input rather than the engine.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::Capacity(CapacityError::Exceeded {
            worker: 2,
            requested_ms: 5000,
            remaining_ms: 1000,
        });
        assert_eq!(
            format!("{err}"),
            "capacity invariant violated: worker 2: 5000 ms requested, 1000 ms remaining"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = Error::Validation(vec![
            ValidationError::new(ValidationErrorKind::InvalidWorkerCount, "first"),
            ValidationError::new(ValidationErrorKind::UnknownTaskType, "second"),
        ]);
        assert_eq!(format!("{err}"), "invalid request: first; second");
        assert!(err.is_validation());
    }
}
