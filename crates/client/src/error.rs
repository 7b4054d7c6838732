// crates/client/src/error.rs
//! Failure taxonomy for every client operation.
//!
//! Validation failures are resolved entirely client-side and never reach
//! the transport. Everything else maps one non-2xx / network / decode
//! outcome to exactly one variant — there is no "return null on weird
//! bodies" path anywhere in this crate.

use std::path::PathBuf;

use morphbox_types::JobStatus;
use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Result alias used across the client crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Client-side precondition failures. Each variant is distinct so the UI
/// can tell the user exactly what to correct.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    MissingFile,

    #[error("cannot read {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input format is required")]
    MissingInputFormat,

    #[error("output format is required")]
    MissingOutputFormat,

    #[error("job {id} is already {status}, nothing to cancel")]
    JobAlreadyTerminal { id: Uuid, status: JobStatus },

    #[error("job {id} is {status}, result not ready for download")]
    ResultNotReady { id: Uuid, status: JobStatus },
}

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server rejected our credentials. The session has already been
    /// cleared by the time the caller sees this — the only recovery is
    /// re-authentication, never a silent retry.
    #[error("session expired or invalid — log in again")]
    Unauthorized,

    /// Non-2xx with whatever message the server supplied (or the HTTP
    /// status line when it supplied none).
    #[error("request failed ({status}): {message}")]
    Request { status: StatusCode, message: String },

    /// Network-level failure with no server response. Transient; the user
    /// may retry.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response whose body did not match the expected shape.
    #[error("unexpected response body for {context}: {message}")]
    Decode {
        context: &'static str,
        message: String,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn decode(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context,
            message: err.to_string(),
        }
    }

    /// True for failures worth retrying by the user (the next poll tick is
    /// the only automatic retry in the system).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_distinct() {
        let msgs = [
            ValidationError::MissingFile.to_string(),
            ValidationError::MissingInputFormat.to_string(),
            ValidationError::MissingOutputFormat.to_string(),
        ];
        assert_eq!(
            msgs.iter().collect::<std::collections::HashSet<_>>().len(),
            msgs.len()
        );
    }

    #[test]
    fn test_request_error_display() {
        let err = Error::Request {
            status: StatusCode::BAD_REQUEST,
            message: "Missing required fields".into(),
        };
        let shown = err.to_string();
        assert!(shown.contains("400"));
        assert!(shown.contains("Missing required fields"));
    }

    #[test]
    fn test_transient_classification() {
        let err = Error::Unauthorized;
        assert!(!err.is_transient());
    }
}
