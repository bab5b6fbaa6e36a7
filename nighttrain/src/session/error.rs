//! Session error types.

use thiserror::Error;

use crate::progress::ProgressError;

/// Errors that prevent a session from starting.
///
/// Once a session is running, frame processing never fails: missing targets
/// and spawn failures are absorbed and logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `start` was called on a session that is already running.
    #[error("Session is already running")]
    AlreadyRunning,

    /// The path cannot be tracked.
    #[error("Cannot start session: {0}")]
    Progress(#[from] ProgressError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::from(ProgressError::PathTooShort { len: 1 });
        assert_eq!(
            err.to_string(),
            "Cannot start session: Path must contain at least 2 points (found 1)"
        );
        assert_eq!(
            SessionError::AlreadyRunning.to_string(),
            "Session is already running"
        );
    }
}
