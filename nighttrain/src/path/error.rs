//! Error types for path loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;

/// Errors that can occur while loading or saving a path.
#[derive(Debug, Error)]
pub enum PathError {
    /// The source contained no valid `x y z heading` records.
    #[error("Path has no valid points")]
    EmptyPath,

    /// Failed to read the path file.
    #[error("Failed to read path file {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write the path file.
    #[error("Failed to write path file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// I/O error on a stream without a known file path.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_display() {
        assert_eq!(PathError::EmptyPath.to_string(), "Path has no valid points");
    }

    #[test]
    fn test_read_failed_names_file() {
        let err = PathError::ReadFailed {
            path: PathBuf::from("/data/nighttrain_path.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("nighttrain_path.txt"));
        assert!(msg.contains("missing"));
    }
}
