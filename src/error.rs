//! Error types.
//!
//! Once a [`Storage`](crate::Storage) exists none of its operations can fail:
//! a missing key is reported as `None` or `false`. The only fallible step is
//! construction, which may have to ask the OS for a sweeper thread.

use thiserror::Error;

/// Errors that can occur while constructing a storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The dedicated sweeper thread could not be spawned
    #[error("failed to spawn sweeper thread: {0}")]
    SweeperThread(#[source] std::io::Error),

    /// The runtime driving the sweeper could not be built
    #[error("failed to build sweeper runtime: {0}")]
    SweeperRuntime(#[source] std::io::Error),
}

/// Result type for storage construction.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display_and_source() {
        let err = StorageError::SweeperThread(io::Error::other("no threads"));
        assert_eq!(err.to_string(), "failed to spawn sweeper thread: no threads");
        assert!(err.source().is_some());

        let err = StorageError::SweeperRuntime(io::Error::other("no timer"));
        assert_eq!(err.to_string(), "failed to build sweeper runtime: no timer");
    }
}
