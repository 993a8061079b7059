//! Error types for installation and managed command execution
//!
//! Installation failures and command failures are kept apart: an install
//! attempt fails in one of a handful of well-defined phases, while running a
//! managed executable can only fail to start, fail while waiting, or be
//! cancelled by its context.

use crate::command::CancelReason;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during installation
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Failed to create install directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to check for existing installation at {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download install script from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download install script from {url}: status {status}")]
    DownloadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read install script from {url}: {source}")]
    ReadScript {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to start installer '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Install script failed with exit code {code:?}: {stderr}")]
    ScriptFailed { code: Option<i32>, stderr: String },
}

/// Errors produced while running a managed executable
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed while waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Process terminated: {0}")]
    Cancelled(CancelReason),
}

impl CommandError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled(_))
    }
}

/// Result type for installation operations
pub type InstallResult<T> = Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_distinguishable() {
        let cancelled = CommandError::Cancelled(CancelReason::DeadlineExceeded);
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.to_string(), "Process terminated: context deadline exceeded");

        let spawn = CommandError::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!spawn.is_cancelled());
    }

    #[test]
    fn test_script_failure_message() {
        let err = InstallError::ScriptFailed {
            code: Some(2),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Install script failed with exit code Some(2): boom");
    }

    #[test]
    fn test_create_dir_keeps_source() {
        use std::error::Error as _;

        let err = InstallError::CreateDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope"));
    }
}
