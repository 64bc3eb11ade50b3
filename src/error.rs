//! Error handling module for the VeraCrypt launcher
//!
//! Two failures are "expected" and map to dedicated negative exit codes:
//! missing administrative rights and an invalid configuration. Anything
//! else (spawn failures, filesystem errors) is unexpected and exits with 1.

use thiserror::Error;

/// Exit code when the launcher runs without administrative rights.
pub const EXIT_ADMIN: i32 = -1;

/// Exit code when the configuration file is missing values or malformed.
pub const EXIT_CONFIG: i32 = -2;

/// Exit code for failures that are not specially handled.
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for the launcher
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The process lacks the rights required to attach raw block devices
    #[error("administrative rights are required to mount volumes")]
    Admin,

    /// Missing, unresolvable or malformed configuration
    #[error("{0}")]
    Config(String),

    /// IO errors (mount point creation, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Process execution failures carrying their own context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;

impl LaunchError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Admin => EXIT_ADMIN,
            Self::Config(_) => EXIT_CONFIG,
            Self::Io(_) | Self::Other(_) => EXIT_FAILURE,
        }
    }

    /// Whether the user should be asked to acknowledge the error before exit.
    pub fn needs_acknowledgement(&self) -> bool {
        matches!(self, Self::Admin | Self::Config(_))
    }
}
