//! CLI-specific error types and exit code mapping

use lockgate_core::error::LockgateError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan machinery itself failed (strict mode only).
    #[error("audit error: {0}")]
    Audit(String),

    /// The scan completed and found installation-blocking advisories.
    #[error("{count} fatal advisories found")]
    FatalAdvisories { count: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from lockgate-core.
    #[error("{0}")]
    Core(#[from] LockgateError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 4    | Scan found fatal advisories           |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::FatalAdvisories { .. } => 4,
            Self::Io(_) => 10,
            Self::Command(_) | Self::Audit(_) | Self::JsonSerialize(_) | Self::Core(_) => 1,
        }
    }
}
