//! CLI error type.

use std::fmt;

use nighttrain::config::ConfigError;
use nighttrain::logging::LoggingError;
use nighttrain::path::PathError;
use nighttrain::session::SessionError;

/// Errors reported to the user by the `nighttrain` command.
#[derive(Debug)]
pub enum CliError {
    /// Bad command-line arguments or settings.
    Config(String),

    /// Failed to load or save the configuration file.
    ConfigFile(ConfigError),

    /// Failed to load or save a path file.
    Path(PathError),

    /// The simulation could not start.
    Session(SessionError),

    /// Failed to set up logging.
    Logging(LoggingError),

    /// Failed to render output.
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => 2,
            CliError::Path(_) => 3,
            CliError::Session(_) => 4,
            CliError::Logging(_) | CliError::Output(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration file error: {}", e),
            CliError::Path(e) => write!(f, "Path error: {}", e),
            CliError::Session(e) => write!(f, "Simulation failed: {}", e),
            CliError::Logging(e) => write!(f, "Logging setup failed: {}", e),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Path(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) | CliError::Output(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<PathError> for CliError {
    fn from(e: PathError) -> Self {
        CliError::Path(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
