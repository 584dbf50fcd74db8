use miette::Diagnostic;
use thiserror::Error;

use crate::id::IdError;

#[derive(Error, Diagnostic, Debug)]
pub enum RosterError {
    #[error("Configuration error")]
    #[diagnostic(
        code(roster_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid fixture file")]
    #[diagnostic(
        code(roster_core::fixture_error),
        help("Expected {expected} in {path}")
    )]
    FixtureError {
        path: String,
        line: Option<usize>,
        expected: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("I/O error on {path}")]
    #[diagnostic(code(roster_core::io_error))]
    Io {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidId(#[from] IdError),
}

pub type Result<T> = std::result::Result<T, RosterError>;

impl RosterError {
    pub fn io(path: impl AsRef<std::path::Path>, cause: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            cause,
        }
    }
}
