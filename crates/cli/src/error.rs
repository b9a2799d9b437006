//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: quad error (shader build, buffer creation, no current context)
//! - 12: input error (bad --params JSON)
//! - 13: serialization error

use glquad_core::QuadError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// A quad construction or render error.
    Quad(QuadError),
    /// A user input error.
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Quad(_) => 10,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Quad(e) => write!(f, "{e}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<QuadError> for CliError {
    fn from(e: QuadError) -> Self {
        CliError::Quad(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_error_exit_code_is_10() {
        let err = CliError::Quad(QuadError::ContextNotCurrent);
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn input_error_exit_code_is_12() {
        let err = CliError::Input("bad translate".into());
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn serialization_error_exit_code_is_13() {
        let err = CliError::Serialization("json fail".into());
        assert_eq!(err.exit_code(), 13);
    }

    #[test]
    fn from_quad_error_keeps_message() {
        let cli_err = CliError::from(QuadError::Gl("no buffers".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("no buffers"));
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
