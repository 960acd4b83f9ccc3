//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use kubesunset_core::CoreError;
use kubesunset_kube::CollectError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid flags or flag values
    #[error("Invalid usage: {message}")]
    #[diagnostic(code(kubesunset::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Rule set could not be built
    #[error("Rule error: {message}")]
    #[diagnostic(code(kubesunset::cli::rules))]
    Rules {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No collector produced results
    #[error("Collection failed: {message}")]
    #[diagnostic(code(kubesunset::cli::collect))]
    Collection {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Report could not be rendered or written
    #[error("Output error: {message}")]
    #[diagnostic(code(kubesunset::cli::output))]
    Output { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubesunset::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(kubesunset::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Rules { .. } => exit_codes::USAGE_ERROR,
            CliError::Collection { .. } => exit_codes::ERROR,
            CliError::Output { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn collection_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Collection {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        // Embedded rule data is not something the user can fix
        if matches!(err, CoreError::CuratedRules { .. } | CoreError::InvalidLifecycle { .. }) {
            return CliError::internal(err.to_string());
        }

        let help = match &err {
            CoreError::DuplicateRule { .. } => {
                Some("The kind is already covered by the built-in rules; drop it from --additional-kind".to_string())
            }
            CoreError::InvalidAdditionalKind { .. } => Some(
                "Additional kinds are written as Kind.version.group, e.g. ManagedCertificate.v1beta1.networking.gke.io"
                    .to_string(),
            ),
            _ => None,
        };
        CliError::Rules {
            message: err.to_string(),
            help,
        }
    }
}

impl From<CollectError> for CliError {
    fn from(err: CollectError) -> Self {
        CliError::Collection {
            message: err.to_string(),
            help: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        CliError::Output {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::usage("bad flag").exit_code(), exit_codes::USAGE_ERROR);
        assert_eq!(CliError::output("closed pipe").exit_code(), exit_codes::ERROR);
        assert_eq!(CliError::internal("runtime").exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_rule_errors_are_usage_errors() {
        let err = CliError::from(CoreError::DuplicateRule {
            identity: "Ingress.v1beta1.extensions".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
        assert!(err.to_string().contains("Ingress.v1beta1.extensions"));
        assert!(matches!(err, CliError::Rules { help: Some(_), .. }));
    }
}
