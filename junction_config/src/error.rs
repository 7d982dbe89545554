//! Structured configuration errors.
//!
//! Every error carries a stable code plus a human-readable message, a cause,
//! and a suggested action so operators can act on it without reading source.

use thiserror::Error;

/// Error produced while parsing or validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Syntax error with the position of the offending token.
    #[error("[CONFIG_PARSE_ERROR] Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid characters or formatting reported by the lexer.
    #[error("[CONFIG_PARSE_ERROR] Lexer error at line {line}, column {column}: {message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },

    /// Semantic violation found after a syntactically valid parse.
    #[error("[CONFIG_VALIDATION_ERROR] {message}")]
    Validation {
        message: String,
        cause: String,
        action: String,
    },
}

impl ConfigError {
    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn lex(line: usize, column: usize, message: impl Into<String>) -> Self {
        ConfigError::Lex {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn validation(
        message: impl Into<String>,
        cause: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        ConfigError::Validation {
            message: message.into(),
            cause: cause.into(),
            action: action.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } | ConfigError::Lex { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::Validation { .. } => "CONFIG_VALIDATION_ERROR",
        }
    }

    /// Short explanation of what went wrong.
    pub fn cause(&self) -> &str {
        match self {
            ConfigError::Parse { .. } => "The configuration file contains invalid syntax",
            ConfigError::Lex { .. } => {
                "The configuration file contains invalid characters or formatting"
            }
            ConfigError::Validation { cause, .. } => cause,
        }
    }

    /// Suggested remediation for the operator.
    pub fn action(&self) -> &str {
        match self {
            ConfigError::Parse { .. } | ConfigError::Lex { .. } => {
                "Review the configuration file and fix the syntax error"
            }
            ConfigError::Validation { action, .. } => action,
        }
    }
}
