//! Errors produced while generating FRR configuration.

use thiserror::Error;

/// FRR generation error with a stable code prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrrError {
    /// The source tree cannot be expressed as FRR configuration.
    #[error("FRR_INVALID_CONFIG: {0}")]
    InvalidConfig(String),

    /// Generation failed for a reason other than the configuration content.
    #[error("FRR_GENERATE_FAILED: {0}")]
    GenerateFailed(String),
}

impl FrrError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FrrError::InvalidConfig(message.into())
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            FrrError::InvalidConfig(_) => "FRR_INVALID_CONFIG",
            FrrError::GenerateFailed(_) => "FRR_GENERATE_FAILED",
        }
    }
}
