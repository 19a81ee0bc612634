//! Domain error types shared by every module.

use thiserror::Error;
use tessera_shared::AppError;

/// Errors raised by domain constructors and state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An argument failed a field-level invariant.
    #[error("{0}")]
    Validation(String),

    /// A status-guarded method was called from a status that does not allow it.
    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        /// Entity name (e.g. "sales return").
        entity: &'static str,
        /// Current status.
        from: String,
        /// Attempted action.
        action: &'static str,
    },

    /// The operation is not allowed for the current state of the entity.
    #[error("{0}")]
    InvalidOperation(String),
}

impl DomainError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for an invalid-operation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition { .. } | Self::InvalidOperation(_) => "INVALID_OPERATION",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            other => Self::InvalidOperation(other.to_string()),
        }
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = DomainError::InvalidTransition {
            entity: "sales return",
            from: "requested".to_string(),
            action: "refund",
        };
        assert_eq!(err.to_string(), "Cannot refund sales return in status 'requested'");
        assert_eq!(err.error_code(), "INVALID_OPERATION");
    }

    #[test]
    fn test_converts_into_app_error() {
        let app: AppError = DomainError::validation("name is required").into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = DomainError::invalid("period is closed").into();
        assert_eq!(app.error_code(), "INVALID_OPERATION");
        assert_eq!(app.to_string(), "Invalid operation: period is closed");
    }
}
