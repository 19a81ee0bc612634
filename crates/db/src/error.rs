//! Repository error type.

use sea_orm::{DbErr, SqlErr};
use tessera_core::DomainError;
use tessera_core::finance::LedgerError;
use tessera_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No live row with this id exists in the caller's tenant.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity label.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// A domain invariant or status guard rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl RepoError {
    /// Shorthand for a missing entity.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::Conflict(format!("Duplicate entry: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::Domain(DomainError::validation(format!("Referenced record does not exist: {detail}")))
            }
            _ => Self::Database(err),
        }
    }
}

impl From<LedgerError> for RepoError {
    fn from(err: LedgerError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            RepoError::Domain(domain) => domain.into(),
            RepoError::Conflict(msg) => Self::Conflict(msg),
            RepoError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: AppError = RepoError::not_found("sales order", Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_domain_validation_maps_to_400() {
        let err: AppError = RepoError::Domain(DomainError::validation("bad")).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_transition_maps_to_invalid_operation() {
        let err: AppError = RepoError::Domain(DomainError::InvalidTransition {
            entity: "cheque",
            from: "cleared".to_string(),
            action: "cancel",
        })
        .into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_OPERATION");
    }

    #[test]
    fn test_plain_db_error_is_server_error() {
        let err: AppError = RepoError::from(DbErr::Custom("boom".to_string())).into();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_ledger_error_becomes_domain() {
        let err = RepoError::from(LedgerError::PeriodClosed);
        assert!(matches!(err, RepoError::Domain(_)));
    }
}
