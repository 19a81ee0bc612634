//! Mapping of application errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tessera_core::DomainError;
use tessera_core::auth::PasswordError;
use tessera_db::RepoError;
use tessera_shared::{AppError, JwtError};
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error rendered as `{"error": CODE, "message": text}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// 401 with a message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 403 with a message.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(AppError::Forbidden(message.into()))
    }

    /// 400 with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if self.0.is_server_error() {
            error!(error = %self.0, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": self.0.error_code(), "message": message }))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self(err.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err.into())
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(RepoError::from(err).into())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("Token has expired"),
            JwtError::DecodingError(_) => Self::unauthorized("Invalid or malformed token"),
            JwtError::EncodingError(msg) => Self(AppError::Internal(msg)),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::validation(err.to_string()),
            other => Self(AppError::Internal(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use uuid::Uuid;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(ApiError::forbidden("x"), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(ApiError::validation("x"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(RepoError::not_found("lead", Uuid::nil()).into(), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(RepoError::Conflict("dup".into()).into(), StatusCode::CONFLICT, "CONFLICT")]
    #[tokio::test]
    async fn test_error_response_shape(#[case] err: ApiError, #[case] status: StatusCode, #[case] code: &str) {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        let body = body_json(response).await;
        assert_eq!(body["error"], code);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_illegal_transition_is_bad_request() {
        let err: ApiError = DomainError::InvalidTransition {
            entity: "sales order",
            from: "cancelled".to_string(),
            action: "confirm",
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INVALID_OPERATION");
        assert_eq!(body["message"], "Invalid operation: Cannot confirm sales order in status 'cancelled'");
    }

    #[tokio::test]
    async fn test_database_details_are_hidden() {
        let response = ApiError(AppError::Database("connection refused at 10.0.0.5".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
    }
}
