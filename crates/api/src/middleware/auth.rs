//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};
use tessera_shared::Claims;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// Valid claims are stored in the request extensions for [`AuthUser`].
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized("Authorization header with Bearer token is required").into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> ApiResult<()> {
///     auth.require("finance.accounts.read")?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.sub
    }

    /// Returns the tenant ID from the claims.
    #[must_use]
    pub const fn tenant_id(&self) -> Uuid {
        self.0.tenant_id
    }

    /// The user as an audit actor.
    #[must_use]
    pub const fn actor(&self) -> Option<Uuid> {
        Some(self.0.sub)
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }

    /// Fails with 403 unless the caller holds `permission`.
    pub fn require(&self, permission: &str) -> Result<(), ApiError> {
        if self.0.has_permission(permission) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.0.sub, permission, "permission denied");
            Err(ApiError::forbidden(format!("Missing permission '{permission}'")))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use tessera_shared::auth::TokenSubject;

    fn caller(permissions: &[&str]) -> AuthUser {
        AuthUser(Claims::new(
            TokenSubject {
                user_id: Uuid::new_v4(),
                email: "clerk@example.com".to_string(),
                tenant_id: Uuid::new_v4(),
                roles: vec!["Clerk".to_string()],
                permissions: permissions.iter().map(ToString::to_string).collect(),
            },
            Utc::now() + Duration::minutes(5),
        ))
    }

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("Basic abc", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_bearer_token(header), expected);
    }

    #[test]
    fn test_require_grants_by_module_wildcard() {
        let auth = caller(&["sales.*"]);
        assert!(auth.require("sales.orders.confirm").is_ok());
        assert!(auth.require("finance.accounts.read").is_err());
    }

    #[test]
    fn test_require_exact_permission() {
        let auth = caller(&["hr.employees.read"]);
        assert!(auth.require("hr.employees.read").is_ok());
        assert!(matches!(
            auth.require("hr.employees.create"),
            Err(ApiError(tessera_shared::AppError::Forbidden(_)))
        ));
    }
}
