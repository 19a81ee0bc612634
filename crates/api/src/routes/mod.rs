//! API route definitions.

use axum::{Json, Router, http::StatusCode, middleware};
use serde::{Deserialize, Serialize};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod crm;
pub mod finance;
pub mod health;
pub mod hr;
pub mod procurement;
pub mod sales;
pub mod system;

/// `?status=` filter shared by list endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusFilter<T> {
    /// Only rows in this status.
    pub status: Option<T>,
}

/// Wraps a freshly created resource in a 201 response.
pub(crate) fn created<T: Serialize>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .nest("/system", system::routes())
        .nest("/finance", finance::routes())
        .nest("/crm", crm::routes())
        .nest("/sales", sales::routes())
        .nest("/procurement", procurement::routes())
        .nest("/hr", hr::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tessera_shared::auth::TokenSubject;
    use tessera_shared::{JwtConfig, JwtService};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn state() -> AppState {
        AppState::new(DatabaseConnection::Disconnected, JwtService::new(JwtConfig::default()))
    }

    fn token(state: &AppState, permissions: &[&str]) -> String {
        state
            .jwt_service
            .generate_access_token(TokenSubject {
                user_id: Uuid::new_v4(),
                email: "ada@example.com".to_string(),
                tenant_id: Uuid::new_v4(),
                roles: vec!["Clerk".to_string()],
                permissions: permissions.iter().map(ToString::to_string).collect(),
            })
            .unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = crate::create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (status, body) = send(state(), Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = send(
            state(),
            Request::get("/api/finance/accounts").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (status, _) = send(
            state(),
            Request::get("/api/hr/employees")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let expired = expired_token();
        let (status, _) = send(
            state(),
            Request::get("/api/crm/partners")
                .header("Authorization", format!("Bearer {expired}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    fn expired_token() -> String {
        let config = JwtConfig {
            access_token_expires_minutes: -5,
            ..JwtConfig::default()
        };
        JwtService::new(config)
            .generate_access_token(TokenSubject {
                user_id: Uuid::new_v4(),
                email: "late@example.com".to_string(),
                tenant_id: Uuid::new_v4(),
                roles: Vec::new(),
                permissions: vec!["*".to_string()],
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden_before_database() {
        let state = state();
        let token = token(&state, &["crm.*"]);
        let (status, body) = send(
            state,
            Request::get("/api/finance/journal-entries")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_me_echoes_claims() {
        let state = state();
        let token = token(&state, &["sales.quotes.read"]);
        let (status, body) = send(
            state,
            Request::get("/api/auth/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["permissions"][0], "sales.quotes.read");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let state = state();
        let token = token(&state, &["*"]);
        let response = crate::create_router(state)
            .oneshot(
                Request::get("/api/nowhere")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
