//! Authentication routes for login, token refresh, logout, and the caller view.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use axum_extra::{TypedHeader, headers::UserAgent};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, middleware::AuthUser};
use tessera_core::auth::verify_password;
use tessera_core::system::User;
use tessera_db::{RepoError, SessionClient, SessionRepository, TenantRepository, UserRepository};
use tessera_shared::auth::{LoginRequest, LogoutRequest, RefreshRequest, TokenResponse, TokenSubject, UserInfo};

const INVALID_CREDENTIALS: &str = "Invalid tenant, email, or password";
const ACCOUNT_DISABLED: &str = "This account has been disabled";

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// Auth routes that need a valid access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn session_client(user_agent: Option<TypedHeader<UserAgent>>, headers: &HeaderMap) -> SessionClient {
    SessionClient {
        user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_string()),
        ip_address: headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
    }
}

/// Issues an access token and a session for an authenticated user.
async fn issue_tokens(state: &AppState, user: &User, refresh_token: String) -> ApiResult<TokenResponse> {
    let access = UserRepository::new(state.conn()).access_of(user.id).await?;
    let permissions = access.permissions.into_vec();
    let access_token = state.jwt_service.generate_access_token(TokenSubject {
        user_id: user.id,
        email: user.email.clone(),
        tenant_id: user.tenant_id,
        roles: access.roles.clone(),
        permissions: permissions.clone(),
    })?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
        user: UserInfo {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            tenant_id: user.tenant_id,
            roles: access.roles,
            permissions,
        },
    })
}

/// A deleted user or tenant behind a token reads as a disabled account.
fn account_error(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound { .. } => ApiError::unauthorized(ACCOUNT_DISABLED),
        other => other.into(),
    }
}

/// Loads a user who may hold tokens: active, in an active tenant.
async fn active_user(state: &AppState, tenant_id: Uuid, user_id: Uuid) -> ApiResult<User> {
    let tenant = TenantRepository::new(state.conn())
        .find(tenant_id)
        .await
        .map_err(account_error)?;
    let user = UserRepository::new(state.conn())
        .find(tenant_id, user_id)
        .await
        .map_err(account_error)?;
    if !tenant.is_active || !user.is_active {
        return Err(ApiError::unauthorized(ACCOUNT_DISABLED));
    }
    Ok(user)
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let Some(tenant) = TenantRepository::new(state.conn())
        .find_by_code(&payload.tenant_code.trim().to_uppercase())
        .await?
    else {
        info!(tenant_code = %payload.tenant_code, "Login attempt for unknown tenant");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let users = UserRepository::new(state.conn());
    let Some(mut user) = users
        .find_by_email(tenant.id, &payload.email.trim().to_lowercase())
        .await?
    else {
        info!(tenant_id = %tenant.id, "Login attempt for non-existent user");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }
    if !tenant.is_active || !user.is_active {
        return Err(ApiError::unauthorized(ACCOUNT_DISABLED));
    }

    users.record_login(&mut user).await?;
    let issued = SessionRepository::new(state.conn())
        .create(
            user.id,
            tenant.id,
            state.jwt_service.refresh_token_lifetime(),
            &session_client(user_agent, &headers),
        )
        .await?;
    let response = issue_tokens(&state, &user, issued.refresh_token).await?;

    info!(user_id = %user.id, tenant_id = %tenant.id, session_id = %issued.session.id, "User logged in");
    Ok(Json(response))
}

/// POST /auth/refresh - Rotate the refresh token and issue a new access token.
async fn refresh(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    headers: HeaderMap,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let Some(issued) = SessionRepository::new(state.conn())
        .rotate(
            &payload.refresh_token,
            state.jwt_service.refresh_token_lifetime(),
            &session_client(user_agent, &headers),
        )
        .await?
    else {
        return Err(ApiError::unauthorized("Invalid or expired refresh token"));
    };

    let user = active_user(&state, issued.session.tenant_id, issued.session.user_id).await?;
    let response = issue_tokens(&state, &user, issued.refresh_token).await?;

    info!(user_id = %user.id, session_id = %issued.session.id, "Session refreshed");
    Ok(Json(response))
}

/// POST /auth/logout - Revoke the session behind a refresh token.
async fn logout(State(state): State<AppState>, Json(payload): Json<LogoutRequest>) -> ApiResult<StatusCode> {
    let revoked = SessionRepository::new(state.conn())
        .revoke_by_token(&payload.refresh_token)
        .await?;
    info!(revoked, "Logout");
    Ok(StatusCode::NO_CONTENT)
}

/// The caller as seen through their access token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// User ID.
    pub user_id: Uuid,
    /// Email.
    pub email: String,
    /// Tenant ID.
    pub tenant_id: Uuid,
    /// Role names.
    pub roles: Vec<String>,
    /// Permission codes.
    pub permissions: Vec<String>,
    /// Token expiry (unix seconds).
    pub expires_at: i64,
}

/// GET /auth/me - Claims view of the caller.
async fn me(auth: AuthUser) -> Json<MeResponse> {
    let claims = auth.claims();
    Json(MeResponse {
        user_id: claims.sub,
        email: claims.email.clone(),
        tenant_id: claims.tenant_id,
        roles: claims.roles.clone(),
        permissions: claims.permissions.clone(),
        expires_at: claims.exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_missing_account_is_unauthorized() {
        let err = account_error(RepoError::not_found("user", Uuid::new_v4()));
        assert_eq!(err.0.status_code(), 401);
        assert_eq!(err.0.to_string(), format!("Authentication failed: {ACCOUNT_DISABLED}"));
    }

    #[test]
    fn test_database_failure_stays_server_error() {
        let err = account_error(RepoError::Database(DbErr::Custom("connection reset".to_string())));
        assert_eq!(err.0.status_code(), 500);
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let client = session_client(None, &headers);
        assert_eq!(client.ip_address.as_deref(), Some("203.0.113.7"));
        assert!(client.user_agent.is_none());
    }
}
