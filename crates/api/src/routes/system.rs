//! Tenant administration: users, roles, permissions, tenant settings, and jobs.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{StatusFilter, created};
use crate::{ApiResult, AppState, middleware::AuthUser};
use tessera_core::auth::{hash_password, validate_password};
use tessera_core::system::{JobStatus, NewJob, NewUser, QueuedJob, Role, RoleInput, Tenant, User, UserProfile};
use tessera_db::{JobRepository, RoleRepository, TenantRepository, UserRepository};
use tessera_shared::types::{PageRequest, PageResponse};

/// Creates the system routes (auth middleware applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/roles", post(set_user_roles))
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/{id}", get(get_role).put(update_role).delete(delete_role))
        .route("/roles/{id}/permissions", put(set_role_permissions))
        .route("/permissions", get(list_permissions))
        .route("/tenant", get(get_tenant).put(update_tenant))
        .route("/jobs", get(list_jobs).post(enqueue_job))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/retry", post(retry_job))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Initial password.
    pub password: String,
    /// Roles to assign.
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

/// Request body for updating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Enable or disable sign-in.
    pub is_active: Option<bool>,
}

/// Request body for replacing a user's roles.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRolesRequest {
    /// The complete role set.
    pub role_ids: Vec<Uuid>,
}

/// A user with their role names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user.
    #[serde(flatten)]
    pub user: User,
    /// Assigned role names.
    pub roles: Vec<String>,
}

async fn user_response(state: &AppState, user: User) -> ApiResult<UserResponse> {
    let roles = UserRepository::new(state.conn())
        .roles_of(user.id)
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();
    Ok(UserResponse { user, roles })
}

/// GET /system/users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<User>>> {
    auth.require("system.users.read")?;
    Ok(Json(UserRepository::new(state.conn()).list(auth.tenant_id(), &page).await?))
}

/// POST /system/users
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require("system.users.create")?;
    validate_password(&payload.password)?;
    let password_hash = hash_password(&payload.password)?;
    let user = User::create(
        auth.tenant_id(),
        NewUser {
            email: payload.email,
            full_name: payload.full_name,
            password_hash,
        },
        auth.actor(),
    )?;

    let users = UserRepository::new(state.conn());
    users.create(&user).await?;
    if !payload.role_ids.is_empty() {
        users.set_roles(auth.tenant_id(), user.id, &payload.role_ids).await?;
    }
    info!(tenant_id = %auth.tenant_id(), user_id = %user.id, "user created");
    Ok(created(user_response(&state, user).await?))
}

/// GET /system/users/{id}
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    auth.require("system.users.read")?;
    let user = UserRepository::new(state.conn()).find(auth.tenant_id(), id).await?;
    Ok(Json(user_response(&state, user).await?))
}

/// PUT /system/users/{id}
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth.require("system.users.update")?;
    let actor = auth.actor();
    let user = UserRepository::new(state.conn())
        .modify(auth.tenant_id(), id, |user| {
            user.update_profile(
                UserProfile {
                    email: payload.email,
                    full_name: payload.full_name,
                },
                actor,
            )?;
            match payload.is_active {
                Some(true) => user.activate(actor),
                Some(false) => user.deactivate(actor),
                None => {}
            }
            Ok(())
        })
        .await?;
    info!(tenant_id = %auth.tenant_id(), user_id = %user.id, active = user.is_active, "user updated");
    Ok(Json(user_response(&state, user).await?))
}

/// DELETE /system/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require("system.users.delete")?;
    UserRepository::new(state.conn())
        .delete(auth.tenant_id(), id, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /system/users/{id}/roles
async fn set_user_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRolesRequest>,
) -> ApiResult<Json<Vec<Role>>> {
    auth.require("system.users.update")?;
    let roles = UserRepository::new(state.conn())
        .set_roles(auth.tenant_id(), id, &payload.role_ids)
        .await?;
    info!(tenant_id = %auth.tenant_id(), user_id = %id, roles = roles.len(), "user roles replaced");
    Ok(Json(roles))
}

// ---------------------------------------------------------------------------
// Roles and permissions
// ---------------------------------------------------------------------------

/// Request body for replacing a role's permissions.
#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    /// Permission codes.
    pub codes: Vec<String>,
}

/// A role with its permission codes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    /// The role.
    #[serde(flatten)]
    pub role: Role,
    /// Granted permission codes.
    pub permissions: Vec<String>,
}

/// A catalogue entry.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    /// Permission code.
    pub code: String,
    /// Description.
    pub description: String,
}

/// GET /system/roles
async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Role>>> {
    auth.require("system.roles.read")?;
    Ok(Json(RoleRepository::new(state.conn()).list(auth.tenant_id(), &page).await?))
}

/// POST /system/roles
async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RoleInput>,
) -> ApiResult<impl IntoResponse> {
    auth.require("system.roles.create")?;
    let role = Role::create(auth.tenant_id(), payload, auth.actor())?;
    RoleRepository::new(state.conn()).create(&role).await?;
    info!(tenant_id = %auth.tenant_id(), role_id = %role.id, name = %role.name, "role created");
    Ok(created(RoleResponse {
        role,
        permissions: Vec::new(),
    }))
}

/// GET /system/roles/{id}
async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    auth.require("system.roles.read")?;
    let roles = RoleRepository::new(state.conn());
    let role = roles.find(auth.tenant_id(), id).await?;
    let permissions = roles.permissions_of(role.id).await?;
    Ok(Json(RoleResponse { role, permissions }))
}

/// PUT /system/roles/{id}
async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleInput>,
) -> ApiResult<Json<Role>> {
    auth.require("system.roles.update")?;
    let actor = auth.actor();
    let role = RoleRepository::new(state.conn())
        .modify(auth.tenant_id(), id, |role| role.update(payload, actor))
        .await?;
    info!(tenant_id = %auth.tenant_id(), role_id = %role.id, "role updated");
    Ok(Json(role))
}

/// DELETE /system/roles/{id}
async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require("system.roles.delete")?;
    let actor = auth.actor();
    RoleRepository::new(state.conn())
        .modify(auth.tenant_id(), id, |role| role.delete(actor))
        .await?;
    info!(tenant_id = %auth.tenant_id(), role_id = %id, "role deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /system/roles/{id}/permissions
async fn set_role_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPermissionsRequest>,
) -> ApiResult<Json<Vec<String>>> {
    auth.require("system.roles.update")?;
    let codes = RoleRepository::new(state.conn())
        .set_permissions(auth.tenant_id(), id, &payload.codes)
        .await?;
    info!(tenant_id = %auth.tenant_id(), role_id = %id, permissions = codes.len(), "role permissions replaced");
    Ok(Json(codes))
}

/// GET /system/permissions
async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    auth.require("system.permissions.read")?;
    let catalog = RoleRepository::new(state.conn()).catalog().await?;
    Ok(Json(
        catalog
            .into_iter()
            .map(|p| PermissionResponse {
                code: p.code,
                description: p.description,
            })
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Tenant
// ---------------------------------------------------------------------------

/// Request body for renaming the tenant.
#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    /// New display name.
    pub name: String,
}

/// GET /system/tenant
async fn get_tenant(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Tenant>> {
    auth.require("system.tenant.read")?;
    Ok(Json(TenantRepository::new(state.conn()).find(auth.tenant_id()).await?))
}

/// PUT /system/tenant
async fn update_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateTenantRequest>,
) -> ApiResult<Json<Tenant>> {
    auth.require("system.tenant.update")?;
    let tenant = TenantRepository::new(state.conn())
        .rename(auth.tenant_id(), &payload.name, auth.actor())
        .await?;
    info!(tenant_id = %tenant.id, name = %tenant.name, "tenant renamed");
    Ok(Json(tenant))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// GET /system/jobs
async fn list_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(filter): Query<StatusFilter<JobStatus>>,
) -> ApiResult<Json<PageResponse<QueuedJob>>> {
    auth.require("system.jobs.read")?;
    Ok(Json(
        JobRepository::new(state.conn())
            .list(auth.tenant_id(), filter.status, &page)
            .await?,
    ))
}

/// POST /system/jobs
async fn enqueue_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewJob>,
) -> ApiResult<impl IntoResponse> {
    auth.require("system.jobs.create")?;
    let job = QueuedJob::enqueue(auth.tenant_id(), payload, auth.actor())?;
    JobRepository::new(state.conn()).enqueue(&job).await?;
    info!(tenant_id = %auth.tenant_id(), job_id = %job.id, job_type = %job.job_type, "job enqueued");
    Ok(created(job))
}

/// GET /system/jobs/{id}
async fn get_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QueuedJob>> {
    auth.require("system.jobs.read")?;
    Ok(Json(JobRepository::new(state.conn()).find(auth.tenant_id(), id).await?))
}

/// POST /system/jobs/{id}/retry
async fn retry_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QueuedJob>> {
    auth.require("system.jobs.retry")?;
    let job = JobRepository::new(state.conn())
        .retry(auth.tenant_id(), id, auth.actor())
        .await?;
    info!(tenant_id = %auth.tenant_id(), job_id = %job.id, "job requeued");
    Ok(Json(job))
}
