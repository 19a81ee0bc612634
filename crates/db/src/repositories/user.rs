//! User repository: accounts, role assignments, and effective access.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tessera_core::system::{PermissionSet, Role, User};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::{permissions, role_permissions, roles, user_roles, user_sessions, users};
use crate::error::{RepoError, RepoResult};
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<users::Model> for User {
    type Error = DbErr;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            email: model.email,
            full_name: model.full_name,
            password_hash: model.password_hash,
            is_active: model.is_active,
            last_login_at: model.last_login_at,
        })
    }
}

impl From<&User> for users::ActiveModel {
    fn from(user: &User) -> Self {
        let mut active = Self {
            id: Set(user.id),
            tenant_id: Set(user.tenant_id),
            email: Set(user.email.clone()),
            full_name: Set(user.full_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            last_login_at: Set(user.last_login_at),
            ..Default::default()
        };
        apply_audit!(active, &user.audit);
        active
    }
}

/// Role names and effective permissions of a user.
#[derive(Debug, Clone, Default)]
pub struct UserAccess {
    /// Names of the assigned roles.
    pub roles: Vec<String>,
    /// Union of the roles' permissions.
    pub permissions: PermissionSet,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a user.
    pub async fn create(&self, user: &User) -> RepoResult<()> {
        insert_record::<users::Entity, _, _>(&self.db, user).await
    }

    /// Loads a user of the tenant.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<User> {
        Ok(find_scoped::<users::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Looks a user up by email within a tenant.
    pub async fn find_by_email(&self, tenant_id: Uuid, email: &str) -> RepoResult<Option<User>> {
        let model = users::Entity::scoped(tenant_id)
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(User::try_from).transpose()?)
    }

    /// Lists the tenant's users.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<User>> {
        fetch_page(&self.db, users::Entity::scoped(tenant_id), page).await
    }

    /// Applies a change to a user and saves it.
    pub async fn modify<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<User>
    where
        F: FnOnce(&mut User) -> tessera_core::DomainResult<()> + Send,
    {
        modify_scoped::<users::Entity, _, _>(&self.db, tenant_id, id, apply).await
    }

    /// Soft-deletes a user and revokes their sessions.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<()> {
        let user = self
            .modify(tenant_id, id, |user| {
                user.deactivate(actor);
                user.audit.mark_deleted(actor);
                Ok(())
            })
            .await?;
        user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::RevokedAt, sea_orm::sea_query::Expr::value(chrono::Utc::now()))
            .filter(user_sessions::Column::UserId.eq(user.id))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Stamps a successful login.
    pub async fn record_login(&self, user: &mut User) -> RepoResult<()> {
        user.record_login(chrono::Utc::now());
        users::ActiveModel {
            id: Set(user.id),
            last_login_at: Set(user.last_login_at),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    /// Roles assigned to a user.
    pub async fn roles_of(&self, user_id: Uuid) -> RepoResult<Vec<Role>> {
        let models = roles::Entity::find()
            .inner_join(user_roles::Entity)
            .filter(user_roles::Column::UserId.eq(user_id))
            .filter(roles::Column::IsDeleted.eq(false))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Role::try_from).collect::<Result<_, _>>()?)
    }

    /// Resolves role names and effective permissions for token issuance.
    pub async fn access_of(&self, user_id: Uuid) -> RepoResult<UserAccess> {
        let roles = self.roles_of(user_id).await?;
        if roles.is_empty() {
            return Ok(UserAccess::default());
        }
        let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
        let codes: Vec<String> = permissions::Entity::find()
            .inner_join(role_permissions::Entity)
            .filter(role_permissions::Column::RoleId.is_in(role_ids))
            .select_only()
            .column(permissions::Column::Code)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(UserAccess {
            roles: roles.into_iter().map(|r| r.name).collect(),
            permissions: codes.into_iter().collect(),
        })
    }

    /// Replaces the role set of a user.
    pub async fn set_roles(&self, tenant_id: Uuid, user_id: Uuid, role_ids: &[Uuid]) -> RepoResult<Vec<Role>> {
        let txn = self.db.begin().await?;
        find_scoped::<users::Entity, _>(&txn, tenant_id, user_id).await?;

        let mut wanted = role_ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        let found = roles::Entity::scoped(tenant_id)
            .filter(roles::Column::Id.is_in(wanted.iter().copied()))
            .count(&txn)
            .await?;
        if found != wanted.len() as u64 {
            return Err(RepoError::Domain(tessera_core::DomainError::validation(
                "one or more roles do not exist",
            )));
        }

        user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if !wanted.is_empty() {
            user_roles::Entity::insert_many(wanted.iter().map(|role_id| user_roles::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(*role_id),
            }))
            .exec(&txn)
            .await?;
        }
        txn.commit().await?;

        tracing::info!(%tenant_id, %user_id, roles = wanted.len(), "user roles replaced");
        self.roles_of(user_id).await
    }
}
