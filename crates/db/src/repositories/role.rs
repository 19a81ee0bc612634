//! Role repository and the global permission catalogue.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use sea_orm::sea_query::OnConflict;
use tessera_core::DomainError;
use tessera_core::system::{PERMISSION_CATALOG, Role, validate_permission_code};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::{permissions, role_permissions, roles};
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<roles::Model> for Role {
    type Error = DbErr;

    fn try_from(model: roles::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            name: model.name,
            description: model.description,
            is_system: model.is_system,
        })
    }
}

impl From<&Role> for roles::ActiveModel {
    fn from(role: &Role) -> Self {
        let mut active = Self {
            id: Set(role.id),
            tenant_id: Set(role.tenant_id),
            name: Set(role.name.clone()),
            description: Set(role.description.clone()),
            is_system: Set(role.is_system),
            ..Default::default()
        };
        apply_audit!(active, &role.audit);
        active
    }
}

/// Role repository.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    db: DatabaseConnection,
}

impl RoleRepository {
    /// Creates a new role repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a role.
    pub async fn create(&self, role: &Role) -> RepoResult<()> {
        insert_record::<roles::Entity, _, _>(&self.db, role).await
    }

    /// Loads a role of the tenant.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Role> {
        Ok(find_scoped::<roles::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Looks a role up by name within a tenant.
    pub async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> RepoResult<Option<Role>> {
        let model = roles::Entity::scoped(tenant_id)
            .filter(roles::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?;
        Ok(model.map(Role::try_from).transpose()?)
    }

    /// Lists the tenant's roles.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<Role>> {
        fetch_page(&self.db, roles::Entity::scoped(tenant_id), page).await
    }

    /// Applies a change to a role and saves it.
    pub async fn modify<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Role>
    where
        F: FnOnce(&mut Role) -> tessera_core::DomainResult<()> + Send,
    {
        modify_scoped::<roles::Entity, _, _>(&self.db, tenant_id, id, apply).await
    }

    /// Permission codes granted to a role.
    pub async fn permissions_of(&self, role_id: Uuid) -> RepoResult<Vec<String>> {
        let codes = permissions::Entity::find()
            .inner_join(role_permissions::Entity)
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .select_only()
            .column(permissions::Column::Code)
            .order_by_asc(permissions::Column::Code)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(codes)
    }

    /// Replaces the permission set of a role, by code.
    pub async fn set_permissions(&self, tenant_id: Uuid, role_id: Uuid, codes: &[String]) -> RepoResult<Vec<String>> {
        let mut wanted = codes.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        for code in &wanted {
            validate_permission_code(code)?;
        }

        let txn = self.db.begin().await?;
        find_scoped::<roles::Entity, _>(&txn, tenant_id, role_id).await?;

        let found = permissions::Entity::find()
            .filter(permissions::Column::Code.is_in(wanted.iter().cloned()))
            .all(&txn)
            .await?;
        if found.len() != wanted.len() {
            let missing: Vec<&str> = wanted
                .iter()
                .filter(|code| !found.iter().any(|p| &p.code == *code))
                .map(String::as_str)
                .collect();
            return Err(DomainError::validation(format!("Unknown permissions: {}", missing.join(", "))).into());
        }

        role_permissions::Entity::delete_many()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;
        if !found.is_empty() {
            role_permissions::Entity::insert_many(found.iter().map(|p| role_permissions::ActiveModel {
                role_id: Set(role_id),
                permission_id: Set(p.id),
            }))
            .exec(&txn)
            .await?;
        }
        txn.commit().await?;

        tracing::info!(%tenant_id, %role_id, permissions = wanted.len(), "role permissions replaced");
        Ok(wanted)
    }

    /// The global permission catalogue.
    pub async fn catalog(&self) -> RepoResult<Vec<permissions::Model>> {
        Ok(permissions::Entity::find()
            .order_by_asc(permissions::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Inserts any catalogue permission not yet stored.
    pub async fn sync_catalog(&self) -> RepoResult<usize> {
        let rows = PERMISSION_CATALOG.iter().map(|(code, description)| permissions::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set((*code).to_string()),
            description: Set((*description).to_string()),
        });
        permissions::Entity::insert_many(rows)
            .on_conflict(OnConflict::column(permissions::Column::Code).do_nothing().to_owned())
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(PERMISSION_CATALOG.len())
    }
}
