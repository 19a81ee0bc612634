//! Tenant repository.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tessera_core::system::Tenant;
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::tenants;
use crate::error::{RepoError, RepoResult};

impl TryFrom<tenants::Model> for Tenant {
    type Error = DbErr;

    fn try_from(model: tenants::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            audit: audit_info!(model),
            code: model.code,
            name: model.name,
            base_currency: model.base_currency,
            is_active: model.is_active,
        })
    }
}

impl From<&Tenant> for tenants::ActiveModel {
    fn from(tenant: &Tenant) -> Self {
        let mut active = Self {
            id: Set(tenant.id),
            code: Set(tenant.code.clone()),
            name: Set(tenant.name.clone()),
            base_currency: Set(tenant.base_currency.clone()),
            is_active: Set(tenant.is_active),
            ..Default::default()
        };
        apply_audit!(active, &tenant.audit);
        active
    }
}

/// Tenant repository.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a tenant.
    pub async fn create(&self, tenant: &Tenant) -> RepoResult<()> {
        tenants::ActiveModel::from(tenant).insert(&self.db).await?;
        Ok(())
    }

    /// Loads a live tenant.
    pub async fn find(&self, id: Uuid) -> RepoResult<Tenant> {
        let model = tenants::Entity::find_by_id(id)
            .filter(tenants::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("tenant", id))?;
        Ok(model.try_into()?)
    }

    /// Looks a tenant up by its code.
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Tenant>> {
        let model = tenants::Entity::find()
            .filter(tenants::Column::Code.eq(code.trim().to_uppercase()))
            .filter(tenants::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(Tenant::try_from).transpose()?)
    }

    /// Renames a tenant.
    pub async fn rename(&self, id: Uuid, name: &str, actor: Option<Uuid>) -> RepoResult<Tenant> {
        let mut tenant = self.find(id).await?;
        tenant.rename(name, actor)?;
        tenants::ActiveModel::from(&tenant).update(&self.db).await?;
        Ok(tenant)
    }
}
