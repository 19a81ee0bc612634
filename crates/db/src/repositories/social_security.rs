//! Social security rate repository.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Set};
use tessera_core::hr::{SocialSecurityRate, SocialSecurityRateInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::social_security_rates;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<social_security_rates::Model> for SocialSecurityRate {
    type Error = DbErr;

    fn try_from(model: social_security_rates::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            name: model.name,
            employee_rate: model.employee_rate,
            employer_rate: model.employer_rate,
            wage_ceiling: model.wage_ceiling,
            effective_from: model.effective_from,
            effective_to: model.effective_to,
        })
    }
}

impl From<&SocialSecurityRate> for social_security_rates::ActiveModel {
    fn from(rate: &SocialSecurityRate) -> Self {
        let mut active = Self {
            id: Set(rate.id),
            tenant_id: Set(rate.tenant_id),
            name: Set(rate.name.clone()),
            employee_rate: Set(rate.employee_rate),
            employer_rate: Set(rate.employer_rate),
            wage_ceiling: Set(rate.wage_ceiling),
            effective_from: Set(rate.effective_from),
            effective_to: Set(rate.effective_to),
            ..Default::default()
        };
        apply_audit!(active, &rate.audit);
        active
    }
}

/// Loads every live rate of the tenant.
pub async fn all_rates<C: ConnectionTrait>(db: &C, tenant_id: Uuid) -> Result<Vec<SocialSecurityRate>, DbErr> {
    social_security_rates::Entity::scoped(tenant_id)
        .all(db)
        .await?
        .into_iter()
        .map(SocialSecurityRate::try_from)
        .collect()
}

/// Social security rate repository.
#[derive(Debug, Clone)]
pub struct SocialSecurityRepository {
    db: DatabaseConnection,
}

impl SocialSecurityRepository {
    /// Creates a new social security repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a rate.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SocialSecurityRateInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SocialSecurityRate> {
        let rate = SocialSecurityRate::create(tenant_id, input, actor)?;
        insert_record::<social_security_rates::Entity, _, _>(&self.db, &rate).await?;
        tracing::info!(%tenant_id, rate_id = %rate.id, name = %rate.name, "social security rate created");
        Ok(rate)
    }

    /// Loads a rate.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SocialSecurityRate> {
        Ok(find_scoped::<social_security_rates::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists rates.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<SocialSecurityRate>> {
        fetch_page(&self.db, social_security_rates::Entity::scoped(tenant_id), page).await
    }

    /// Updates a rate.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: SocialSecurityRateInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SocialSecurityRate> {
        modify_scoped::<social_security_rates::Entity, _, _>(&self.db, tenant_id, id, |rate| rate.update(input, actor))
            .await
    }
}
