//! Lead and opportunity repositories.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set, TransactionTrait};
use tessera_core::crm::{Lead, LeadInput, LeadStatus, Opportunity, OpportunityInput, OpportunityStage};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{business_partners, leads, opportunities};
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, lock_scoped, modify_scoped};

impl TryFrom<leads::Model> for Lead {
    type Error = DbErr;

    fn try_from(model: leads::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("lead status", &model.status, LeadStatus::parse)?,
            name: model.name,
            company: model.company,
            email: model.email,
            phone: model.phone,
            source: model.source,
            disqualified_reason: model.disqualified_reason,
            converted_opportunity_id: model.converted_opportunity_id,
        })
    }
}

impl From<&Lead> for leads::ActiveModel {
    fn from(lead: &Lead) -> Self {
        let mut active = Self {
            id: Set(lead.id),
            tenant_id: Set(lead.tenant_id),
            name: Set(lead.name.clone()),
            company: Set(lead.company.clone()),
            email: Set(lead.email.clone()),
            phone: Set(lead.phone.clone()),
            source: Set(lead.source.clone()),
            status: Set(lead.status.as_str().to_string()),
            disqualified_reason: Set(lead.disqualified_reason.clone()),
            converted_opportunity_id: Set(lead.converted_opportunity_id),
            ..Default::default()
        };
        apply_audit!(active, &lead.audit);
        active
    }
}

impl TryFrom<opportunities::Model> for Opportunity {
    type Error = DbErr;

    fn try_from(model: opportunities::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            stage: decode("opportunity stage", &model.stage, OpportunityStage::parse)?,
            name: model.name,
            partner_id: model.partner_id,
            lead_id: model.lead_id,
            estimated_value: model.estimated_value,
            probability: model.probability,
            weighted_value: model.weighted_value,
            expected_close_date: model.expected_close_date,
            currency: model.currency,
            closed_at: model.closed_at,
            lost_reason: model.lost_reason,
        })
    }
}

impl From<&Opportunity> for opportunities::ActiveModel {
    fn from(opportunity: &Opportunity) -> Self {
        let mut active = Self {
            id: Set(opportunity.id),
            tenant_id: Set(opportunity.tenant_id),
            name: Set(opportunity.name.clone()),
            partner_id: Set(opportunity.partner_id),
            lead_id: Set(opportunity.lead_id),
            stage: Set(opportunity.stage.as_str().to_string()),
            estimated_value: Set(opportunity.estimated_value),
            probability: Set(opportunity.probability),
            weighted_value: Set(opportunity.weighted_value),
            expected_close_date: Set(opportunity.expected_close_date),
            currency: Set(opportunity.currency.clone()),
            closed_at: Set(opportunity.closed_at),
            lost_reason: Set(opportunity.lost_reason.clone()),
            ..Default::default()
        };
        apply_audit!(active, &opportunity.audit);
        active
    }
}

/// Lead repository.
#[derive(Debug, Clone)]
pub struct LeadRepository {
    db: DatabaseConnection,
}

impl LeadRepository {
    /// Creates a new lead repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Captures a lead.
    pub async fn create(&self, tenant_id: Uuid, input: LeadInput, actor: Option<Uuid>) -> RepoResult<Lead> {
        let lead = Lead::create(tenant_id, input, actor)?;
        insert_record::<leads::Entity, _, _>(&self.db, &lead).await?;
        tracing::info!(%tenant_id, lead_id = %lead.id, "lead captured");
        Ok(lead)
    }

    /// Loads a lead.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Lead> {
        Ok(find_scoped::<leads::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists leads, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<LeadStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Lead>> {
        let mut select = leads::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(leads::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Lead>
    where
        F: FnOnce(&mut Lead) -> tessera_core::DomainResult<()> + Send,
    {
        let lead = modify_scoped::<leads::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, lead_id = %lead.id, status = %lead.status, "lead status changed");
        Ok(lead)
    }

    /// Converts a qualified lead, inserting the opportunity in the same transaction.
    pub async fn convert(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: OpportunityInput,
        actor: Option<Uuid>,
    ) -> RepoResult<(Lead, Opportunity)> {
        let txn = self.db.begin().await?;
        if let Some(partner_id) = input.partner_id {
            find_scoped::<business_partners::Entity, _>(&txn, tenant_id, partner_id).await?;
        }
        let mut lead = Lead::try_from(lock_scoped::<leads::Entity, _>(&txn, tenant_id, id).await?)?;
        let opportunity = lead.convert(input, actor)?;
        insert_record::<opportunities::Entity, _, _>(&txn, &opportunity).await?;
        leads::ActiveModel::from(&lead).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, lead_id = %lead.id, opportunity_id = %opportunity.id, "lead converted");
        Ok((lead, opportunity))
    }
}

/// Opportunity repository.
#[derive(Debug, Clone)]
pub struct OpportunityRepository {
    db: DatabaseConnection,
}

impl OpportunityRepository {
    /// Creates a new opportunity repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an opportunity in the discovery stage.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: OpportunityInput,
        actor: Option<Uuid>,
    ) -> RepoResult<Opportunity> {
        if let Some(partner_id) = input.partner_id {
            find_scoped::<business_partners::Entity, _>(&self.db, tenant_id, partner_id).await?;
        }
        let opportunity = Opportunity::create(tenant_id, input, None, actor)?;
        insert_record::<opportunities::Entity, _, _>(&self.db, &opportunity).await?;
        tracing::info!(%tenant_id, opportunity_id = %opportunity.id, "opportunity created");
        Ok(opportunity)
    }

    /// Loads an opportunity.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Opportunity> {
        Ok(find_scoped::<opportunities::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists opportunities, optionally in one stage.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        stage: Option<OpportunityStage>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Opportunity>> {
        let mut select = opportunities::Entity::scoped(tenant_id);
        if let Some(stage) = stage {
            select = select.filter(opportunities::Column::Stage.eq(stage.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Updates an open opportunity.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: OpportunityInput,
        actor: Option<Uuid>,
    ) -> RepoResult<Opportunity> {
        if let Some(partner_id) = input.partner_id {
            find_scoped::<business_partners::Entity, _>(&self.db, tenant_id, partner_id).await?;
        }
        modify_scoped::<opportunities::Entity, _, _>(&self.db, tenant_id, id, |opportunity| {
            opportunity.update(input, actor)
        })
        .await
    }

    /// Applies a stage or probability change under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Opportunity>
    where
        F: FnOnce(&mut Opportunity) -> tessera_core::DomainResult<()> + Send,
    {
        let opportunity = modify_scoped::<opportunities::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(
            %tenant_id,
            opportunity_id = %opportunity.id,
            stage = %opportunity.stage,
            weighted_value = %opportunity.weighted_value,
            "opportunity updated"
        );
        Ok(opportunity)
    }
}
