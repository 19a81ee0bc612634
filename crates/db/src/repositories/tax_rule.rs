//! Income tax bracket repository.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set};
use tessera_core::finance::{TaxRule, TaxRuleInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::tax_rules;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<tax_rules::Model> for TaxRule {
    type Error = DbErr;

    fn try_from(model: tax_rules::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            name: model.name,
            rate: model.rate,
            lower_limit: model.lower_limit,
            upper_limit: model.upper_limit,
            effective_from: model.effective_from,
            effective_to: model.effective_to,
        })
    }
}

impl From<&TaxRule> for tax_rules::ActiveModel {
    fn from(rule: &TaxRule) -> Self {
        let mut active = Self {
            id: Set(rule.id),
            tenant_id: Set(rule.tenant_id),
            name: Set(rule.name.clone()),
            rate: Set(rule.rate),
            lower_limit: Set(rule.lower_limit),
            upper_limit: Set(rule.upper_limit),
            effective_from: Set(rule.effective_from),
            effective_to: Set(rule.effective_to),
            ..Default::default()
        };
        apply_audit!(active, &rule.audit);
        active
    }
}

/// Loads the tenant's brackets in force on `date`.
pub async fn effective_tax_rules<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<TaxRule>, DbErr> {
    let models = tax_rules::Entity::scoped(tenant_id)
        .filter(tax_rules::Column::EffectiveFrom.lte(date))
        .all(db)
        .await?;
    let mut rules = Vec::with_capacity(models.len());
    for model in models {
        let rule = TaxRule::try_from(model)?;
        if rule.is_effective(date) {
            rules.push(rule);
        }
    }
    Ok(rules)
}

/// Tax rule repository.
#[derive(Debug, Clone)]
pub struct TaxRuleRepository {
    db: DatabaseConnection,
}

impl TaxRuleRepository {
    /// Creates a new tax rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bracket.
    pub async fn create(&self, tenant_id: Uuid, input: TaxRuleInput, actor: Option<Uuid>) -> RepoResult<TaxRule> {
        let rule = TaxRule::create(tenant_id, input, actor)?;
        insert_record::<tax_rules::Entity, _, _>(&self.db, &rule).await?;
        tracing::info!(%tenant_id, tax_rule_id = %rule.id, rate = %rule.rate, "tax rule created");
        Ok(rule)
    }

    /// Loads a bracket.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<TaxRule> {
        Ok(find_scoped::<tax_rules::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists brackets.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<TaxRule>> {
        fetch_page(&self.db, tax_rules::Entity::scoped(tenant_id), page).await
    }

    /// Loads the brackets in force on `date`.
    pub async fn effective_on(&self, tenant_id: Uuid, date: NaiveDate) -> RepoResult<Vec<TaxRule>> {
        Ok(effective_tax_rules(&self.db, tenant_id, date).await?)
    }

    /// Updates a bracket.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: TaxRuleInput,
        actor: Option<Uuid>,
    ) -> RepoResult<TaxRule> {
        modify_scoped::<tax_rules::Entity, _, _>(&self.db, tenant_id, id, |rule| rule.update(input, actor)).await
    }

    /// Soft-deletes a bracket.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<()> {
        modify_scoped::<tax_rules::Entity, TaxRule, _>(&self.db, tenant_id, id, |rule| {
            rule.audit.mark_deleted(actor);
            Ok(())
        })
        .await?;
        Ok(())
    }
}
