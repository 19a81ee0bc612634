//! Commission rule repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set};
use tessera_core::sales::{CommissionRule, CommissionRuleInput, evaluate_commission};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::commission_rules;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<commission_rules::Model> for CommissionRule {
    type Error = DbErr;

    fn try_from(model: commission_rules::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            name: model.name,
            salesperson_id: model.salesperson_id,
            min_amount: model.min_amount,
            max_amount: model.max_amount,
            rate_percent: model.rate_percent,
            flat_amount: model.flat_amount,
            priority: model.priority,
            is_active: model.is_active,
            effective_from: model.effective_from,
            effective_to: model.effective_to,
        })
    }
}

impl From<&CommissionRule> for commission_rules::ActiveModel {
    fn from(rule: &CommissionRule) -> Self {
        let mut active = Self {
            id: Set(rule.id),
            tenant_id: Set(rule.tenant_id),
            name: Set(rule.name.clone()),
            salesperson_id: Set(rule.salesperson_id),
            min_amount: Set(rule.min_amount),
            max_amount: Set(rule.max_amount),
            rate_percent: Set(rule.rate_percent),
            flat_amount: Set(rule.flat_amount),
            priority: Set(rule.priority),
            is_active: Set(rule.is_active),
            effective_from: Set(rule.effective_from),
            effective_to: Set(rule.effective_to),
            ..Default::default()
        };
        apply_audit!(active, &rule.audit);
        active
    }
}

/// Commission rule repository.
#[derive(Debug, Clone)]
pub struct CommissionRuleRepository {
    db: DatabaseConnection,
}

impl CommissionRuleRepository {
    /// Creates a new commission rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active rule.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CommissionRuleInput,
        actor: Option<Uuid>,
    ) -> RepoResult<CommissionRule> {
        let rule = CommissionRule::create(tenant_id, input, actor)?;
        insert_record::<commission_rules::Entity, _, _>(&self.db, &rule).await?;
        tracing::info!(%tenant_id, rule_id = %rule.id, name = %rule.name, "commission rule created");
        Ok(rule)
    }

    /// Loads a rule.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<CommissionRule> {
        Ok(find_scoped::<commission_rules::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists rules.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<CommissionRule>> {
        fetch_page(&self.db, commission_rules::Entity::scoped(tenant_id), page).await
    }

    /// Updates a rule.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: CommissionRuleInput,
        actor: Option<Uuid>,
    ) -> RepoResult<CommissionRule> {
        modify_scoped::<commission_rules::Entity, _, _>(&self.db, tenant_id, id, |rule| rule.update(input, actor)).await
    }

    /// Deactivates a rule.
    pub async fn deactivate(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<CommissionRule> {
        modify_scoped::<commission_rules::Entity, _, _>(&self.db, tenant_id, id, |rule| {
            rule.deactivate(actor);
            Ok(())
        })
        .await
    }

    /// Commission owed on a sale of `amount` closed on `date`.
    pub async fn evaluate(
        &self,
        tenant_id: Uuid,
        amount: Decimal,
        salesperson_id: Option<Uuid>,
        date: NaiveDate,
    ) -> RepoResult<Decimal> {
        let rules = commission_rules::Entity::scoped(tenant_id)
            .filter(commission_rules::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(CommissionRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(evaluate_commission(&rules, amount, salesperson_id, date)?)
    }
}
