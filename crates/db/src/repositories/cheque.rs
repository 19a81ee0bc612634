//! Cheque register repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set};
use tessera_core::finance::{Cheque, ChequeDirection, ChequeInput, ChequeStatus};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{accounts, business_partners, cheques};
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<cheques::Model> for Cheque {
    type Error = DbErr;

    fn try_from(model: cheques::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            direction: decode("cheque direction", &model.direction, ChequeDirection::parse)?,
            status: decode("cheque status", &model.status, ChequeStatus::parse)?,
            number: model.number,
            partner_id: model.partner_id,
            bank_account_id: model.bank_account_id,
            amount: model.amount,
            issue_date: model.issue_date,
            due_date: model.due_date,
            cleared_at: model.cleared_at,
            bounced_reason: model.bounced_reason,
        })
    }
}

impl From<&Cheque> for cheques::ActiveModel {
    fn from(cheque: &Cheque) -> Self {
        let mut active = Self {
            id: Set(cheque.id),
            tenant_id: Set(cheque.tenant_id),
            number: Set(cheque.number.clone()),
            direction: Set(cheque.direction.as_str().to_string()),
            partner_id: Set(cheque.partner_id),
            bank_account_id: Set(cheque.bank_account_id),
            amount: Set(cheque.amount),
            issue_date: Set(cheque.issue_date),
            due_date: Set(cheque.due_date),
            status: Set(cheque.status.as_str().to_string()),
            cleared_at: Set(cheque.cleared_at),
            bounced_reason: Set(cheque.bounced_reason.clone()),
            ..Default::default()
        };
        apply_audit!(active, &cheque.audit);
        active
    }
}

/// Cheque repository.
#[derive(Debug, Clone)]
pub struct ChequeRepository {
    db: DatabaseConnection,
}

impl ChequeRepository {
    /// Creates a new cheque repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a pending cheque against a partner and bank account.
    pub async fn create(&self, tenant_id: Uuid, input: ChequeInput, actor: Option<Uuid>) -> RepoResult<Cheque> {
        find_scoped::<business_partners::Entity, _>(&self.db, tenant_id, input.partner_id).await?;
        find_scoped::<accounts::Entity, _>(&self.db, tenant_id, input.bank_account_id).await?;
        let cheque = Cheque::create(tenant_id, input, actor)?;
        insert_record::<cheques::Entity, _, _>(&self.db, &cheque).await?;
        tracing::info!(%tenant_id, cheque_id = %cheque.id, number = %cheque.number, "cheque registered");
        Ok(cheque)
    }

    /// Loads a cheque.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Cheque> {
        Ok(find_scoped::<cheques::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists cheques, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<ChequeStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Cheque>> {
        let mut select = cheques::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(cheques::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Cheque>
    where
        F: FnOnce(&mut Cheque) -> tessera_core::DomainResult<()> + Send,
    {
        let cheque = modify_scoped::<cheques::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, cheque_id = %cheque.id, status = %cheque.status, "cheque status changed");
        Ok(cheque)
    }
}
