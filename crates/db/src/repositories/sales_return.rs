//! Sales return repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set, TransactionTrait};
use tessera_core::sales::{InvoiceStatus, ReturnStatus, SalesReturn, SalesReturnInput};
use tessera_core::{DomainError, DomainResult};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::sales_returns;
use crate::error::RepoResult;
use crate::repositories::sales_invoice::load_invoice;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};
use crate::sequence::{next_number, prefix};

impl TryFrom<sales_returns::Model> for SalesReturn {
    type Error = DbErr;

    fn try_from(model: sales_returns::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("return status", &model.status, ReturnStatus::parse)?,
            number: model.number,
            invoice_id: model.invoice_id,
            partner_id: model.partner_id,
            reason: model.reason,
            amount: model.amount,
            approved_at: model.approved_at,
            received_at: model.received_at,
            refunded_at: model.refunded_at,
            rejection_reason: model.rejection_reason,
        })
    }
}

impl From<&SalesReturn> for sales_returns::ActiveModel {
    fn from(ret: &SalesReturn) -> Self {
        let mut active = Self {
            id: Set(ret.id),
            tenant_id: Set(ret.tenant_id),
            number: Set(ret.number.clone()),
            invoice_id: Set(ret.invoice_id),
            partner_id: Set(ret.partner_id),
            reason: Set(ret.reason.clone()),
            amount: Set(ret.amount),
            status: Set(ret.status.as_str().to_string()),
            approved_at: Set(ret.approved_at),
            received_at: Set(ret.received_at),
            refunded_at: Set(ret.refunded_at),
            rejection_reason: Set(ret.rejection_reason.clone()),
            ..Default::default()
        };
        apply_audit!(active, &ret.audit);
        active
    }
}

/// Sales return repository.
#[derive(Debug, Clone)]
pub struct SalesReturnRepository {
    db: DatabaseConnection,
}

impl SalesReturnRepository {
    /// Creates a new sales return repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Raises a return against an issued invoice, for at most its grand total.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SalesReturnInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesReturn> {
        let txn = self.db.begin().await?;
        let invoice = load_invoice(&txn, tenant_id, input.invoice_id, false).await?;
        if matches!(invoice.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled) {
            return Err(DomainError::invalid(format!(
                "Cannot return goods against a {} invoice",
                invoice.status
            ))
            .into());
        }
        if input.amount > invoice.pricing.totals.grand_total {
            return Err(DomainError::validation("Return amount exceeds the invoice total").into());
        }
        let number = next_number(&txn, tenant_id, prefix::SALES_RETURN).await?;
        let ret = SalesReturn::create(tenant_id, number, invoice.partner_id, input, actor)?;
        insert_record::<sales_returns::Entity, _, _>(&txn, &ret).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, return_id = %ret.id, invoice_id = %ret.invoice_id, "sales return requested");
        Ok(ret)
    }

    /// Loads a return.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SalesReturn> {
        Ok(find_scoped::<sales_returns::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists returns, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<ReturnStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<SalesReturn>> {
        let mut select = sales_returns::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(sales_returns::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<SalesReturn>
    where
        F: FnOnce(&mut SalesReturn) -> DomainResult<()> + Send,
    {
        let ret = modify_scoped::<sales_returns::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, return_id = %ret.id, status = %ret.status, "sales return status changed");
        Ok(ret)
    }
}
