//! Credit note repository.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, QueryFilter, Set, TransactionTrait};
use tessera_core::DomainError;
use tessera_core::finance::{CreditNote, CreditNoteInput, CreditNoteStatus};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{business_partners, credit_notes, sales_invoices};
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};
use crate::sequence::{next_number, prefix};

impl TryFrom<credit_notes::Model> for CreditNote {
    type Error = DbErr;

    fn try_from(model: credit_notes::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("credit note status", &model.status, CreditNoteStatus::parse)?,
            number: model.number,
            partner_id: model.partner_id,
            invoice_id: model.invoice_id,
            amount: model.amount,
            applied_amount: model.applied_amount,
            reason: model.reason,
        })
    }
}

impl From<&CreditNote> for credit_notes::ActiveModel {
    fn from(note: &CreditNote) -> Self {
        let mut active = Self {
            id: Set(note.id),
            tenant_id: Set(note.tenant_id),
            number: Set(note.number.clone()),
            partner_id: Set(note.partner_id),
            invoice_id: Set(note.invoice_id),
            amount: Set(note.amount),
            applied_amount: Set(note.applied_amount),
            reason: Set(note.reason.clone()),
            status: Set(note.status.as_str().to_string()),
            ..Default::default()
        };
        apply_audit!(active, &note.audit);
        active
    }
}

/// Credit note repository.
#[derive(Debug, Clone)]
pub struct CreditNoteRepository {
    db: DatabaseConnection,
}

impl CreditNoteRepository {
    /// Creates a new credit note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft credit note, numbered in the same transaction.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreditNoteInput,
        actor: Option<Uuid>,
    ) -> RepoResult<CreditNote> {
        let txn = self.db.begin().await?;
        find_scoped::<business_partners::Entity, _>(&txn, tenant_id, input.partner_id).await?;
        if let Some(invoice_id) = input.invoice_id {
            let invoice = find_scoped::<sales_invoices::Entity, _>(&txn, tenant_id, invoice_id).await?;
            if invoice.partner_id != input.partner_id {
                return Err(DomainError::validation("Invoice belongs to a different partner").into());
            }
        }
        let number = next_number(&txn, tenant_id, prefix::CREDIT_NOTE).await?;
        let note = CreditNote::create(tenant_id, number, input, actor)?;
        insert_record::<credit_notes::Entity, _, _>(&txn, &note).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, credit_note_id = %note.id, number = %note.number, "credit note created");
        Ok(note)
    }

    /// Loads a credit note.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<CreditNote> {
        Ok(find_scoped::<credit_notes::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists credit notes, optionally for one partner.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        partner_id: Option<Uuid>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<CreditNote>> {
        let mut select = credit_notes::Entity::scoped(tenant_id);
        if let Some(partner_id) = partner_id {
            select = select.filter(credit_notes::Column::PartnerId.eq(partner_id));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<CreditNote>
    where
        F: FnOnce(&mut CreditNote) -> tessera_core::DomainResult<()> + Send,
    {
        let note = modify_scoped::<credit_notes::Entity, _, _>(&self.db, tenant_id, id, apply).await?;
        tracing::info!(%tenant_id, credit_note_id = %note.id, status = %note.status, "credit note status changed");
        Ok(note)
    }
}
