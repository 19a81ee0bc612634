//! Sales invoice repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_core::document::{DocumentLine, DocumentLineInput};
use tessera_core::sales::{InvoiceStatus, SalesInvoice, SalesInvoiceInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, apply_pricing, audit_info, decode, document_pricing};
use crate::entities::sales_invoices;
use crate::error::RepoResult;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::lines::{doc_type, sales_lines};
use crate::repositories::partner::active_customer;
use crate::repositories::sales_order::load_order;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn invoice_from(model: sales_invoices::Model, lines: Vec<DocumentLine>) -> Result<SalesInvoice, DbErr> {
    Ok(SalesInvoice {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("invoice status", &model.status, InvoiceStatus::parse)?,
        number: model.number,
        partner_id: model.partner_id,
        order_id: model.order_id,
        invoice_date: model.invoice_date,
        due_date: model.due_date,
        amount_paid: model.amount_paid,
        notes: model.notes,
        lines,
    })
}

impl From<&SalesInvoice> for sales_invoices::ActiveModel {
    fn from(invoice: &SalesInvoice) -> Self {
        let mut active = Self {
            id: Set(invoice.id),
            tenant_id: Set(invoice.tenant_id),
            number: Set(invoice.number.clone()),
            partner_id: Set(invoice.partner_id),
            order_id: Set(invoice.order_id),
            invoice_date: Set(invoice.invoice_date),
            due_date: Set(invoice.due_date),
            amount_paid: Set(invoice.amount_paid),
            status: Set(invoice.status.as_str().to_string()),
            notes: Set(invoice.notes.clone()),
            ..Default::default()
        };
        apply_pricing!(active, &invoice.pricing);
        apply_audit!(active, &invoice.audit);
        active
    }
}

/// Loads an invoice with its lines, optionally under a row lock.
pub(crate) async fn load_invoice<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
    lock: bool,
) -> RepoResult<SalesInvoice> {
    let model = if lock {
        lock_scoped::<sales_invoices::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<sales_invoices::Entity, _>(db, tenant_id, id).await?
    };
    let lines = sales_lines::load(db, doc_type::SALES_INVOICE, id).await?;
    Ok(invoice_from(model, lines)?)
}

async fn insert_invoice<C: ConnectionTrait>(db: &C, invoice: &SalesInvoice) -> Result<(), DbErr> {
    sales_invoices::ActiveModel::from(invoice).insert(db).await?;
    sales_lines::replace(db, doc_type::SALES_INVOICE, invoice.id, &invoice.lines).await
}

/// Sales invoice repository.
#[derive(Debug, Clone)]
pub struct SalesInvoiceRepository {
    db: DatabaseConnection,
}

impl SalesInvoiceRepository {
    /// Creates a new sales invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft invoice for a customer.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SalesInvoiceInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesInvoice> {
        let txn = self.db.begin().await?;
        active_customer(&txn, tenant_id, input.partner_id).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.invoice_date).await?;
        let number = next_number(&txn, tenant_id, prefix::SALES_INVOICE).await?;
        let invoice = SalesInvoice::create(tenant_id, number, input, &currency, rate, actor)?;
        insert_invoice(&txn, &invoice).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, invoice_id = %invoice.id, number = %invoice.number, "sales invoice created");
        Ok(invoice)
    }

    /// Bills every line of a confirmed or completed order.
    pub async fn create_from_order(
        &self,
        tenant_id: Uuid,
        order_id: Uuid,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesInvoice> {
        let txn = self.db.begin().await?;
        let order = load_order(&txn, tenant_id, order_id, false).await?;
        let number = next_number(&txn, tenant_id, prefix::SALES_INVOICE).await?;
        let invoice = SalesInvoice::from_order(&order, number, invoice_date, due_date, actor)?;
        insert_invoice(&txn, &invoice).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, invoice_id = %invoice.id, %order_id, "sales invoice created from order");
        Ok(invoice)
    }

    /// Loads an invoice with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SalesInvoice> {
        load_invoice(&self.db, tenant_id, id, false).await
    }

    /// Lists invoices, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<InvoiceStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<SalesInvoice>> {
        let mut select = sales_invoices::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(sales_invoices::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = sales_lines::load_many(&self.db, doc_type::SALES_INVOICE, &ids).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let own = lines.remove(&model.id).unwrap_or_default();
                invoice_from(model, own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the lines of a draft invoice.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<DocumentLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesInvoice> {
        let txn = self.db.begin().await?;
        let mut invoice = load_invoice(&txn, tenant_id, id, true).await?;
        invoice.replace_lines(inputs, actor)?;
        sales_invoices::ActiveModel::from(&invoice).update(&txn).await?;
        sales_lines::replace(&txn, doc_type::SALES_INVOICE, invoice.id, &invoice.lines).await?;
        txn.commit().await?;
        Ok(invoice)
    }

    /// Applies a status transition or payment under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<SalesInvoice>
    where
        F: FnOnce(&mut SalesInvoice) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut invoice = load_invoice(&txn, tenant_id, id, true).await?;
        apply(&mut invoice)?;
        sales_invoices::ActiveModel::from(&invoice).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            %tenant_id,
            invoice_id = %invoice.id,
            status = %invoice.status,
            amount_paid = %invoice.amount_paid,
            "sales invoice updated"
        );
        Ok(invoice)
    }
}
