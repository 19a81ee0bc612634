//! Supplier bill repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::document::{DocumentLine, DocumentLineInput};
use tessera_core::procurement::{BillStatus, SupplierBill, SupplierBillInput};
use tessera_core::{DomainError, DomainResult};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, apply_pricing, audit_info, decode, document_pricing};
use crate::entities::{purchase_orders, supplier_bills};
use crate::error::RepoResult;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::lines::{doc_type, procurement_lines};
use crate::repositories::partner::active_supplier;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn bill_from(model: supplier_bills::Model, lines: Vec<DocumentLine>) -> Result<SupplierBill, DbErr> {
    Ok(SupplierBill {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("bill status", &model.status, BillStatus::parse)?,
        number: model.number,
        supplier_id: model.supplier_id,
        purchase_order_id: model.purchase_order_id,
        supplier_reference: model.supplier_reference,
        bill_date: model.bill_date,
        due_date: model.due_date,
        amount_paid: model.amount_paid,
        lines,
    })
}

impl From<&SupplierBill> for supplier_bills::ActiveModel {
    fn from(bill: &SupplierBill) -> Self {
        let mut active = Self {
            id: Set(bill.id),
            tenant_id: Set(bill.tenant_id),
            number: Set(bill.number.clone()),
            supplier_id: Set(bill.supplier_id),
            purchase_order_id: Set(bill.purchase_order_id),
            supplier_reference: Set(bill.supplier_reference.clone()),
            bill_date: Set(bill.bill_date),
            due_date: Set(bill.due_date),
            amount_paid: Set(bill.amount_paid),
            status: Set(bill.status.as_str().to_string()),
            ..Default::default()
        };
        apply_pricing!(active, &bill.pricing);
        apply_audit!(active, &bill.audit);
        active
    }
}

async fn load_bill<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid, lock: bool) -> RepoResult<SupplierBill> {
    let model = if lock {
        lock_scoped::<supplier_bills::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<supplier_bills::Entity, _>(db, tenant_id, id).await?
    };
    let lines = procurement_lines::load(db, doc_type::SUPPLIER_BILL, id).await?;
    Ok(bill_from(model, lines)?)
}

/// Supplier bill repository.
#[derive(Debug, Clone)]
pub struct SupplierBillRepository {
    db: DatabaseConnection,
}

impl SupplierBillRepository {
    /// Creates a new supplier bill repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enters a draft bill, optionally against one of the supplier's orders.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SupplierBillInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SupplierBill> {
        let txn = self.db.begin().await?;
        active_supplier(&txn, tenant_id, input.supplier_id).await?;
        if let Some(order_id) = input.purchase_order_id {
            let order = find_scoped::<purchase_orders::Entity, _>(&txn, tenant_id, order_id).await?;
            if order.supplier_id != input.supplier_id {
                return Err(DomainError::validation("Purchase order belongs to a different supplier").into());
            }
        }
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.bill_date).await?;
        let number = next_number(&txn, tenant_id, prefix::SUPPLIER_BILL).await?;
        let bill = SupplierBill::create(tenant_id, number, input, &currency, rate, actor)?;
        supplier_bills::ActiveModel::from(&bill).insert(&txn).await?;
        procurement_lines::replace(&txn, doc_type::SUPPLIER_BILL, bill.id, &bill.lines).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, bill_id = %bill.id, number = %bill.number, "supplier bill created");
        Ok(bill)
    }

    /// Loads a bill with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SupplierBill> {
        load_bill(&self.db, tenant_id, id, false).await
    }

    /// Lists bills, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<BillStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<SupplierBill>> {
        let mut select = supplier_bills::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(supplier_bills::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = procurement_lines::load_many(&self.db, doc_type::SUPPLIER_BILL, &ids).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let own = lines.remove(&model.id).unwrap_or_default();
                bill_from(model, own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the lines of a draft bill.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<DocumentLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<SupplierBill> {
        let txn = self.db.begin().await?;
        let mut bill = load_bill(&txn, tenant_id, id, true).await?;
        bill.replace_lines(inputs, actor)?;
        supplier_bills::ActiveModel::from(&bill).update(&txn).await?;
        procurement_lines::replace(&txn, doc_type::SUPPLIER_BILL, bill.id, &bill.lines).await?;
        txn.commit().await?;
        Ok(bill)
    }

    /// Applies a status transition or payment under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<SupplierBill>
    where
        F: FnOnce(&mut SupplierBill) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut bill = load_bill(&txn, tenant_id, id, true).await?;
        apply(&mut bill)?;
        supplier_bills::ActiveModel::from(&bill).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            %tenant_id,
            bill_id = %bill.id,
            status = %bill.status,
            amount_paid = %bill.amount_paid,
            "supplier bill updated"
        );
        Ok(bill)
    }
}
