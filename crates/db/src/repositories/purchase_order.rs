//! Purchase quote and purchase order repositories.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_core::document::{DocumentLine, DocumentLineInput};
use tessera_core::procurement::{
    PurchaseOrder, PurchaseOrderInput, PurchaseOrderStatus, PurchaseQuote, PurchaseQuoteInput,
    PurchaseQuoteStatus,
};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, apply_pricing, audit_info, decode, document_pricing};
use crate::entities::{purchase_orders, purchase_quotes};
use crate::error::RepoResult;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::lines::{doc_type, procurement_lines};
use crate::repositories::partner::active_supplier;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn quote_from(model: purchase_quotes::Model, lines: Vec<DocumentLine>) -> Result<PurchaseQuote, DbErr> {
    Ok(PurchaseQuote {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("purchase quote status", &model.status, PurchaseQuoteStatus::parse)?,
        number: model.number,
        supplier_id: model.supplier_id,
        quote_date: model.quote_date,
        valid_until: model.valid_until,
        notes: model.notes,
        lines,
    })
}

impl From<&PurchaseQuote> for purchase_quotes::ActiveModel {
    fn from(quote: &PurchaseQuote) -> Self {
        let mut active = Self {
            id: Set(quote.id),
            tenant_id: Set(quote.tenant_id),
            number: Set(quote.number.clone()),
            supplier_id: Set(quote.supplier_id),
            quote_date: Set(quote.quote_date),
            valid_until: Set(quote.valid_until),
            status: Set(quote.status.as_str().to_string()),
            notes: Set(quote.notes.clone()),
            ..Default::default()
        };
        apply_pricing!(active, &quote.pricing);
        apply_audit!(active, &quote.audit);
        active
    }
}

fn order_from(model: purchase_orders::Model, lines: Vec<DocumentLine>) -> Result<PurchaseOrder, DbErr> {
    Ok(PurchaseOrder {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("purchase order status", &model.status, PurchaseOrderStatus::parse)?,
        number: model.number,
        supplier_id: model.supplier_id,
        order_date: model.order_date,
        expected_date: model.expected_date,
        purchase_quote_id: model.purchase_quote_id,
        approved_at: model.approved_at,
        approved_by: model.approved_by,
        notes: model.notes,
        lines,
    })
}

impl From<&PurchaseOrder> for purchase_orders::ActiveModel {
    fn from(order: &PurchaseOrder) -> Self {
        let mut active = Self {
            id: Set(order.id),
            tenant_id: Set(order.tenant_id),
            number: Set(order.number.clone()),
            supplier_id: Set(order.supplier_id),
            order_date: Set(order.order_date),
            expected_date: Set(order.expected_date),
            purchase_quote_id: Set(order.purchase_quote_id),
            status: Set(order.status.as_str().to_string()),
            approved_at: Set(order.approved_at),
            approved_by: Set(order.approved_by),
            notes: Set(order.notes.clone()),
            ..Default::default()
        };
        apply_pricing!(active, &order.pricing);
        apply_audit!(active, &order.audit);
        active
    }
}

async fn load_quote<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid, lock: bool) -> RepoResult<PurchaseQuote> {
    let model = if lock {
        lock_scoped::<purchase_quotes::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<purchase_quotes::Entity, _>(db, tenant_id, id).await?
    };
    let lines = procurement_lines::load(db, doc_type::PURCHASE_QUOTE, id).await?;
    Ok(quote_from(model, lines)?)
}

/// Loads a purchase order with its lines, optionally under a row lock.
pub(crate) async fn load_order<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
    lock: bool,
) -> RepoResult<PurchaseOrder> {
    let model = if lock {
        lock_scoped::<purchase_orders::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<purchase_orders::Entity, _>(db, tenant_id, id).await?
    };
    let lines = procurement_lines::load(db, doc_type::PURCHASE_ORDER, id).await?;
    Ok(order_from(model, lines)?)
}

/// Writes an order header and its lines, including received quantities.
pub(crate) async fn save_order<C: ConnectionTrait>(db: &C, order: &PurchaseOrder) -> Result<(), DbErr> {
    purchase_orders::ActiveModel::from(order).update(db).await?;
    procurement_lines::replace(db, doc_type::PURCHASE_ORDER, order.id, &order.lines).await
}

async fn insert_order<C: ConnectionTrait>(db: &C, order: &PurchaseOrder) -> Result<(), DbErr> {
    purchase_orders::ActiveModel::from(order).insert(db).await?;
    procurement_lines::replace(db, doc_type::PURCHASE_ORDER, order.id, &order.lines).await
}

/// Purchase quote repository.
#[derive(Debug, Clone)]
pub struct PurchaseQuoteRepository {
    db: DatabaseConnection,
}

impl PurchaseQuoteRepository {
    /// Creates a new purchase quote repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a draft supplier quote.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: PurchaseQuoteInput,
        actor: Option<Uuid>,
    ) -> RepoResult<PurchaseQuote> {
        let txn = self.db.begin().await?;
        active_supplier(&txn, tenant_id, input.supplier_id).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.quote_date).await?;
        let number = next_number(&txn, tenant_id, prefix::PURCHASE_QUOTE).await?;
        let quote = PurchaseQuote::create(tenant_id, number, input, &currency, rate, actor)?;
        purchase_quotes::ActiveModel::from(&quote).insert(&txn).await?;
        procurement_lines::replace(&txn, doc_type::PURCHASE_QUOTE, quote.id, &quote.lines).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, quote_id = %quote.id, number = %quote.number, "purchase quote created");
        Ok(quote)
    }

    /// Loads a quote with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<PurchaseQuote> {
        load_quote(&self.db, tenant_id, id, false).await
    }

    /// Lists quotes, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<PurchaseQuoteStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<PurchaseQuote>> {
        let mut select = purchase_quotes::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(purchase_quotes::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = procurement_lines::load_many(&self.db, doc_type::PURCHASE_QUOTE, &ids).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let own = lines.remove(&model.id).unwrap_or_default();
                quote_from(model, own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the lines of a draft quote.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<DocumentLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<PurchaseQuote> {
        let txn = self.db.begin().await?;
        let mut quote = load_quote(&txn, tenant_id, id, true).await?;
        quote.replace_lines(inputs, actor)?;
        purchase_quotes::ActiveModel::from(&quote).update(&txn).await?;
        procurement_lines::replace(&txn, doc_type::PURCHASE_QUOTE, quote.id, &quote.lines).await?;
        txn.commit().await?;
        Ok(quote)
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<PurchaseQuote>
    where
        F: FnOnce(&mut PurchaseQuote) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut quote = load_quote(&txn, tenant_id, id, true).await?;
        apply(&mut quote)?;
        purchase_quotes::ActiveModel::from(&quote).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, quote_id = %quote.id, status = %quote.status, "purchase quote status changed");
        Ok(quote)
    }
}

/// Purchase order repository.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    db: DatabaseConnection,
}

impl PurchaseOrderRepository {
    /// Creates a new purchase order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft order for a supplier.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: PurchaseOrderInput,
        actor: Option<Uuid>,
    ) -> RepoResult<PurchaseOrder> {
        let txn = self.db.begin().await?;
        active_supplier(&txn, tenant_id, input.supplier_id).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.order_date).await?;
        let number = next_number(&txn, tenant_id, prefix::PURCHASE_ORDER).await?;
        let order = PurchaseOrder::create(tenant_id, number, input, &currency, rate, actor)?;
        insert_order(&txn, &order).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, order_id = %order.id, number = %order.number, "purchase order created");
        Ok(order)
    }

    /// Creates a draft order from an accepted supplier quote.
    pub async fn create_from_quote(
        &self,
        tenant_id: Uuid,
        quote_id: Uuid,
        order_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> RepoResult<PurchaseOrder> {
        let txn = self.db.begin().await?;
        let quote = load_quote(&txn, tenant_id, quote_id, false).await?;
        let number = next_number(&txn, tenant_id, prefix::PURCHASE_ORDER).await?;
        let order = PurchaseOrder::from_quote(&quote, number, order_date, actor)?;
        insert_order(&txn, &order).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, order_id = %order.id, %quote_id, "purchase order created from quote");
        Ok(order)
    }

    /// Loads an order with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<PurchaseOrder> {
        load_order(&self.db, tenant_id, id, false).await
    }

    /// Lists orders, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<PurchaseOrderStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<PurchaseOrder>> {
        let mut select = purchase_orders::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(purchase_orders::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = procurement_lines::load_many(&self.db, doc_type::PURCHASE_ORDER, &ids).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let own = lines.remove(&model.id).unwrap_or_default();
                order_from(model, own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the lines of a draft order.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<DocumentLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<PurchaseOrder> {
        let txn = self.db.begin().await?;
        let mut order = load_order(&txn, tenant_id, id, true).await?;
        order.replace_lines(inputs, actor)?;
        save_order(&txn, &order).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<PurchaseOrder>
    where
        F: FnOnce(&mut PurchaseOrder) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut order = load_order(&txn, tenant_id, id, true).await?;
        apply(&mut order)?;
        purchase_orders::ActiveModel::from(&order).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, order_id = %order.id, status = %order.status, "purchase order status changed");
        Ok(order)
    }
}
