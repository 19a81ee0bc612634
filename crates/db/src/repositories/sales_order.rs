//! Sales order repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_core::document::{DocumentLine, DocumentLineInput};
use tessera_core::sales::{OrderStatus, SalesOrder, SalesOrderInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, apply_pricing, audit_info, decode, document_pricing};
use crate::entities::sales_orders;
use crate::error::RepoResult;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::lines::{doc_type, sales_lines};
use crate::repositories::partner::active_customer;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn order_from(model: sales_orders::Model, lines: Vec<DocumentLine>) -> Result<SalesOrder, DbErr> {
    Ok(SalesOrder {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("order status", &model.status, OrderStatus::parse)?,
        number: model.number,
        partner_id: model.partner_id,
        order_date: model.order_date,
        quote_id: model.quote_id,
        notes: model.notes,
        lines,
    })
}

impl From<&SalesOrder> for sales_orders::ActiveModel {
    fn from(order: &SalesOrder) -> Self {
        let mut active = Self {
            id: Set(order.id),
            tenant_id: Set(order.tenant_id),
            number: Set(order.number.clone()),
            partner_id: Set(order.partner_id),
            order_date: Set(order.order_date),
            quote_id: Set(order.quote_id),
            status: Set(order.status.as_str().to_string()),
            notes: Set(order.notes.clone()),
            ..Default::default()
        };
        apply_pricing!(active, &order.pricing);
        apply_audit!(active, &order.audit);
        active
    }
}

/// Inserts an order header with its lines.
pub(crate) async fn insert_order<C: ConnectionTrait>(db: &C, order: &SalesOrder) -> Result<(), DbErr> {
    sales_orders::ActiveModel::from(order).insert(db).await?;
    sales_lines::replace(db, doc_type::SALES_ORDER, order.id, &order.lines).await
}

/// Loads an order with its lines, optionally under a row lock.
pub(crate) async fn load_order<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
    lock: bool,
) -> RepoResult<SalesOrder> {
    let model = if lock {
        lock_scoped::<sales_orders::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<sales_orders::Entity, _>(db, tenant_id, id).await?
    };
    let lines = sales_lines::load(db, doc_type::SALES_ORDER, id).await?;
    Ok(order_from(model, lines)?)
}

/// Sales order repository.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    db: DatabaseConnection,
}

impl SalesOrderRepository {
    /// Creates a new sales order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft order for a customer.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SalesOrderInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesOrder> {
        let txn = self.db.begin().await?;
        active_customer(&txn, tenant_id, input.partner_id).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.order_date).await?;
        let number = next_number(&txn, tenant_id, prefix::SALES_ORDER).await?;
        let order = SalesOrder::create(tenant_id, number, input, &currency, rate, actor)?;
        insert_order(&txn, &order).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, order_id = %order.id, number = %order.number, "sales order created");
        Ok(order)
    }

    /// Loads an order with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SalesOrder> {
        load_order(&self.db, tenant_id, id, false).await
    }

    /// Lists orders, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<SalesOrder>> {
        let mut select = sales_orders::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(sales_orders::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = sales_lines::load_many(&self.db, doc_type::SALES_ORDER, &ids).await?;
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
    ) -> RepoResult<SalesOrder> {
        let txn = self.db.begin().await?;
        let mut order = load_order(&txn, tenant_id, id, true).await?;
        order.replace_lines(inputs, actor)?;
        sales_orders::ActiveModel::from(&order).update(&txn).await?;
        sales_lines::replace(&txn, doc_type::SALES_ORDER, order.id, &order.lines).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<SalesOrder>
    where
        F: FnOnce(&mut SalesOrder) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut order = load_order(&txn, tenant_id, id, true).await?;
        apply(&mut order)?;
        sales_orders::ActiveModel::from(&order).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, order_id = %order.id, status = %order.status, "sales order status changed");
        Ok(order)
    }
}
