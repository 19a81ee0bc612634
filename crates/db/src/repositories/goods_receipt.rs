//! Goods receipt repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::procurement::{GoodsReceipt, GoodsReceiptInput, LineReceipt};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::{goods_receipt_lines, goods_receipts};
use crate::error::RepoResult;
use crate::repositories::purchase_order::{load_order, save_order};
use crate::scope::{TenantScoped, fetch_models, find_scoped};
use crate::sequence::{next_number, prefix};

fn receipt_from(model: goods_receipts::Model, lines: Vec<LineReceipt>) -> GoodsReceipt {
    GoodsReceipt {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        number: model.number,
        purchase_order_id: model.purchase_order_id,
        receipt_date: model.receipt_date,
        notes: model.notes,
        lines,
    }
}

impl From<&GoodsReceipt> for goods_receipts::ActiveModel {
    fn from(receipt: &GoodsReceipt) -> Self {
        let mut active = Self {
            id: Set(receipt.id),
            tenant_id: Set(receipt.tenant_id),
            number: Set(receipt.number.clone()),
            purchase_order_id: Set(receipt.purchase_order_id),
            receipt_date: Set(receipt.receipt_date),
            notes: Set(receipt.notes.clone()),
            ..Default::default()
        };
        apply_audit!(active, &receipt.audit);
        active
    }
}

fn line_from(model: goods_receipt_lines::Model) -> LineReceipt {
    LineReceipt {
        po_line_id: model.po_line_id,
        quantity: model.quantity,
    }
}

/// Goods receipt repository.
#[derive(Debug, Clone)]
pub struct GoodsReceiptRepository {
    db: DatabaseConnection,
}

impl GoodsReceiptRepository {
    /// Creates a new goods receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a receipt and applies it to the locked purchase order atomically.
    pub async fn receive(
        &self,
        tenant_id: Uuid,
        input: GoodsReceiptInput,
        actor: Option<Uuid>,
    ) -> RepoResult<GoodsReceipt> {
        let txn = self.db.begin().await?;
        let mut order = load_order(&txn, tenant_id, input.purchase_order_id, true).await?;
        let number = next_number(&txn, tenant_id, prefix::GOODS_RECEIPT).await?;
        let receipt = GoodsReceipt::receive(number, &mut order, input, actor)?;
        save_order(&txn, &order).await?;
        goods_receipts::ActiveModel::from(&receipt).insert(&txn).await?;
        goods_receipt_lines::Entity::insert_many(receipt.lines.iter().map(|line| goods_receipt_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            goods_receipt_id: Set(receipt.id),
            po_line_id: Set(line.po_line_id),
            quantity: Set(line.quantity),
        }))
        .exec(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(
            %tenant_id,
            receipt_id = %receipt.id,
            order_id = %order.id,
            order_status = %order.status,
            "goods received"
        );
        Ok(receipt)
    }

    /// Loads a receipt with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<GoodsReceipt> {
        let model = find_scoped::<goods_receipts::Entity, _>(&self.db, tenant_id, id).await?;
        let lines = goods_receipt_lines::Entity::find()
            .filter(goods_receipt_lines::Column::GoodsReceiptId.eq(id))
            .all(&self.db)
            .await?;
        Ok(receipt_from(model, lines.into_iter().map(line_from).collect()))
    }

    /// Lists receipts, optionally for one purchase order.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        purchase_order_id: Option<Uuid>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<GoodsReceipt>> {
        let mut select = goods_receipts::Entity::scoped(tenant_id);
        if let Some(order_id) = purchase_order_id {
            select = select.filter(goods_receipts::Column::PurchaseOrderId.eq(order_id));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut grouped: HashMap<Uuid, Vec<LineReceipt>> = HashMap::new();
        if !ids.is_empty() {
            let lines = goods_receipt_lines::Entity::find()
                .filter(goods_receipt_lines::Column::GoodsReceiptId.is_in(ids))
                .all(&self.db)
                .await?;
            for line in lines {
                grouped.entry(line.goods_receipt_id).or_default().push(line_from(line));
            }
        }
        let data = models
            .into_iter()
            .map(|model| {
                let own = grouped.remove(&model.id).unwrap_or_default();
                receipt_from(model, own)
            })
            .collect();
        Ok(PageResponse::new(data, page, total))
    }
}

