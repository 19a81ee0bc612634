//! Goods receipts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::DomainResult;
use crate::guard;
use crate::procurement::purchase_order::{LineReceipt, PurchaseOrder};

/// A record of goods arriving against a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceipt {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Order received against.
    pub purchase_order_id: Uuid,
    /// Receipt date.
    pub receipt_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Received quantities.
    pub lines: Vec<LineReceipt>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for recording a receipt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceiptInput {
    /// Order received against.
    pub purchase_order_id: Uuid,
    /// Receipt date.
    pub receipt_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Received quantities.
    pub lines: Vec<LineReceipt>,
}

impl GoodsReceipt {
    /// Records a receipt and applies its quantities to `order`.
    ///
    /// The caller persists both in one transaction.
    ///
    /// # Errors
    ///
    /// Fails if the order rejects the quantities; the order is left unchanged.
    pub fn receive(
        number: String,
        order: &mut PurchaseOrder,
        input: GoodsReceiptInput,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        order.receive(&input.lines, actor)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: order.tenant_id,
            number,
            purchase_order_id: order.id,
            receipt_date: input.receipt_date,
            notes: guard::optional(input.notes),
            lines: input.lines,
            audit: AuditInfo::new(actor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procurement::purchase_order::PurchaseOrderStatus;
    use crate::procurement::purchase_order::tests::sent_order;
    use rust_decimal_macros::dec;

    #[test]
    fn test_receipt_updates_order() {
        let mut po = sent_order();
        let input = GoodsReceiptInput {
            purchase_order_id: po.id,
            receipt_date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            notes: Some("dock 3".to_string()),
            lines: vec![LineReceipt {
                po_line_id: po.lines[1].id,
                quantity: dec!(4),
            }],
        };
        let receipt = GoodsReceipt::receive("GR-000001".to_string(), &mut po, input, None).unwrap();
        assert_eq!(receipt.purchase_order_id, po.id);
        assert_eq!(receipt.tenant_id, po.tenant_id);
        assert_eq!(po.lines[1].delivered_quantity, dec!(4));
        assert_eq!(po.status, PurchaseOrderStatus::PartiallyReceived);
    }

    #[test]
    fn test_rejected_receipt_leaves_order() {
        let mut po = sent_order();
        let input = GoodsReceiptInput {
            purchase_order_id: po.id,
            receipt_date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            notes: None,
            lines: vec![LineReceipt {
                po_line_id: po.lines[0].id,
                quantity: dec!(11),
            }],
        };
        assert!(GoodsReceipt::receive("GR-1".to_string(), &mut po, input, None).is_err());
        assert_eq!(po.status, PurchaseOrderStatus::Sent);
    }
}
