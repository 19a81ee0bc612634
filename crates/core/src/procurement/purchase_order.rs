//! Purchase orders.
//!
//! Lifecycle:
//! - draft → approved → sent
//! - sent | partially_received → partially_received | received (receive)
//! - received → closed
//! - draft | approved → cancelled

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::document::{self, DocumentLine, DocumentLineInput, DocumentPricing};
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;
use crate::procurement::purchase_quote::{PurchaseQuote, PurchaseQuoteStatus};

text_enum! {
    /// Purchase order status.
    PurchaseOrderStatus {
        /// Being prepared.
        Draft => "draft",
        /// Approved internally.
        Approved => "approved",
        /// Sent to the supplier.
        Sent => "sent",
        /// Some goods received.
        PartiallyReceived => "partially_received",
        /// Every line fully received.
        Received => "received",
        /// Closed out.
        Closed => "closed",
        /// Cancelled.
        Cancelled => "cancelled",
    }
}

/// Quantity received against one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReceipt {
    /// Order line being received.
    pub po_line_id: Uuid,
    /// Quantity received now.
    pub quantity: Decimal,
}

/// An order placed with a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Supplier.
    pub supplier_id: Uuid,
    /// Order date.
    pub order_date: NaiveDate,
    /// Expected delivery.
    pub expected_date: Option<NaiveDate>,
    /// Source quote.
    pub purchase_quote_id: Option<Uuid>,
    /// Current status.
    pub status: PurchaseOrderStatus,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver.
    pub approved_by: Option<Uuid>,
    /// Notes.
    pub notes: Option<String>,
    /// Currency and totals.
    #[serde(flatten)]
    pub pricing: DocumentPricing,
    /// Lines.
    pub lines: Vec<DocumentLine>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderInput {
    /// Supplier.
    pub supplier_id: Uuid,
    /// Order date.
    pub order_date: NaiveDate,
    /// Expected delivery.
    pub expected_date: Option<NaiveDate>,
    /// Currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Initial lines.
    #[serde(default)]
    pub lines: Vec<DocumentLineInput>,
}

impl PurchaseOrder {
    const ENTITY: &'static str = "purchase order";

    /// Creates a draft order.
    ///
    /// # Errors
    ///
    /// Fails if the expected date precedes the order date or a line is invalid.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: PurchaseOrderInput,
        currency: &str,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        if input.expected_date.is_some_and(|d| d < input.order_date) {
            return Err(DomainError::validation("expected date must not precede the order date"));
        }
        let lines = document::build_lines(input.lines)?;
        let mut pricing = DocumentPricing::new(currency, exchange_rate)?;
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            supplier_id: input.supplier_id,
            order_date: input.order_date,
            expected_date: input.expected_date,
            purchase_quote_id: None,
            status: PurchaseOrderStatus::Draft,
            approved_at: None,
            approved_by: None,
            notes: guard::optional(input.notes),
            pricing,
            lines,
            audit: AuditInfo::new(actor),
        })
    }

    /// Builds a draft order from an accepted supplier quote.
    ///
    /// # Errors
    ///
    /// Fails unless the quote is accepted.
    pub fn from_quote(
        quote: &PurchaseQuote,
        number: String,
        order_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        ensure_status(
            "purchase quote",
            quote.status,
            &[PurchaseQuoteStatus::Accepted],
            "order from",
        )?;
        let lines = document::build_lines(quote.lines.iter().map(DocumentLineInput::from).collect())?;
        let mut pricing = quote.pricing.clone();
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: quote.tenant_id,
            number,
            supplier_id: quote.supplier_id,
            order_date,
            expected_date: None,
            purchase_quote_id: Some(quote.id),
            status: PurchaseOrderStatus::Draft,
            approved_at: None,
            approved_by: None,
            notes: quote.notes.clone(),
            pricing,
            lines,
            audit: AuditInfo::new(actor),
        })
    }

    /// Replaces the lines of a draft.
    ///
    /// # Errors
    ///
    /// Fails unless draft or if a line is invalid.
    pub fn replace_lines(&mut self, inputs: Vec<DocumentLineInput>, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseOrderStatus::Draft], "edit")?;
        let lines = document::build_lines(inputs)?;
        self.pricing.reprice(&lines)?;
        self.lines = lines;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft → approved
    ///
    /// # Errors
    ///
    /// Fails unless draft with at least one line.
    pub fn approve(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseOrderStatus::Draft], "approve")?;
        document::ensure_has_lines(&self.lines, "approve")?;
        self.status = PurchaseOrderStatus::Approved;
        self.approved_at = Some(Utc::now());
        self.approved_by = actor;
        self.audit.touch(actor);
        Ok(())
    }

    /// approved → sent
    ///
    /// # Errors
    ///
    /// Fails unless approved.
    pub fn send(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseOrderStatus::Approved], "send")?;
        self.status = PurchaseOrderStatus::Sent;
        self.audit.touch(actor);
        Ok(())
    }

    /// Applies received quantities. Either every receipt applies or none do.
    ///
    /// # Errors
    ///
    /// Fails unless sent or partially received, when a line is unknown or
    /// repeated, or when a quantity is not positive or exceeds what is
    /// outstanding.
    pub fn receive(&mut self, receipts: &[LineReceipt], actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[PurchaseOrderStatus::Sent, PurchaseOrderStatus::PartiallyReceived],
            "receive",
        )?;
        if receipts.is_empty() {
            return Err(DomainError::validation("at least one receipt line is required"));
        }
        let mut indices = Vec::with_capacity(receipts.len());
        for receipt in receipts {
            guard::positive("received quantity", receipt.quantity)?;
            let index = self
                .lines
                .iter()
                .position(|line| line.id == receipt.po_line_id)
                .ok_or_else(|| {
                    DomainError::validation(format!("line {} is not on this order", receipt.po_line_id))
                })?;
            if indices.contains(&index) {
                return Err(DomainError::validation(format!(
                    "line {} is listed more than once",
                    receipt.po_line_id
                )));
            }
            let line = &self.lines[index];
            if receipt.quantity > line.outstanding_quantity() {
                return Err(DomainError::validation(format!(
                    "received quantity {} exceeds the {} outstanding on line {}",
                    receipt.quantity,
                    line.outstanding_quantity(),
                    line.line_no
                )));
            }
            indices.push(index);
        }
        for (receipt, index) in receipts.iter().zip(indices) {
            self.lines[index].delivered_quantity += receipt.quantity;
        }
        self.status = if self.lines.iter().all(|line| line.outstanding_quantity().is_zero()) {
            PurchaseOrderStatus::Received
        } else {
            PurchaseOrderStatus::PartiallyReceived
        };
        self.audit.touch(actor);
        Ok(())
    }

    /// received → closed
    ///
    /// # Errors
    ///
    /// Fails unless received.
    pub fn close(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseOrderStatus::Received], "close")?;
        self.status = PurchaseOrderStatus::Closed;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | approved → cancelled
    ///
    /// # Errors
    ///
    /// Fails once sent.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[PurchaseOrderStatus::Draft, PurchaseOrderStatus::Approved],
            "cancel",
        )?;
        self.status = PurchaseOrderStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::document::test_support::line_input;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    pub fn sent_order() -> PurchaseOrder {
        let mut po = PurchaseOrder::create(
            Uuid::new_v4(),
            "PO-000001".to_string(),
            PurchaseOrderInput {
                supplier_id: Uuid::new_v4(),
                order_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
                expected_date: None,
                currency: None,
                notes: None,
                lines: vec![line_input(dec!(10), dec!(5)), line_input(dec!(4), dec!(20))],
            },
            "USD",
            Decimal::ONE,
            None,
        )
        .unwrap();
        let approver = Uuid::new_v4();
        po.approve(Some(approver)).unwrap();
        assert_eq!(po.approved_by, Some(approver));
        po.send(None).unwrap();
        po
    }

    fn receipt(po: &PurchaseOrder, line: usize, quantity: Decimal) -> LineReceipt {
        LineReceipt {
            po_line_id: po.lines[line].id,
            quantity,
        }
    }

    #[test]
    fn test_partial_then_full_receipt() {
        let mut po = sent_order();
        po.receive(&[receipt(&po, 0, dec!(6))], None).unwrap();
        assert_eq!(po.status, PurchaseOrderStatus::PartiallyReceived);
        assert_eq!(po.lines[0].delivered_quantity, dec!(6));

        let rest = [receipt(&po, 0, dec!(4)), receipt(&po, 1, dec!(4))];
        po.receive(&rest, None).unwrap();
        assert_eq!(po.status, PurchaseOrderStatus::Received);
        po.close(None).unwrap();
        assert_eq!(po.status, PurchaseOrderStatus::Closed);
    }

    #[test]
    fn test_over_receipt_applies_nothing() {
        let mut po = sent_order();
        let batch = [receipt(&po, 0, dec!(2)), receipt(&po, 1, dec!(5))];
        assert!(po.receive(&batch, None).is_err());
        assert!(po.lines.iter().all(|l| l.delivered_quantity.is_zero()));
        assert_eq!(po.status, PurchaseOrderStatus::Sent);
    }

    #[test]
    fn test_unknown_and_duplicate_lines_rejected() {
        let mut po = sent_order();
        let unknown = LineReceipt {
            po_line_id: Uuid::new_v4(),
            quantity: dec!(1),
        };
        assert!(po.receive(&[unknown], None).is_err());
        let dup = [receipt(&po, 0, dec!(1)), receipt(&po, 0, dec!(1))];
        assert!(po.receive(&dup, None).is_err());
        assert!(po.receive(&[], None).is_err());
    }

    #[rstest]
    #[case(PurchaseOrderStatus::Draft, true)]
    #[case(PurchaseOrderStatus::Approved, true)]
    #[case(PurchaseOrderStatus::Sent, false)]
    #[case(PurchaseOrderStatus::PartiallyReceived, false)]
    #[case(PurchaseOrderStatus::Closed, false)]
    fn test_cancel_guard(#[case] from: PurchaseOrderStatus, #[case] ok: bool) {
        let mut po = sent_order();
        po.status = from;
        assert_eq!(po.cancel(None).is_ok(), ok);
    }

    #[rstest]
    #[case(PurchaseOrderStatus::Draft)]
    #[case(PurchaseOrderStatus::Approved)]
    #[case(PurchaseOrderStatus::Received)]
    fn test_receive_guard(#[case] from: PurchaseOrderStatus) {
        let mut po = sent_order();
        po.status = from;
        let r = receipt(&po, 0, dec!(1));
        assert!(matches!(po.receive(&[r], None), Err(DomainError::InvalidTransition { .. })));
    }
}
