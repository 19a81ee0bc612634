//! Supplier bills.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::document::{self, DocumentLine, DocumentLineInput, DocumentPricing};
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Supplier bill status.
    BillStatus {
        /// Entered, awaiting approval.
        Draft => "draft",
        /// Approved for payment.
        Approved => "approved",
        /// Some payments made.
        PartiallyPaid => "partially_paid",
        /// Fully settled.
        Paid => "paid",
        /// Cancelled.
        Cancelled => "cancelled",
    }
}

/// A bill received from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBill {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Supplier.
    pub supplier_id: Uuid,
    /// Related order.
    pub purchase_order_id: Option<Uuid>,
    /// Supplier's own invoice number.
    pub supplier_reference: Option<String>,
    /// Bill date.
    pub bill_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Payments made so far.
    pub amount_paid: Decimal,
    /// Current status.
    pub status: BillStatus,
    /// Currency and totals.
    #[serde(flatten)]
    pub pricing: DocumentPricing,
    /// Lines.
    pub lines: Vec<DocumentLine>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for entering a bill.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierBillInput {
    /// Supplier.
    pub supplier_id: Uuid,
    /// Related order.
    pub purchase_order_id: Option<Uuid>,
    /// Supplier reference.
    pub supplier_reference: Option<String>,
    /// Bill date.
    pub bill_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Lines.
    #[serde(default)]
    pub lines: Vec<DocumentLineInput>,
}

impl SupplierBill {
    const ENTITY: &'static str = "supplier bill";

    /// Enters a draft bill.
    ///
    /// # Errors
    ///
    /// Fails if the due date precedes the bill date or a line is invalid.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: SupplierBillInput,
        currency: &str,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        if input.due_date < input.bill_date {
            return Err(DomainError::validation("due date must not precede the bill date"));
        }
        let lines = document::build_lines(input.lines)?;
        let mut pricing = DocumentPricing::new(currency, exchange_rate)?;
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            supplier_id: input.supplier_id,
            purchase_order_id: input.purchase_order_id,
            supplier_reference: guard::optional(input.supplier_reference),
            bill_date: input.bill_date,
            due_date: input.due_date,
            amount_paid: Decimal::ZERO,
            status: BillStatus::Draft,
            pricing,
            lines,
            audit: AuditInfo::new(actor),
        })
    }

    /// Outstanding amount.
    pub fn balance_due(&self) -> Decimal {
        self.pricing.totals.grand_total - self.amount_paid
    }

    /// Replaces the lines of a draft.
    ///
    /// # Errors
    ///
    /// Fails unless draft or if a line is invalid.
    pub fn replace_lines(&mut self, inputs: Vec<DocumentLineInput>, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[BillStatus::Draft], "edit")?;
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
        ensure_status(Self::ENTITY, self.status, &[BillStatus::Draft], "approve")?;
        document::ensure_has_lines(&self.lines, "approve")?;
        self.status = BillStatus::Approved;
        self.audit.touch(actor);
        Ok(())
    }

    /// Records a payment to the supplier.
    ///
    /// # Errors
    ///
    /// Fails unless approved or partially paid, or if the amount is not
    /// within the balance due.
    pub fn record_payment(&mut self, amount: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[BillStatus::Approved, BillStatus::PartiallyPaid],
            "record payment on",
        )?;
        self.amount_paid = document::apply_payment(self.pricing.totals.grand_total, self.amount_paid, amount)?;
        self.status = if self.balance_due().is_zero() {
            BillStatus::Paid
        } else {
            BillStatus::PartiallyPaid
        };
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | approved → cancelled, only while nothing has been paid.
    ///
    /// # Errors
    ///
    /// Fails from any other status or once payments exist.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[BillStatus::Draft, BillStatus::Approved],
            "cancel",
        )?;
        if !self.amount_paid.is_zero() {
            return Err(DomainError::invalid("Cannot cancel a bill with payments"));
        }
        self.status = BillStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::line_input;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn bill(status: BillStatus) -> SupplierBill {
        let mut b = SupplierBill::create(
            Uuid::new_v4(),
            "BILL-000001".to_string(),
            SupplierBillInput {
                supplier_id: Uuid::new_v4(),
                purchase_order_id: None,
                supplier_reference: Some("INV-9".to_string()),
                bill_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                currency: None,
                lines: vec![line_input(dec!(2), dec!(250))],
            },
            "USD",
            Decimal::ONE,
            None,
        )
        .unwrap();
        b.status = status;
        b
    }

    #[test]
    fn test_payment_flow() {
        let mut b = bill(BillStatus::Draft);
        assert!(b.record_payment(dec!(10), None).is_err());
        b.approve(None).unwrap();
        b.record_payment(dec!(125), None).unwrap();
        assert_eq!(b.status, BillStatus::PartiallyPaid);
        assert!(b.cancel(None).is_err());
        b.record_payment(dec!(375), None).unwrap();
        assert_eq!(b.status, BillStatus::Paid);
        assert!(b.balance_due().is_zero());
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut b = bill(BillStatus::Approved);
        assert!(b.record_payment(dec!(500.01), None).is_err());
        assert!(b.record_payment(dec!(-1), None).is_err());
        assert_eq!(b.amount_paid, Decimal::ZERO);
    }

    #[rstest]
    #[case(BillStatus::Draft, true)]
    #[case(BillStatus::Approved, true)]
    #[case(BillStatus::PartiallyPaid, false)]
    #[case(BillStatus::Paid, false)]
    #[case(BillStatus::Cancelled, false)]
    fn test_cancel_guard(#[case] from: BillStatus, #[case] ok: bool) {
        let mut b = bill(from);
        assert_eq!(b.cancel(None).is_ok(), ok);
    }
}
