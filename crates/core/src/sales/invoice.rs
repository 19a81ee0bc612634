//! Sales invoices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::document::{self, DocumentLine, DocumentLineInput, DocumentPricing};
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;
use crate::sales::order::{OrderStatus, SalesOrder};

text_enum! {
    /// Sales invoice status.
    InvoiceStatus {
        /// Being prepared.
        Draft => "draft",
        /// Sent to the customer, nothing paid.
        Issued => "issued",
        /// Some payments received.
        PartiallyPaid => "partially_paid",
        /// Fully settled.
        Paid => "paid",
        /// Cancelled.
        Cancelled => "cancelled",
    }
}

/// A customer invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoice {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer.
    pub partner_id: Uuid,
    /// Source order.
    pub order_id: Option<Uuid>,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Payments received so far.
    pub amount_paid: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
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

/// Input for creating an invoice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoiceInput {
    /// Customer.
    pub partner_id: Uuid,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Initial lines.
    #[serde(default)]
    pub lines: Vec<DocumentLineInput>,
}

fn check_dates(invoice_date: NaiveDate, due_date: NaiveDate) -> DomainResult<()> {
    if due_date < invoice_date {
        return Err(DomainError::validation("due date must not precede the invoice date"));
    }
    Ok(())
}

impl SalesInvoice {
    const ENTITY: &'static str = "sales invoice";

    /// Creates a draft invoice.
    ///
    /// # Errors
    ///
    /// Fails if the due date precedes the invoice date or a line is invalid.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: SalesInvoiceInput,
        currency: &str,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        check_dates(input.invoice_date, input.due_date)?;
        let lines = document::build_lines(input.lines)?;
        let mut pricing = DocumentPricing::new(currency, exchange_rate)?;
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            partner_id: input.partner_id,
            order_id: None,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            notes: guard::optional(input.notes),
            pricing,
            lines,
            audit: AuditInfo::new(actor),
        })
    }

    /// Builds a draft invoice billing every line of a confirmed or completed order.
    ///
    /// # Errors
    ///
    /// Fails if the order is not confirmed or completed, or the dates are inverted.
    pub fn from_order(
        order: &SalesOrder,
        number: String,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        ensure_status(
            "sales order",
            order.status,
            &[OrderStatus::Confirmed, OrderStatus::Completed],
            "invoice",
        )?;
        check_dates(invoice_date, due_date)?;
        let lines = document::build_lines(order.lines.iter().map(DocumentLineInput::from).collect())?;
        let mut pricing = order.pricing.clone();
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: order.tenant_id,
            number,
            partner_id: order.partner_id,
            order_id: Some(order.id),
            invoice_date,
            due_date,
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            notes: order.notes.clone(),
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
        ensure_status(Self::ENTITY, self.status, &[InvoiceStatus::Draft], "edit")?;
        let lines = document::build_lines(inputs)?;
        self.pricing.reprice(&lines)?;
        self.lines = lines;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft → issued
    ///
    /// # Errors
    ///
    /// Fails unless draft with at least one line.
    pub fn issue(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[InvoiceStatus::Draft], "issue")?;
        document::ensure_has_lines(&self.lines, "issue")?;
        self.status = InvoiceStatus::Issued;
        self.audit.touch(actor);
        Ok(())
    }

    /// Records a customer payment.
    ///
    /// # Errors
    ///
    /// Fails unless issued or partially paid, or if the amount is not
    /// within the balance due.
    pub fn record_payment(&mut self, amount: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[InvoiceStatus::Issued, InvoiceStatus::PartiallyPaid],
            "record payment on",
        )?;
        self.amount_paid = document::apply_payment(self.pricing.totals.grand_total, self.amount_paid, amount)?;
        self.status = if self.balance_due().is_zero() {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        };
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | issued → cancelled, only while nothing has been paid.
    ///
    /// # Errors
    ///
    /// Fails from any other status or once payments exist.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[InvoiceStatus::Draft, InvoiceStatus::Issued],
            "cancel",
        )?;
        if !self.amount_paid.is_zero() {
            return Err(DomainError::invalid("Cannot cancel an invoice with payments"));
        }
        self.status = InvoiceStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::line_input;
    use crate::sales::order::tests::order;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn issued() -> SalesInvoice {
        let mut invoice = SalesInvoice::create(
            Uuid::new_v4(),
            "SI-000001".to_string(),
            SalesInvoiceInput {
                partner_id: Uuid::new_v4(),
                invoice_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
                currency: None,
                notes: None,
                lines: vec![line_input(dec!(1), dec!(300))],
            },
            "USD",
            Decimal::ONE,
            None,
        )
        .unwrap();
        invoice.issue(None).unwrap();
        invoice
    }

    #[test]
    fn test_partial_then_full_payment() {
        let mut invoice = issued();
        invoice.record_payment(dec!(100), None).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(invoice.balance_due(), dec!(200));

        assert!(invoice.record_payment(dec!(200.01), None).is_err());
        assert_eq!(invoice.amount_paid, dec!(100));

        invoice.record_payment(dec!(200), None).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.record_payment(dec!(1), None).is_err());
    }

    #[test]
    fn test_payment_requires_issued() {
        let mut invoice = issued();
        invoice.status = InvoiceStatus::Draft;
        assert!(invoice.record_payment(dec!(10), None).is_err());
    }

    #[test]
    fn test_cancel_blocked_after_payment() {
        let mut invoice = issued();
        invoice.record_payment(dec!(10), None).unwrap();
        assert!(invoice.cancel(None).is_err());

        let mut fresh = issued();
        fresh.cancel(None).unwrap();
        assert_eq!(fresh.status, InvoiceStatus::Cancelled);
    }

    #[rstest]
    #[case(OrderStatus::Draft, false)]
    #[case(OrderStatus::Confirmed, true)]
    #[case(OrderStatus::Completed, true)]
    #[case(OrderStatus::Cancelled, false)]
    fn test_from_order_guard(#[case] status: OrderStatus, #[case] ok: bool) {
        let o = order(status);
        let result = SalesInvoice::from_order(&o, "SI-1".to_string(), o.order_date, o.order_date, None);
        assert_eq!(result.is_ok(), ok);
        if let Ok(invoice) = result {
            assert_eq!(invoice.order_id, Some(o.id));
            assert_eq!(invoice.pricing, o.pricing);
        }
    }

    #[test]
    fn test_due_date_before_invoice_date_rejected() {
        let o = order(OrderStatus::Confirmed);
        let early = o.order_date.pred_opt().unwrap();
        assert!(SalesInvoice::from_order(&o, "SI-1".to_string(), o.order_date, early, None).is_err());
    }
}
