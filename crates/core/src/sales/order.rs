//! Sales orders.
//!
//! Lifecycle: draft → confirmed → completed, with cancellation allowed from
//! draft or confirmed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::document::{self, DocumentLine, DocumentLineInput, DocumentPricing};
use crate::error::DomainResult;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;
use crate::sales::quote::SalesQuote;

text_enum! {
    /// Sales order status.
    OrderStatus {
        /// Being prepared.
        Draft => "draft",
        /// Confirmed with the customer.
        Confirmed => "confirmed",
        /// Fulfilled.
        Completed => "completed",
        /// Cancelled.
        Cancelled => "cancelled",
    }
}

/// A confirmed customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer.
    pub partner_id: Uuid,
    /// Order date.
    pub order_date: NaiveDate,
    /// Source quote.
    pub quote_id: Option<Uuid>,
    /// Current status.
    pub status: OrderStatus,
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

/// Input for creating an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderInput {
    /// Customer.
    pub partner_id: Uuid,
    /// Order date.
    pub order_date: NaiveDate,
    /// Currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Initial lines.
    #[serde(default)]
    pub lines: Vec<DocumentLineInput>,
}

impl SalesOrder {
    const ENTITY: &'static str = "sales order";

    /// Creates a draft order.
    ///
    /// # Errors
    ///
    /// Fails if a line is invalid or the currency/rate is malformed.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: SalesOrderInput,
        currency: &str,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        let lines = document::build_lines(input.lines)?;
        let mut pricing = DocumentPricing::new(currency, exchange_rate)?;
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            partner_id: input.partner_id,
            order_date: input.order_date,
            quote_id: None,
            status: OrderStatus::Draft,
            notes: guard::optional(input.notes),
            pricing,
            lines,
            audit: AuditInfo::new(actor),
        })
    }

    /// Builds a draft order from a quote, keeping its currency and rate.
    ///
    /// # Errors
    ///
    /// Fails if a copied line is invalid.
    pub fn from_quote(
        quote: &SalesQuote,
        number: String,
        order_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        let lines = document::build_lines(quote.lines.iter().map(DocumentLineInput::from).collect())?;
        let mut pricing = quote.pricing.clone();
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: quote.tenant_id,
            number,
            partner_id: quote.partner_id,
            order_date,
            quote_id: Some(quote.id),
            status: OrderStatus::Draft,
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
        ensure_status(Self::ENTITY, self.status, &[OrderStatus::Draft], "edit")?;
        let lines = document::build_lines(inputs)?;
        self.pricing.reprice(&lines)?;
        self.lines = lines;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft → confirmed
    ///
    /// # Errors
    ///
    /// Fails unless draft with at least one line.
    pub fn confirm(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[OrderStatus::Draft], "confirm")?;
        document::ensure_has_lines(&self.lines, "confirm")?;
        self.status = OrderStatus::Confirmed;
        self.audit.touch(actor);
        Ok(())
    }

    /// confirmed → completed
    ///
    /// # Errors
    ///
    /// Fails unless confirmed.
    pub fn complete(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[OrderStatus::Confirmed], "complete")?;
        self.status = OrderStatus::Completed;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | confirmed → cancelled
    ///
    /// # Errors
    ///
    /// Fails from any other status.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[OrderStatus::Draft, OrderStatus::Confirmed],
            "cancel",
        )?;
        self.status = OrderStatus::Cancelled;
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

    pub fn order(status: OrderStatus) -> SalesOrder {
        let mut order = SalesOrder::create(
            Uuid::new_v4(),
            "SO-000001".to_string(),
            SalesOrderInput {
                partner_id: Uuid::new_v4(),
                order_date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                currency: None,
                notes: None,
                lines: vec![line_input(dec!(4), dec!(25))],
            },
            "EUR",
            dec!(1.1),
            None,
        )
        .unwrap();
        order.status = status;
        order
    }

    #[test]
    fn test_confirm_then_complete() {
        let mut o = order(OrderStatus::Draft);
        assert_eq!(o.pricing.base_grand_total, dec!(110));
        assert!(o.complete(None).is_err());
        o.confirm(None).unwrap();
        o.complete(None).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn test_confirm_requires_lines() {
        let mut o = order(OrderStatus::Draft);
        o.replace_lines(vec![], None).unwrap();
        assert!(o.confirm(None).is_err());
    }

    #[rstest]
    #[case(OrderStatus::Draft, true)]
    #[case(OrderStatus::Confirmed, true)]
    #[case(OrderStatus::Completed, false)]
    #[case(OrderStatus::Cancelled, false)]
    fn test_cancel_guard(#[case] from: OrderStatus, #[case] ok: bool) {
        let mut o = order(from);
        assert_eq!(o.cancel(None).is_ok(), ok);
        assert_eq!(o.status, if ok { OrderStatus::Cancelled } else { from });
    }
}
