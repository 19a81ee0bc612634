//! Sales quotes.
//!
//! Lifecycle:
//! - draft → sent (send, requires lines)
//! - sent → accepted | rejected
//! - draft | sent → expired
//! - accepted → converted (produces a sales order)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::document::{self, DocumentLine, DocumentLineInput, DocumentPricing};
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;
use crate::sales::order::SalesOrder;

text_enum! {
    /// Sales quote status.
    QuoteStatus {
        /// Being prepared.
        Draft => "draft",
        /// Sent to the customer.
        Sent => "sent",
        /// Accepted by the customer.
        Accepted => "accepted",
        /// Declined by the customer.
        Rejected => "rejected",
        /// Lapsed without a decision.
        Expired => "expired",
        /// Turned into a sales order.
        Converted => "converted",
    }
}

/// A priced offer to a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuote {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer.
    pub partner_id: Uuid,
    /// Quote date.
    pub quote_date: NaiveDate,
    /// Last day the offer stands.
    pub valid_until: NaiveDate,
    /// Current status.
    pub status: QuoteStatus,
    /// Notes.
    pub notes: Option<String>,
    /// Order created on conversion.
    pub converted_order_id: Option<Uuid>,
    /// Currency and totals.
    #[serde(flatten)]
    pub pricing: DocumentPricing,
    /// Lines.
    pub lines: Vec<DocumentLine>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuoteInput {
    /// Customer.
    pub partner_id: Uuid,
    /// Quote date.
    pub quote_date: NaiveDate,
    /// Valid until.
    pub valid_until: NaiveDate,
    /// Currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Initial lines.
    #[serde(default)]
    pub lines: Vec<DocumentLineInput>,
}

impl SalesQuote {
    const ENTITY: &'static str = "sales quote";

    /// Creates a draft quote.
    ///
    /// # Errors
    ///
    /// Fails if `valid_until` precedes `quote_date` or a line is invalid.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: SalesQuoteInput,
        currency: &str,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        if input.valid_until < input.quote_date {
            return Err(DomainError::validation("valid until must not precede the quote date"));
        }
        let lines = document::build_lines(input.lines)?;
        let mut pricing = DocumentPricing::new(currency, exchange_rate)?;
        pricing.reprice(&lines)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            partner_id: input.partner_id,
            quote_date: input.quote_date,
            valid_until: input.valid_until,
            status: QuoteStatus::Draft,
            notes: guard::optional(input.notes),
            converted_order_id: None,
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
        ensure_status(Self::ENTITY, self.status, &[QuoteStatus::Draft], "edit")?;
        let lines = document::build_lines(inputs)?;
        self.pricing.reprice(&lines)?;
        self.lines = lines;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft → sent
    ///
    /// # Errors
    ///
    /// Fails unless draft with at least one line.
    pub fn send(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[QuoteStatus::Draft], "send")?;
        document::ensure_has_lines(&self.lines, "send")?;
        self.transition(QuoteStatus::Sent, actor);
        Ok(())
    }

    /// sent → accepted
    ///
    /// # Errors
    ///
    /// Fails unless sent.
    pub fn accept(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[QuoteStatus::Sent], "accept")?;
        self.transition(QuoteStatus::Accepted, actor);
        Ok(())
    }

    /// sent → rejected
    ///
    /// # Errors
    ///
    /// Fails unless sent.
    pub fn reject(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[QuoteStatus::Sent], "reject")?;
        self.transition(QuoteStatus::Rejected, actor);
        Ok(())
    }

    /// draft | sent → expired
    ///
    /// # Errors
    ///
    /// Fails from any other status.
    pub fn expire(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[QuoteStatus::Draft, QuoteStatus::Sent],
            "expire",
        )?;
        self.transition(QuoteStatus::Expired, actor);
        Ok(())
    }

    /// accepted → converted, returning a draft order with copied lines.
    ///
    /// # Errors
    ///
    /// Fails unless accepted.
    pub fn convert(
        &mut self,
        order_number: String,
        order_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> DomainResult<SalesOrder> {
        ensure_status(Self::ENTITY, self.status, &[QuoteStatus::Accepted], "convert")?;
        let order = SalesOrder::from_quote(self, order_number, order_date, actor)?;
        self.converted_order_id = Some(order.id);
        self.transition(QuoteStatus::Converted, actor);
        Ok(order)
    }

    fn transition(&mut self, status: QuoteStatus, actor: Option<Uuid>) {
        self.status = status;
        self.audit.touch(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::line_input;
    use crate::sales::order::OrderStatus;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn quote(lines: Vec<DocumentLineInput>) -> SalesQuote {
        SalesQuote::create(
            Uuid::new_v4(),
            "SQ-000001".to_string(),
            SalesQuoteInput {
                partner_id: Uuid::new_v4(),
                quote_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                valid_until: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
                currency: None,
                notes: None,
                lines,
            },
            "USD",
            Decimal::ONE,
            None,
        )
        .unwrap()
    }

    fn in_status(status: QuoteStatus) -> SalesQuote {
        let mut q = quote(vec![line_input(dec!(2), dec!(50))]);
        q.status = status;
        q
    }

    #[test]
    fn test_send_requires_lines() {
        let mut empty = quote(vec![]);
        assert!(empty.send(None).is_err());
        assert_eq!(empty.status, QuoteStatus::Draft);

        let mut q = quote(vec![line_input(dec!(2), dec!(50))]);
        assert_eq!(q.pricing.totals.grand_total, dec!(100));
        q.send(None).unwrap();
        assert_eq!(q.status, QuoteStatus::Sent);
        assert!(q.replace_lines(vec![], None).is_err());
    }

    #[rstest]
    #[case(QuoteStatus::Draft, true)]
    #[case(QuoteStatus::Sent, true)]
    #[case(QuoteStatus::Accepted, false)]
    #[case(QuoteStatus::Rejected, false)]
    #[case(QuoteStatus::Converted, false)]
    fn test_expire_guard(#[case] from: QuoteStatus, #[case] ok: bool) {
        let mut q = in_status(from);
        assert_eq!(q.expire(None).is_ok(), ok);
    }

    #[rstest]
    #[case(QuoteStatus::Draft)]
    #[case(QuoteStatus::Accepted)]
    #[case(QuoteStatus::Expired)]
    fn test_accept_and_reject_need_sent(#[case] from: QuoteStatus) {
        assert!(in_status(from).accept(None).is_err());
        assert!(in_status(from).reject(None).is_err());
    }

    #[test]
    fn test_convert_copies_lines() {
        let mut q = in_status(QuoteStatus::Sent);
        assert!(q.convert("SO-1".to_string(), q.quote_date, None).is_err());
        q.accept(None).unwrap();
        let order = q.convert("SO-000001".to_string(), q.quote_date, None).unwrap();
        assert_eq!(q.status, QuoteStatus::Converted);
        assert_eq!(q.converted_order_id, Some(order.id));
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.quote_id, Some(q.id));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.pricing.totals, q.pricing.totals);
    }

    #[test]
    fn test_valid_until_must_follow_quote_date() {
        let result = SalesQuote::create(
            Uuid::new_v4(),
            "SQ-1".to_string(),
            SalesQuoteInput {
                partner_id: Uuid::new_v4(),
                quote_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                valid_until: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                currency: None,
                notes: None,
                lines: vec![],
            },
            "USD",
            Decimal::ONE,
            None,
        );
        assert!(result.is_err());
    }
}
