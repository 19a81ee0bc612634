//! Supplier quotations.

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
    /// Purchase quote status.
    PurchaseQuoteStatus {
        /// Being requested.
        Draft => "draft",
        /// Received from the supplier and under review.
        Submitted => "submitted",
        /// Accepted.
        Accepted => "accepted",
        /// Declined.
        Rejected => "rejected",
        /// Lapsed.
        Expired => "expired",
    }
}

/// A supplier's priced offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuote {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Supplier.
    pub supplier_id: Uuid,
    /// Quote date.
    pub quote_date: NaiveDate,
    /// Last valid day.
    pub valid_until: NaiveDate,
    /// Current status.
    pub status: PurchaseQuoteStatus,
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

/// Input for creating a purchase quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuoteInput {
    /// Supplier.
    pub supplier_id: Uuid,
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

impl PurchaseQuote {
    const ENTITY: &'static str = "purchase quote";

    /// Creates a draft purchase quote.
    ///
    /// # Errors
    ///
    /// Fails for inverted dates or an invalid line.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: PurchaseQuoteInput,
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
            supplier_id: input.supplier_id,
            quote_date: input.quote_date,
            valid_until: input.valid_until,
            status: PurchaseQuoteStatus::Draft,
            notes: guard::optional(input.notes),
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
        ensure_status(Self::ENTITY, self.status, &[PurchaseQuoteStatus::Draft], "edit")?;
        let lines = document::build_lines(inputs)?;
        self.pricing.reprice(&lines)?;
        self.lines = lines;
        self.audit.touch(actor);
        Ok(())
    }

    /// draft → submitted
    ///
    /// # Errors
    ///
    /// Fails unless draft with at least one line.
    pub fn submit(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseQuoteStatus::Draft], "submit")?;
        document::ensure_has_lines(&self.lines, "submit")?;
        self.set_status(PurchaseQuoteStatus::Submitted, actor);
        Ok(())
    }

    /// submitted → accepted
    ///
    /// # Errors
    ///
    /// Fails unless submitted.
    pub fn accept(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseQuoteStatus::Submitted], "accept")?;
        self.set_status(PurchaseQuoteStatus::Accepted, actor);
        Ok(())
    }

    /// submitted → rejected
    ///
    /// # Errors
    ///
    /// Fails unless submitted.
    pub fn reject(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PurchaseQuoteStatus::Submitted], "reject")?;
        self.set_status(PurchaseQuoteStatus::Rejected, actor);
        Ok(())
    }

    /// draft | submitted → expired
    ///
    /// # Errors
    ///
    /// Fails from any other status.
    pub fn expire(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[PurchaseQuoteStatus::Draft, PurchaseQuoteStatus::Submitted],
            "expire",
        )?;
        self.set_status(PurchaseQuoteStatus::Expired, actor);
        Ok(())
    }

    fn set_status(&mut self, status: PurchaseQuoteStatus, actor: Option<Uuid>) {
        self.status = status;
        self.audit.touch(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::line_input;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn quote(status: PurchaseQuoteStatus) -> PurchaseQuote {
        let mut q = PurchaseQuote::create(
            Uuid::new_v4(),
            "PQ-000001".to_string(),
            PurchaseQuoteInput {
                supplier_id: Uuid::new_v4(),
                quote_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                valid_until: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
                currency: None,
                notes: None,
                lines: vec![line_input(dec!(10), dec!(9.99))],
            },
            "USD",
            Decimal::ONE,
            None,
        )
        .unwrap();
        q.status = status;
        q
    }

    #[test]
    fn test_submit_then_accept() {
        let mut q = quote(PurchaseQuoteStatus::Draft);
        assert_eq!(q.pricing.totals.grand_total, dec!(99.90));
        q.submit(None).unwrap();
        q.accept(None).unwrap();
        assert_eq!(q.status, PurchaseQuoteStatus::Accepted);
    }

    #[test]
    fn test_submit_requires_lines() {
        let mut q = quote(PurchaseQuoteStatus::Draft);
        q.replace_lines(vec![], None).unwrap();
        assert!(q.submit(None).is_err());
        assert_eq!(q.status, PurchaseQuoteStatus::Draft);
    }

    #[rstest]
    #[case(PurchaseQuoteStatus::Draft, true)]
    #[case(PurchaseQuoteStatus::Submitted, true)]
    #[case(PurchaseQuoteStatus::Accepted, false)]
    #[case(PurchaseQuoteStatus::Rejected, false)]
    #[case(PurchaseQuoteStatus::Expired, false)]
    fn test_expire_guard(#[case] from: PurchaseQuoteStatus, #[case] ok: bool) {
        let mut q = quote(from);
        assert_eq!(q.expire(None).is_ok(), ok);
    }

    #[rstest]
    #[case(PurchaseQuoteStatus::Draft)]
    #[case(PurchaseQuoteStatus::Rejected)]
    fn test_reject_needs_submitted(#[case] from: PurchaseQuoteStatus) {
        let mut q = quote(from);
        assert!(q.reject(None).is_err());
        assert_eq!(q.status, from);
    }
}
