//! Credit notes owed to customers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Credit note status.
    CreditNoteStatus {
        /// Being prepared.
        Draft => "draft",
        /// Issued to the partner, available to apply.
        Issued => "issued",
        /// Fully applied.
        Applied => "applied",
        /// Withdrawn.
        Cancelled => "cancelled",
    }
}

/// A credit note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditNote {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Customer credited.
    pub partner_id: Uuid,
    /// Invoice the credit relates to.
    pub invoice_id: Option<Uuid>,
    /// Credit amount.
    pub amount: Decimal,
    /// Amount already applied.
    pub applied_amount: Decimal,
    /// Why the credit was raised.
    pub reason: String,
    /// Current status.
    pub status: CreditNoteStatus,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a credit note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteInput {
    /// Customer credited.
    pub partner_id: Uuid,
    /// Related invoice.
    pub invoice_id: Option<Uuid>,
    /// Credit amount.
    pub amount: Decimal,
    /// Reason.
    pub reason: String,
}

impl CreditNote {
    const ENTITY: &'static str = "credit note";

    /// Creates a draft credit note.
    ///
    /// # Errors
    ///
    /// Fails for a non-positive amount or empty reason.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: CreditNoteInput,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            partner_id: input.partner_id,
            invoice_id: input.invoice_id,
            amount: guard::positive("amount", input.amount)?,
            applied_amount: Decimal::ZERO,
            reason: guard::required("reason", &input.reason)?,
            status: CreditNoteStatus::Draft,
            audit: AuditInfo::new(actor),
        })
    }

    /// Amount still available to apply.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.amount - self.applied_amount
    }

    /// draft → issued
    ///
    /// # Errors
    ///
    /// Fails unless draft.
    pub fn issue(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[CreditNoteStatus::Draft], "issue")?;
        self.status = CreditNoteStatus::Issued;
        self.audit.touch(actor);
        Ok(())
    }

    /// Applies part of the credit; becomes applied once nothing remains.
    ///
    /// # Errors
    ///
    /// Fails unless issued, or if the amount is not in `(0, remaining]`.
    pub fn apply(&mut self, amount: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[CreditNoteStatus::Issued], "apply")?;
        guard::positive("amount", amount)?;
        if amount > self.remaining() {
            return Err(DomainError::validation(format!(
                "amount exceeds remaining credit of {}",
                self.remaining()
            )));
        }
        self.applied_amount += amount;
        if self.remaining().is_zero() {
            self.status = CreditNoteStatus::Applied;
        }
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | issued → cancelled, only while nothing has been applied.
    ///
    /// # Errors
    ///
    /// Fails from other statuses or after a partial application.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[CreditNoteStatus::Draft, CreditNoteStatus::Issued],
            "cancel",
        )?;
        if self.applied_amount > Decimal::ZERO {
            return Err(DomainError::invalid("Cannot cancel a partially applied credit note"));
        }
        self.status = CreditNoteStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn note() -> CreditNote {
        CreditNote::create(
            Uuid::new_v4(),
            "CN-000001".to_string(),
            CreditNoteInput {
                partner_id: Uuid::new_v4(),
                invoice_id: None,
                amount: dec!(300),
                reason: "Damaged goods".to_string(),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_in_parts() {
        let mut cn = note();
        assert!(cn.apply(dec!(10), None).is_err());
        cn.issue(None).unwrap();
        cn.apply(dec!(100), None).unwrap();
        assert_eq!(cn.status, CreditNoteStatus::Issued);
        assert_eq!(cn.remaining(), dec!(200));
        assert!(cn.apply(dec!(200.01), None).is_err());
        assert!(cn.apply(dec!(0), None).is_err());
        cn.apply(dec!(200), None).unwrap();
        assert_eq!(cn.status, CreditNoteStatus::Applied);
    }

    #[test]
    fn test_cancel_rules() {
        let mut draft = note();
        draft.cancel(None).unwrap();
        assert_eq!(draft.status, CreditNoteStatus::Cancelled);

        let mut partial = note();
        partial.issue(None).unwrap();
        partial.apply(dec!(1), None).unwrap();
        assert!(partial.cancel(None).is_err());
        assert_eq!(partial.status, CreditNoteStatus::Issued);
    }
}
