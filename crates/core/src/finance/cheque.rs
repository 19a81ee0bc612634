//! Cheques issued to or received from partners.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Whether the tenant wrote or received the cheque.
    ChequeDirection {
        /// Written by the tenant.
        Issued => "issued",
        /// Received from a partner.
        Received => "received",
    }
}

text_enum! {
    /// Cheque clearing status.
    ChequeStatus {
        /// Not yet deposited.
        Pending => "pending",
        /// Deposited, awaiting clearance.
        Deposited => "deposited",
        /// Funds cleared.
        Cleared => "cleared",
        /// Returned unpaid.
        Bounced => "bounced",
        /// Withdrawn before deposit.
        Cancelled => "cancelled",
    }
}

/// A cheque.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cheque {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Cheque number as printed.
    pub number: String,
    /// Issued or received.
    pub direction: ChequeDirection,
    /// Counterparty.
    pub partner_id: Uuid,
    /// Bank account (ledger account) the cheque is drawn on or deposited to.
    pub bank_account_id: Uuid,
    /// Face amount.
    pub amount: Decimal,
    /// Date written.
    pub issue_date: NaiveDate,
    /// Date payable.
    pub due_date: NaiveDate,
    /// Current status.
    pub status: ChequeStatus,
    /// When cleared.
    pub cleared_at: Option<DateTime<Utc>>,
    /// Why the cheque bounced.
    pub bounced_reason: Option<String>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for registering a cheque.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChequeInput {
    /// Cheque number.
    pub number: String,
    /// Direction.
    pub direction: ChequeDirection,
    /// Counterparty.
    pub partner_id: Uuid,
    /// Bank account.
    pub bank_account_id: Uuid,
    /// Face amount.
    pub amount: Decimal,
    /// Date written.
    pub issue_date: NaiveDate,
    /// Date payable.
    pub due_date: NaiveDate,
}

impl Cheque {
    const ENTITY: &'static str = "cheque";

    /// Registers a pending cheque.
    ///
    /// # Errors
    ///
    /// Fails for an empty number, non-positive amount, or due date before
    /// the issue date.
    pub fn create(tenant_id: Uuid, input: ChequeInput, actor: Option<Uuid>) -> DomainResult<Self> {
        if input.due_date < input.issue_date {
            return Err(DomainError::validation("due date must not precede issue date"));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number: guard::required("number", &input.number)?,
            direction: input.direction,
            partner_id: input.partner_id,
            bank_account_id: input.bank_account_id,
            amount: guard::positive("amount", input.amount)?,
            issue_date: input.issue_date,
            due_date: input.due_date,
            status: ChequeStatus::Pending,
            cleared_at: None,
            bounced_reason: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// pending → deposited
    ///
    /// # Errors
    ///
    /// Fails unless pending.
    pub fn deposit(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ChequeStatus::Pending], "deposit")?;
        self.status = ChequeStatus::Deposited;
        self.audit.touch(actor);
        Ok(())
    }

    /// deposited → cleared
    ///
    /// # Errors
    ///
    /// Fails unless deposited.
    pub fn clear(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ChequeStatus::Deposited], "clear")?;
        self.status = ChequeStatus::Cleared;
        self.cleared_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// deposited → bounced
    ///
    /// # Errors
    ///
    /// Fails unless deposited, or if the reason is empty.
    pub fn bounce(&mut self, reason: &str, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ChequeStatus::Deposited], "bounce")?;
        let reason = guard::required("bounce reason", reason)?;
        self.status = ChequeStatus::Bounced;
        self.bounced_reason = Some(reason);
        self.audit.touch(actor);
        Ok(())
    }

    /// pending → cancelled
    ///
    /// # Errors
    ///
    /// Fails unless pending.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ChequeStatus::Pending], "cancel")?;
        self.status = ChequeStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn cheque() -> Cheque {
        Cheque::create(
            Uuid::new_v4(),
            ChequeInput {
                number: "000123".to_string(),
                direction: ChequeDirection::Received,
                partner_id: Uuid::new_v4(),
                bank_account_id: Uuid::new_v4(),
                amount: dec!(2500),
                issue_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            },
            None,
        )
        .unwrap()
    }

    fn in_status(status: ChequeStatus) -> Cheque {
        let mut c = cheque();
        c.status = status;
        c
    }

    #[rstest]
    #[case(ChequeStatus::Pending, true)]
    #[case(ChequeStatus::Deposited, false)]
    #[case(ChequeStatus::Cleared, false)]
    #[case(ChequeStatus::Bounced, false)]
    #[case(ChequeStatus::Cancelled, false)]
    fn test_deposit_guard(#[case] from: ChequeStatus, #[case] ok: bool) {
        let mut c = in_status(from);
        assert_eq!(c.deposit(None).is_ok(), ok);
        assert_eq!(c.status, if ok { ChequeStatus::Deposited } else { from });
    }

    #[rstest]
    #[case(ChequeStatus::Pending, false)]
    #[case(ChequeStatus::Deposited, true)]
    #[case(ChequeStatus::Cleared, false)]
    fn test_clear_guard(#[case] from: ChequeStatus, #[case] ok: bool) {
        let mut c = in_status(from);
        assert_eq!(c.clear(None).is_ok(), ok);
        assert_eq!(c.cleared_at.is_some(), ok);
    }

    #[test]
    fn test_bounce_requires_reason() {
        let mut c = in_status(ChequeStatus::Deposited);
        assert!(c.bounce(" ", None).is_err());
        assert_eq!(c.status, ChequeStatus::Deposited);
        c.bounce("Insufficient funds", None).unwrap();
        assert_eq!(c.status, ChequeStatus::Bounced);
        assert_eq!(c.bounced_reason.as_deref(), Some("Insufficient funds"));
    }

    #[test]
    fn test_cancel_only_pending() {
        let mut c = cheque();
        c.cancel(None).unwrap();
        assert_eq!(c.status, ChequeStatus::Cancelled);
        assert!(in_status(ChequeStatus::Deposited).cancel(None).is_err());
    }

    #[test]
    fn test_create_validation() {
        let mut input = ChequeInput {
            number: "1".to_string(),
            direction: ChequeDirection::Issued,
            partner_id: Uuid::new_v4(),
            bank_account_id: Uuid::new_v4(),
            amount: dec!(0),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        };
        assert!(Cheque::create(Uuid::new_v4(), input.clone(), None).is_err());
        input.amount = dec!(10);
        input.due_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(Cheque::create(Uuid::new_v4(), input, None).is_err());
    }
}
