//! Customer returns against invoices.
//!
//! requested → approved → received → refunded, or requested → rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::DomainResult;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Return status.
    ReturnStatus {
        /// Raised by the customer.
        Requested => "requested",
        /// Accepted for return.
        Approved => "approved",
        /// Goods back in stock.
        Received => "received",
        /// Money paid back.
        Refunded => "refunded",
        /// Declined.
        Rejected => "rejected",
    }
}

/// A customer return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReturn {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// Invoice being returned against.
    pub invoice_id: Uuid,
    /// Customer.
    pub partner_id: Uuid,
    /// Why the goods come back.
    pub reason: String,
    /// Amount to refund.
    pub amount: Decimal,
    /// Current status.
    pub status: ReturnStatus,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Receipt time.
    pub received_at: Option<DateTime<Utc>>,
    /// Refund time.
    pub refunded_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for raising a return.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReturnInput {
    /// Invoice being returned against.
    pub invoice_id: Uuid,
    /// Reason.
    pub reason: String,
    /// Amount to refund.
    pub amount: Decimal,
}

impl SalesReturn {
    const ENTITY: &'static str = "sales return";

    /// Raises a return request.
    ///
    /// # Errors
    ///
    /// Fails for a blank reason or a non-positive amount.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        partner_id: Uuid,
        input: SalesReturnInput,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            invoice_id: input.invoice_id,
            partner_id,
            reason: guard::required("reason", &input.reason)?,
            amount: guard::positive("amount", input.amount)?,
            status: ReturnStatus::Requested,
            approved_at: None,
            received_at: None,
            refunded_at: None,
            rejection_reason: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// requested → approved
    ///
    /// # Errors
    ///
    /// Fails unless requested.
    pub fn approve(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ReturnStatus::Requested], "approve")?;
        self.status = ReturnStatus::Approved;
        self.approved_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// approved → received
    ///
    /// # Errors
    ///
    /// Fails unless approved.
    pub fn receive(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ReturnStatus::Approved], "receive")?;
        self.status = ReturnStatus::Received;
        self.received_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// received → refunded
    ///
    /// # Errors
    ///
    /// Fails unless received.
    pub fn refund(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ReturnStatus::Received], "refund")?;
        self.status = ReturnStatus::Refunded;
        self.refunded_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// requested → rejected
    ///
    /// # Errors
    ///
    /// Fails unless requested or if the reason is blank.
    pub fn reject(&mut self, reason: &str, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[ReturnStatus::Requested], "reject")?;
        self.rejection_reason = Some(guard::required("rejection reason", reason)?);
        self.status = ReturnStatus::Rejected;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy)]
    enum Action {
        Approve,
        Receive,
        Refund,
        Reject,
    }

    fn sales_return(status: ReturnStatus) -> SalesReturn {
        let mut r = SalesReturn::create(
            Uuid::new_v4(),
            "SR-000001".to_string(),
            Uuid::new_v4(),
            SalesReturnInput {
                invoice_id: Uuid::new_v4(),
                reason: "Damaged".to_string(),
                amount: dec!(45.50),
            },
            None,
        )
        .unwrap();
        r.status = status;
        r
    }

    fn run(r: &mut SalesReturn, action: Action) -> DomainResult<()> {
        match action {
            Action::Approve => r.approve(None),
            Action::Receive => r.receive(None),
            Action::Refund => r.refund(None),
            Action::Reject => r.reject("Outside window", None),
        }
    }

    #[rstest]
    #[case(Action::Approve, ReturnStatus::Requested, Some(ReturnStatus::Approved))]
    #[case(Action::Approve, ReturnStatus::Approved, None)]
    #[case(Action::Approve, ReturnStatus::Rejected, None)]
    #[case(Action::Receive, ReturnStatus::Approved, Some(ReturnStatus::Received))]
    #[case(Action::Receive, ReturnStatus::Requested, None)]
    #[case(Action::Receive, ReturnStatus::Refunded, None)]
    #[case(Action::Refund, ReturnStatus::Received, Some(ReturnStatus::Refunded))]
    #[case(Action::Refund, ReturnStatus::Approved, None)]
    #[case(Action::Refund, ReturnStatus::Requested, None)]
    #[case(Action::Reject, ReturnStatus::Requested, Some(ReturnStatus::Rejected))]
    #[case(Action::Reject, ReturnStatus::Approved, None)]
    #[case(Action::Reject, ReturnStatus::Received, None)]
    fn test_transition_guards(
        #[case] action: Action,
        #[case] from: ReturnStatus,
        #[case] expected: Option<ReturnStatus>,
    ) {
        let mut r = sales_return(from);
        let result = run(&mut r, action);
        match expected {
            Some(to) => {
                assert!(result.is_ok());
                assert_eq!(r.status, to);
            }
            None => {
                assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
                assert_eq!(r.status, from);
            }
        }
    }

    #[test]
    fn test_timestamps_follow_transitions() {
        let mut r = sales_return(ReturnStatus::Requested);
        r.approve(None).unwrap();
        r.receive(None).unwrap();
        r.refund(None).unwrap();
        assert!(r.approved_at.is_some() && r.received_at.is_some() && r.refunded_at.is_some());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut r = sales_return(ReturnStatus::Requested);
        assert!(r.reject(" ", None).is_err());
        assert_eq!(r.status, ReturnStatus::Requested);
        assert!(r.rejection_reason.is_none());
    }

    #[test]
    fn test_create_validates_amount() {
        let result = SalesReturn::create(
            Uuid::new_v4(),
            "SR-1".to_string(),
            Uuid::new_v4(),
            SalesReturnInput {
                invoice_id: Uuid::new_v4(),
                reason: "Late".to_string(),
                amount: Decimal::ZERO,
            },
            None,
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
