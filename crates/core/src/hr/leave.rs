//! Leave types, yearly allocations, and leave requests.
//!
//! An allocation tracks `total_days_allocated` and `days_used`; the remaining
//! balance is always their difference and never goes negative. Approving a
//! request consumes days from its allocation, and cancelling an approved
//! request gives them back.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

/// A kind of leave, such as annual or sick leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Short code, upper-case.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether the leave is paid.
    pub is_paid: bool,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for a leave type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTypeInput {
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Paid leave.
    #[serde(default = "default_true")]
    pub is_paid: bool,
}

const fn default_true() -> bool {
    true
}

impl LeaveType {
    /// Creates a leave type.
    ///
    /// # Errors
    ///
    /// Fails for an empty code or name.
    pub fn create(tenant_id: Uuid, input: LeaveTypeInput, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            code: guard::code("code", &input.code)?,
            name: guard::required("name", &input.name)?,
            is_paid: input.is_paid,
            audit: AuditInfo::new(actor),
        })
    }
}

/// Days of one leave type granted to an employee for a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveAllocation {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Employee.
    pub employee_id: Uuid,
    /// Leave type.
    pub leave_type_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Days granted.
    pub total_days_allocated: Decimal,
    /// Days taken.
    pub days_used: Decimal,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for an allocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveAllocationInput {
    /// Employee.
    pub employee_id: Uuid,
    /// Leave type.
    pub leave_type_id: Uuid,
    /// Year.
    pub year: i32,
    /// Days granted.
    pub total_days_allocated: Decimal,
}

impl LeaveAllocation {
    /// Grants days for a year.
    ///
    /// # Errors
    ///
    /// Fails for a negative day count.
    pub fn create(tenant_id: Uuid, input: LeaveAllocationInput, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            year: input.year,
            total_days_allocated: guard::non_negative("total days allocated", input.total_days_allocated)?,
            days_used: Decimal::ZERO,
            audit: AuditInfo::new(actor),
        })
    }

    /// Days still available.
    pub fn days_remaining(&self) -> Decimal {
        self.total_days_allocated - self.days_used
    }

    /// Consumes `days` from the balance.
    ///
    /// # Errors
    ///
    /// Fails unless `0 < days <= days_remaining`.
    pub fn use_days(&mut self, days: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        guard::positive("days", days)?;
        if days > self.days_remaining() {
            return Err(DomainError::invalid(format!(
                "Cannot use {days} days; only {} remaining",
                self.days_remaining()
            )));
        }
        self.days_used += days;
        self.audit.touch(actor);
        Ok(())
    }

    /// Gives back previously used days.
    ///
    /// # Errors
    ///
    /// Fails unless `0 < days <= days_used`.
    pub fn restore_days(&mut self, days: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        guard::positive("days", days)?;
        if days > self.days_used {
            return Err(DomainError::invalid(format!(
                "Cannot restore {days} days; only {} used",
                self.days_used
            )));
        }
        self.days_used -= days;
        self.audit.touch(actor);
        Ok(())
    }

    /// Changes the granted total.
    ///
    /// # Errors
    ///
    /// Fails if `total` is negative or below the days already used.
    pub fn adjust_allocation(&mut self, total: Decimal, actor: Option<Uuid>) -> DomainResult<()> {
        guard::non_negative("total days allocated", total)?;
        if total < self.days_used {
            return Err(DomainError::invalid(format!(
                "Cannot allocate {total} days; {} already used",
                self.days_used
            )));
        }
        self.total_days_allocated = total;
        self.audit.touch(actor);
        Ok(())
    }
}

text_enum! {
    /// Leave request status.
    LeaveStatus {
        /// Awaiting a decision.
        Pending => "pending",
        /// Approved, days consumed.
        Approved => "approved",
        /// Declined.
        Rejected => "rejected",
        /// Withdrawn.
        Cancelled => "cancelled",
    }
}

/// A request to take leave against an allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Employee.
    pub employee_id: Uuid,
    /// Allocation drawn from.
    pub allocation_id: Uuid,
    /// First day off.
    pub start_date: NaiveDate,
    /// Last day off.
    pub end_date: NaiveDate,
    /// Working days requested.
    pub days: Decimal,
    /// Employee's reason.
    pub reason: Option<String>,
    /// Current status.
    pub status: LeaveStatus,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// When approved or rejected.
    pub decided_at: Option<DateTime<Utc>>,
    /// Who approved or rejected.
    pub decided_by: Option<Uuid>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for a leave request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    /// Allocation drawn from.
    pub allocation_id: Uuid,
    /// First day off.
    pub start_date: NaiveDate,
    /// Last day off.
    pub end_date: NaiveDate,
    /// Working days requested.
    pub days: Decimal,
    /// Reason.
    pub reason: Option<String>,
}

impl LeaveRequest {
    const ENTITY: &'static str = "leave request";

    /// Files a pending request against `allocation`.
    ///
    /// # Errors
    ///
    /// Fails for inverted dates, non-positive days, or a mismatched allocation.
    pub fn create(
        allocation: &LeaveAllocation,
        input: LeaveRequestInput,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        if input.allocation_id != allocation.id {
            return Err(DomainError::validation("allocation does not match the request"));
        }
        if input.end_date < input.start_date {
            return Err(DomainError::validation("end date must not precede start date"));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id: allocation.tenant_id,
            employee_id: allocation.employee_id,
            allocation_id: allocation.id,
            start_date: input.start_date,
            end_date: input.end_date,
            days: guard::positive("days", input.days)?,
            reason: guard::optional(input.reason),
            status: LeaveStatus::Pending,
            rejection_reason: None,
            decided_at: None,
            decided_by: None,
            audit: AuditInfo::new(actor),
        })
    }

    fn ensure_allocation(&self, allocation: &LeaveAllocation) -> DomainResult<()> {
        if allocation.id == self.allocation_id {
            Ok(())
        } else {
            Err(DomainError::invalid("Leave request belongs to a different allocation"))
        }
    }

    /// pending → approved, consuming days from `allocation`.
    ///
    /// # Errors
    ///
    /// Fails unless pending or if the allocation lacks the days; neither
    /// record changes on failure.
    pub fn approve(&mut self, allocation: &mut LeaveAllocation, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[LeaveStatus::Pending], "approve")?;
        self.ensure_allocation(allocation)?;
        allocation.use_days(self.days, actor)?;
        self.status = LeaveStatus::Approved;
        self.decided_at = Some(Utc::now());
        self.decided_by = actor;
        self.audit.touch(actor);
        Ok(())
    }

    /// pending → rejected
    ///
    /// # Errors
    ///
    /// Fails unless pending or if the reason is blank.
    pub fn reject(&mut self, reason: &str, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[LeaveStatus::Pending], "reject")?;
        self.rejection_reason = Some(guard::required("rejection reason", reason)?);
        self.status = LeaveStatus::Rejected;
        self.decided_at = Some(Utc::now());
        self.decided_by = actor;
        self.audit.touch(actor);
        Ok(())
    }

    /// pending | approved → cancelled; approved days go back to `allocation`.
    ///
    /// # Errors
    ///
    /// Fails from any other status.
    pub fn cancel(&mut self, allocation: &mut LeaveAllocation, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[LeaveStatus::Pending, LeaveStatus::Approved],
            "cancel",
        )?;
        if self.status == LeaveStatus::Approved {
            self.ensure_allocation(allocation)?;
            allocation.restore_days(self.days, actor)?;
        }
        self.status = LeaveStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    pub(super) fn allocation(total: Decimal) -> LeaveAllocation {
        LeaveAllocation::create(
            Uuid::new_v4(),
            LeaveAllocationInput {
                employee_id: Uuid::new_v4(),
                leave_type_id: Uuid::new_v4(),
                year: 2026,
                total_days_allocated: total,
            },
            None,
        )
        .unwrap()
    }

    fn request(allocation: &LeaveAllocation, days: Decimal) -> LeaveRequest {
        LeaveRequest::create(
            allocation,
            LeaveRequestInput {
                allocation_id: allocation.id,
                start_date: NaiveDate::from_ymd_opt(2026, 7, 6).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 7, 10).unwrap(),
                days,
                reason: Some("Holiday".to_string()),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_use_days_beyond_remaining_fails() {
        let mut a = allocation(dec!(10));
        a.use_days(dec!(7), None).unwrap();
        assert_eq!(a.days_remaining(), dec!(3));
        assert!(a.use_days(dec!(3.5), None).is_err());
        assert_eq!(a.days_used, dec!(7));
        a.use_days(dec!(3), None).unwrap();
        assert!(a.days_remaining().is_zero());
    }

    #[test]
    fn test_restore_days_bounded_by_used() {
        let mut a = allocation(dec!(10));
        a.use_days(dec!(2), None).unwrap();
        assert!(a.restore_days(dec!(3), None).is_err());
        a.restore_days(dec!(2), None).unwrap();
        assert!(a.days_used.is_zero());
        assert!(a.restore_days(dec!(0), None).is_err());
    }

    #[test]
    fn test_adjust_allocation_keeps_used() {
        let mut a = allocation(dec!(10));
        a.use_days(dec!(6), None).unwrap();
        assert!(a.adjust_allocation(dec!(5), None).is_err());
        a.adjust_allocation(dec!(6), None).unwrap();
        assert!(a.days_remaining().is_zero());
    }

    #[test]
    fn test_approve_consumes_and_cancel_restores() {
        let mut a = allocation(dec!(10));
        let mut r = request(&a, dec!(4));
        r.approve(&mut a, None).unwrap();
        assert_eq!(a.days_remaining(), dec!(6));
        r.cancel(&mut a, None).unwrap();
        assert_eq!(r.status, LeaveStatus::Cancelled);
        assert_eq!(a.days_remaining(), dec!(10));
    }

    #[test]
    fn test_approve_without_balance_changes_nothing() {
        let mut a = allocation(dec!(3));
        let mut r = request(&a, dec!(4));
        assert!(r.approve(&mut a, None).is_err());
        assert_eq!(r.status, LeaveStatus::Pending);
        assert!(a.days_used.is_zero());
    }

    #[test]
    fn test_cancel_pending_leaves_allocation() {
        let mut a = allocation(dec!(10));
        a.use_days(dec!(1), None).unwrap();
        let mut r = request(&a, dec!(2));
        r.cancel(&mut a, None).unwrap();
        assert_eq!(a.days_used, dec!(1));
    }

    #[test]
    fn test_wrong_allocation_rejected() {
        let a = allocation(dec!(10));
        let mut other = allocation(dec!(10));
        let mut r = request(&a, dec!(2));
        assert!(r.approve(&mut other, None).is_err());
        assert!(other.days_used.is_zero());
    }

    #[rstest]
    #[case(LeaveStatus::Pending, true)]
    #[case(LeaveStatus::Approved, false)]
    #[case(LeaveStatus::Rejected, false)]
    #[case(LeaveStatus::Cancelled, false)]
    fn test_reject_guard(#[case] from: LeaveStatus, #[case] ok: bool) {
        let a = allocation(dec!(10));
        let mut r = request(&a, dec!(2));
        r.status = from;
        assert_eq!(r.reject("Busy period", None).is_ok(), ok);
    }
}

#[cfg(test)]
mod props {
    use super::tests::allocation;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    #[derive(Debug, Clone)]
    enum Op {
        Use(u32),
        Restore(u32),
        Adjust(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..15).prop_map(Op::Use),
            (0u32..15).prop_map(Op::Restore),
            (0u32..40).prop_map(Op::Adjust),
        ]
    }

    proptest! {
        #[test]
        fn prop_balance_invariants_hold(total in 0u32..30, ops in prop::collection::vec(op(), 0..40)) {
            let mut a = allocation(Decimal::from(total));
            for op in ops {
                let before = (a.total_days_allocated, a.days_used);
                let result = match op {
                    Op::Use(n) => {
                        let n = Decimal::from(n);
                        let allowed = n > Decimal::ZERO && n <= a.days_remaining();
                        let r = a.use_days(n, None);
                        prop_assert_eq!(r.is_ok(), allowed);
                        r
                    }
                    Op::Restore(n) => {
                        let n = Decimal::from(n);
                        let allowed = n > Decimal::ZERO && n <= a.days_used;
                        let r = a.restore_days(n, None);
                        prop_assert_eq!(r.is_ok(), allowed);
                        r
                    }
                    Op::Adjust(n) => a.adjust_allocation(Decimal::from(n), None),
                };
                if result.is_err() {
                    prop_assert_eq!((a.total_days_allocated, a.days_used), before);
                }
                prop_assert_eq!(a.days_remaining(), a.total_days_allocated - a.days_used);
                prop_assert!(a.days_remaining() >= Decimal::ZERO);
                prop_assert!(a.days_used >= Decimal::ZERO);
            }
        }
    }
}
