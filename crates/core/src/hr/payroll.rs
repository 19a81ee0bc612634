//! Payroll runs.
//!
//! Per active employee:
//! - earnings: `BASIC` (base salary) and `ALLOWANCE` when non-zero
//! - social security: employee share on `min(gross, ceiling)`, deducted
//! - income tax: progressive brackets on `gross - social security`
//! - employer social security recorded separately, not deducted
//!
//! Rates and brackets are those effective on the pay date.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::finance::tax::{TaxRule, progressive_tax};
use crate::guard::{self, ensure_status};
use crate::hr::employee::{Employee, EmployeeStatus};
use crate::hr::social_security::{SocialSecurityRate, effective_rate};
use crate::macros::text_enum;

/// Basic salary earning code.
pub const CODE_BASIC: &str = "BASIC";
/// Allowance earning code.
pub const CODE_ALLOWANCE: &str = "ALLOWANCE";
/// Employee social security deduction code.
pub const CODE_SOCIAL_SECURITY: &str = "SOCIAL_SECURITY";
/// Income tax deduction code.
pub const CODE_INCOME_TAX: &str = "INCOME_TAX";
/// Employer social security contribution code.
pub const CODE_EMPLOYER_SOCIAL_SECURITY: &str = "EMPLOYER_SOCIAL_SECURITY";

text_enum! {
    /// Payroll status.
    PayrollStatus {
        /// Created, not yet calculated.
        Draft => "draft",
        /// Entries computed.
        Calculated => "calculated",
        /// Approved for payment.
        Approved => "approved",
        /// Paid out.
        Paid => "paid",
        /// Cancelled.
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Kind of a payroll detail line.
    PayrollLineKind {
        /// Adds to gross pay.
        Earning => "earning",
        /// Subtracted from gross pay.
        Deduction => "deduction",
        /// Employer cost on top of gross pay.
        EmployerContribution => "employer_contribution",
    }
}

/// One earning, deduction, or employer contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntryDetail {
    /// Unique identifier.
    pub id: Uuid,
    /// Line kind.
    pub kind: PayrollLineKind,
    /// Line code.
    pub code: String,
    /// Description.
    pub description: String,
    /// Amount.
    pub amount: Decimal,
}

impl PayrollEntryDetail {
    fn new(kind: PayrollLineKind, code: &str, description: &str, amount: Decimal) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            code: code.to_string(),
            description: description.to_string(),
            amount,
        }
    }
}

/// One employee's pay within a payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Employee paid.
    pub employee_id: Uuid,
    /// Total earnings.
    pub gross_pay: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Gross less deductions.
    pub net_pay: Decimal,
    /// Employer contributions.
    pub employer_contribution: Decimal,
    /// Breakdown.
    pub details: Vec<PayrollEntryDetail>,
}

/// Computes one employee's entry.
pub fn calculate_entry(
    employee: &Employee,
    social_security: Option<&SocialSecurityRate>,
    tax_rules: &[TaxRule],
    pay_date: NaiveDate,
) -> PayrollEntry {
    let mut details = vec![PayrollEntryDetail::new(
        PayrollLineKind::Earning,
        CODE_BASIC,
        "Basic salary",
        employee.base_salary,
    )];
    if employee.monthly_allowance > Decimal::ZERO {
        details.push(PayrollEntryDetail::new(
            PayrollLineKind::Earning,
            CODE_ALLOWANCE,
            "Allowance",
            employee.monthly_allowance,
        ));
    }
    let gross_pay = employee.monthly_gross();

    let (employee_ss, employer_ss) = social_security
        .map_or((Decimal::ZERO, Decimal::ZERO), |rate| {
            let c = rate.contribution(gross_pay);
            (c.employee, c.employer)
        });
    if employee_ss > Decimal::ZERO {
        details.push(PayrollEntryDetail::new(
            PayrollLineKind::Deduction,
            CODE_SOCIAL_SECURITY,
            "Social security",
            employee_ss,
        ));
    }

    let income_tax = progressive_tax(tax_rules, gross_pay - employee_ss, pay_date);
    if income_tax > Decimal::ZERO {
        details.push(PayrollEntryDetail::new(
            PayrollLineKind::Deduction,
            CODE_INCOME_TAX,
            "Income tax",
            income_tax,
        ));
    }
    if employer_ss > Decimal::ZERO {
        details.push(PayrollEntryDetail::new(
            PayrollLineKind::EmployerContribution,
            CODE_EMPLOYER_SOCIAL_SECURITY,
            "Employer social security",
            employer_ss,
        ));
    }

    let total_deductions = employee_ss + income_tax;
    PayrollEntry {
        id: Uuid::now_v7(),
        employee_id: employee.id,
        gross_pay,
        total_deductions,
        net_pay: gross_pay - total_deductions,
        employer_contribution: employer_ss,
        details,
    }
}

/// A payroll run for one pay period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number.
    pub number: String,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Payment date.
    pub pay_date: NaiveDate,
    /// Current status.
    pub status: PayrollStatus,
    /// Sum of gross pay.
    pub total_gross: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
    /// Gross pay plus employer contributions.
    pub total_employer_cost: Decimal,
    /// Notes.
    pub notes: Option<String>,
    /// Last calculation.
    pub calculated_at: Option<DateTime<Utc>>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver.
    pub approved_by: Option<Uuid>,
    /// Payment time.
    pub paid_at: Option<DateTime<Utc>>,
    /// Per-employee entries.
    pub entries: Vec<PayrollEntry>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for a payroll run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Pay date.
    pub pay_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
}

impl Payroll {
    const ENTITY: &'static str = "payroll";

    /// Creates a draft run.
    ///
    /// # Errors
    ///
    /// Fails unless `period_start < period_end`.
    pub fn create(tenant_id: Uuid, number: String, input: PayrollInput, actor: Option<Uuid>) -> DomainResult<Self> {
        if input.period_start >= input.period_end {
            return Err(DomainError::validation("period start must be before period end"));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            period_start: input.period_start,
            period_end: input.period_end,
            pay_date: input.pay_date,
            status: PayrollStatus::Draft,
            total_gross: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            total_net: Decimal::ZERO,
            total_employer_cost: Decimal::ZERO,
            notes: guard::optional(input.notes),
            calculated_at: None,
            approved_at: None,
            approved_by: None,
            paid_at: None,
            entries: Vec::new(),
            audit: AuditInfo::new(actor),
        })
    }

    /// draft | calculated → calculated, replacing every entry.
    ///
    /// Active employees hired by the end of the period are paid.
    ///
    /// # Errors
    ///
    /// Fails unless draft or calculated.
    pub fn calculate(
        &mut self,
        employees: &[Employee],
        social_security: &[SocialSecurityRate],
        tax_rules: &[TaxRule],
        actor: Option<Uuid>,
    ) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[PayrollStatus::Draft, PayrollStatus::Calculated],
            "calculate",
        )?;
        let rate = effective_rate(social_security, self.pay_date);
        self.entries = employees
            .iter()
            .filter(|e| e.status == EmployeeStatus::Active && e.hire_date <= self.period_end)
            .map(|e| calculate_entry(e, rate, tax_rules, self.pay_date))
            .collect();
        self.total_gross = self.entries.iter().map(|e| e.gross_pay).sum();
        self.total_deductions = self.entries.iter().map(|e| e.total_deductions).sum();
        self.total_net = self.entries.iter().map(|e| e.net_pay).sum();
        self.total_employer_cost =
            self.total_gross + self.entries.iter().map(|e| e.employer_contribution).sum::<Decimal>();
        self.status = PayrollStatus::Calculated;
        self.calculated_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// calculated → approved
    ///
    /// # Errors
    ///
    /// Fails unless calculated with at least one entry.
    pub fn approve(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PayrollStatus::Calculated], "approve")?;
        if self.entries.is_empty() {
            return Err(DomainError::invalid("Cannot approve a payroll without entries"));
        }
        self.status = PayrollStatus::Approved;
        self.approved_at = Some(Utc::now());
        self.approved_by = actor;
        self.audit.touch(actor);
        Ok(())
    }

    /// approved → paid
    ///
    /// # Errors
    ///
    /// Fails unless approved.
    pub fn pay(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[PayrollStatus::Approved], "pay")?;
        self.status = PayrollStatus::Paid;
        self.paid_at = Some(Utc::now());
        self.audit.touch(actor);
        Ok(())
    }

    /// draft | calculated → cancelled
    ///
    /// # Errors
    ///
    /// Fails once approved.
    pub fn cancel(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[PayrollStatus::Draft, PayrollStatus::Calculated],
            "cancel",
        )?;
        self.status = PayrollStatus::Cancelled;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::tax::TaxRuleInput;
    use crate::hr::employee::tests::employee;
    use crate::hr::social_security::SocialSecurityRateInput;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn brackets() -> Vec<TaxRule> {
        let bracket = |rate, lower, upper| {
            TaxRule::create(
                Uuid::new_v4(),
                TaxRuleInput {
                    name: "Bracket".to_string(),
                    rate,
                    lower_limit: lower,
                    upper_limit: upper,
                    effective_from: day(1, 1),
                    effective_to: None,
                },
                None,
            )
            .unwrap()
        };
        vec![
            bracket(dec!(0), dec!(0), Some(dec!(1000))),
            bracket(dec!(10), dec!(1000), Some(dec!(4000))),
            bracket(dec!(20), dec!(4000), None),
        ]
    }

    fn ss_rate() -> SocialSecurityRate {
        SocialSecurityRate::create(
            Uuid::new_v4(),
            SocialSecurityRateInput {
                name: "SS".to_string(),
                employee_rate: dec!(5),
                employer_rate: dec!(8),
                wage_ceiling: Some(dec!(4000)),
                effective_from: day(1, 1),
                effective_to: None,
            },
            None,
        )
        .unwrap()
    }

    fn payroll(status: PayrollStatus) -> Payroll {
        let mut p = Payroll::create(
            Uuid::new_v4(),
            "PAY-000001".to_string(),
            PayrollInput {
                period_start: day(3, 1),
                period_end: day(3, 31),
                pay_date: day(3, 31),
                notes: None,
            },
            None,
        )
        .unwrap();
        p.status = status;
        p
    }

    #[test]
    fn test_entry_breakdown() {
        // gross 5000; ss 5% of 4000 = 200; taxable 4800
        // tax = 0 + 10% * 3000 + 20% * 800 = 460
        let e = employee(dec!(4500), dec!(500));
        let rate = ss_rate();
        let entry = calculate_entry(&e, Some(&rate), &brackets(), day(3, 31));
        assert_eq!(entry.gross_pay, dec!(5000));
        assert_eq!(entry.total_deductions, dec!(660));
        assert_eq!(entry.net_pay, dec!(4340));
        assert_eq!(entry.employer_contribution, dec!(320));
        let codes: Vec<_> = entry.details.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes,
            [CODE_BASIC, CODE_ALLOWANCE, CODE_SOCIAL_SECURITY, CODE_INCOME_TAX, CODE_EMPLOYER_SOCIAL_SECURITY]
        );
    }

    #[test]
    fn test_entry_without_rates() {
        let e = employee(dec!(900), dec!(0));
        let entry = calculate_entry(&e, None, &brackets(), day(3, 31));
        assert_eq!(entry.net_pay, dec!(900));
        assert_eq!(entry.details.len(), 1);
    }

    #[test]
    fn test_calculate_totals_and_skips_inactive() {
        let mut p = payroll(PayrollStatus::Draft);
        let mut gone = employee(dec!(3000), dec!(0));
        gone.terminate(day(2, 28), None).unwrap();
        let staff = vec![employee(dec!(4500), dec!(500)), employee(dec!(2000), dec!(0)), gone];
        p.calculate(&staff, &[ss_rate()], &brackets(), None).unwrap();

        // second employee: ss 100, tax 10% * 900 = 90, employer 160
        assert_eq!(p.entries.len(), 2);
        assert_eq!(p.total_gross, dec!(7000));
        assert_eq!(p.total_deductions, dec!(850));
        assert_eq!(p.total_net, dec!(6150));
        assert_eq!(p.total_employer_cost, dec!(7480));
        assert_eq!(p.status, PayrollStatus::Calculated);

        p.calculate(&staff[..1], &[ss_rate()], &brackets(), None).unwrap();
        assert_eq!(p.entries.len(), 1);
        assert_eq!(p.total_gross, dec!(5000));
    }

    #[test]
    fn test_approve_then_pay() {
        let mut p = payroll(PayrollStatus::Draft);
        assert!(p.approve(None).is_err());
        p.calculate(&[], &[], &[], None).unwrap();
        assert!(p.approve(None).is_err());
        p.calculate(&[employee(dec!(1000), dec!(0))], &[], &[], None).unwrap();
        p.approve(None).unwrap();
        assert!(p.calculate(&[], &[], &[], None).is_err());
        p.pay(None).unwrap();
        assert_eq!(p.status, PayrollStatus::Paid);
        assert!(p.paid_at.is_some());
    }

    #[rstest]
    #[case(PayrollStatus::Draft, true)]
    #[case(PayrollStatus::Calculated, true)]
    #[case(PayrollStatus::Approved, false)]
    #[case(PayrollStatus::Paid, false)]
    #[case(PayrollStatus::Cancelled, false)]
    fn test_cancel_guard(#[case] from: PayrollStatus, #[case] ok: bool) {
        let mut p = payroll(from);
        assert_eq!(p.cancel(None).is_ok(), ok);
        assert_eq!(p.status, if ok { PayrollStatus::Cancelled } else { from });
    }

    #[test]
    fn test_period_must_be_ordered() {
        let input = PayrollInput {
            period_start: day(3, 31),
            period_end: day(3, 31),
            pay_date: day(3, 31),
            notes: None,
        };
        assert!(Payroll::create(Uuid::new_v4(), "PAY-1".to_string(), input, None).is_err());
    }
}
