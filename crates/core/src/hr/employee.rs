//! Employees.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Employment status.
    EmployeeStatus {
        /// Working.
        Active => "active",
        /// On extended leave.
        OnLeave => "on_leave",
        /// Left the company.
        Terminated => "terminated",
    }
}

/// A person on the payroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Employee code, upper-case.
    pub code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Work email, lower-case.
    pub email: Option<String>,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Fixed monthly allowance.
    pub monthly_allowance: Decimal,
    /// Current status.
    pub status: EmployeeStatus,
    /// Last day of employment.
    pub termination_date: Option<NaiveDate>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for hiring or updating an employee.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    /// Employee code.
    pub code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Work email.
    pub email: Option<String>,
    /// Hire date.
    pub hire_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Monthly allowance.
    #[serde(default)]
    pub monthly_allowance: Decimal,
}

impl Employee {
    const ENTITY: &'static str = "employee";

    /// Hires an employee.
    ///
    /// # Errors
    ///
    /// Fails for empty code or names, or negative pay.
    pub fn create(tenant_id: Uuid, input: EmployeeInput, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            code: guard::code("code", &input.code)?,
            first_name: guard::required("first name", &input.first_name)?,
            last_name: guard::required("last name", &input.last_name)?,
            email: guard::optional(input.email).map(|e| e.to_lowercase()),
            hire_date: input.hire_date,
            base_salary: guard::non_negative("base salary", input.base_salary)?,
            monthly_allowance: guard::non_negative("monthly allowance", input.monthly_allowance)?,
            status: EmployeeStatus::Active,
            termination_date: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// Updates personal and pay details.
    ///
    /// # Errors
    ///
    /// Fails on the same checks as [`Employee::create`], or once terminated.
    pub fn update(&mut self, input: EmployeeInput, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[EmployeeStatus::Active, EmployeeStatus::OnLeave],
            "update",
        )?;
        let code = guard::code("code", &input.code)?;
        let first_name = guard::required("first name", &input.first_name)?;
        let last_name = guard::required("last name", &input.last_name)?;
        let base_salary = guard::non_negative("base salary", input.base_salary)?;
        let monthly_allowance = guard::non_negative("monthly allowance", input.monthly_allowance)?;
        self.code = code;
        self.first_name = first_name;
        self.last_name = last_name;
        self.email = guard::optional(input.email).map(|e| e.to_lowercase());
        self.hire_date = input.hire_date;
        self.base_salary = base_salary;
        self.monthly_allowance = monthly_allowance;
        self.audit.touch(actor);
        Ok(())
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Base salary plus allowance.
    pub fn monthly_gross(&self) -> Decimal {
        self.base_salary + self.monthly_allowance
    }

    /// active → on_leave
    ///
    /// # Errors
    ///
    /// Fails unless active.
    pub fn mark_on_leave(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[EmployeeStatus::Active], "mark on leave")?;
        self.status = EmployeeStatus::OnLeave;
        self.audit.touch(actor);
        Ok(())
    }

    /// on_leave → active
    ///
    /// # Errors
    ///
    /// Fails unless on leave.
    pub fn return_from_leave(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[EmployeeStatus::OnLeave], "return from leave")?;
        self.status = EmployeeStatus::Active;
        self.audit.touch(actor);
        Ok(())
    }

    /// active | on_leave → terminated
    ///
    /// # Errors
    ///
    /// Fails once terminated or if `date` precedes the hire date.
    pub fn terminate(&mut self, date: NaiveDate, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(
            Self::ENTITY,
            self.status,
            &[EmployeeStatus::Active, EmployeeStatus::OnLeave],
            "terminate",
        )?;
        if date < self.hire_date {
            return Err(DomainError::validation("termination date must not precede the hire date"));
        }
        self.status = EmployeeStatus::Terminated;
        self.termination_date = Some(date);
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    pub fn employee(salary: Decimal, allowance: Decimal) -> Employee {
        Employee::create(
            Uuid::new_v4(),
            EmployeeInput {
                code: "emp-7".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: Some("Ada@Example.com".to_string()),
                hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                base_salary: salary,
                monthly_allowance: allowance,
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_normalizes() {
        let e = employee(dec!(5000), dec!(250));
        assert_eq!(e.code, "EMP-7");
        assert_eq!(e.email.as_deref(), Some("ada@example.com"));
        assert_eq!(e.full_name(), "Ada Lovelace");
        assert_eq!(e.monthly_gross(), dec!(5250));
    }

    #[test]
    fn test_negative_salary_rejected() {
        let mut e = employee(dec!(5000), dec!(0));
        let input = EmployeeInput {
            code: e.code.clone(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: None,
            hire_date: e.hire_date,
            base_salary: dec!(-1),
            monthly_allowance: Decimal::ZERO,
        };
        assert!(e.update(input, None).is_err());
        assert_eq!(e.base_salary, dec!(5000));
    }

    #[test]
    fn test_leave_round_trip() {
        let mut e = employee(dec!(5000), dec!(0));
        assert!(e.return_from_leave(None).is_err());
        e.mark_on_leave(None).unwrap();
        assert!(e.mark_on_leave(None).is_err());
        e.return_from_leave(None).unwrap();
        assert_eq!(e.status, EmployeeStatus::Active);
    }

    #[rstest]
    #[case(EmployeeStatus::Active, true)]
    #[case(EmployeeStatus::OnLeave, true)]
    #[case(EmployeeStatus::Terminated, false)]
    fn test_terminate_guard(#[case] from: EmployeeStatus, #[case] ok: bool) {
        let mut e = employee(dec!(5000), dec!(0));
        e.status = from;
        let date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        assert_eq!(e.terminate(date, None).is_ok(), ok);
    }

    #[test]
    fn test_terminate_before_hire_rejected() {
        let mut e = employee(dec!(5000), dec!(0));
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert!(e.terminate(date, None).is_err());
        assert_eq!(e.status, EmployeeStatus::Active);
        assert!(e.termination_date.is_none());
    }
}
