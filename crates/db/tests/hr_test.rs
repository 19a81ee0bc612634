//! Integration tests for leave and payroll.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tessera_core::finance::TaxRuleInput;
use tessera_core::hr::{
    Employee, EmployeeInput, LeaveAllocation, LeaveAllocationInput, LeaveRequestInput, LeaveStatus, LeaveTypeInput,
    PayrollInput, PayrollStatus, SocialSecurityRateInput,
};
use tessera_db::{EmployeeRepository, LeaveRepository, PayrollRepository, RepoError, SocialSecurityRepository, TaxRuleRepository};
use uuid::Uuid;

use common::{connect, create_tenant, date};

async fn hire(db: &DatabaseConnection, tenant_id: Uuid, code: &str, salary: Decimal) -> Employee {
    EmployeeRepository::new(db.clone())
        .create(
            tenant_id,
            EmployeeInput {
                code: code.to_string(),
                first_name: "Test".to_string(),
                last_name: code.to_string(),
                email: None,
                hire_date: date(2025, 6, 1),
                base_salary: salary,
                monthly_allowance: dec!(0),
            },
            None,
        )
        .await
        .expect("Failed to create employee")
}

async fn allocate(db: &DatabaseConnection, tenant_id: Uuid, employee_id: Uuid, days: Decimal) -> LeaveAllocation {
    let leave = LeaveRepository::new(db.clone());
    let leave_type = leave
        .create_type(
            tenant_id,
            LeaveTypeInput { code: "ANNUAL".to_string(), name: "Annual leave".to_string(), is_paid: true },
            None,
        )
        .await
        .unwrap();
    leave
        .create_allocation(
            tenant_id,
            LeaveAllocationInput {
                employee_id,
                leave_type_id: leave_type.id,
                year: 2026,
                total_days_allocated: days,
            },
            None,
        )
        .await
        .unwrap()
}

fn request(allocation_id: Uuid, days: Decimal) -> LeaveRequestInput {
    LeaveRequestInput {
        allocation_id,
        start_date: date(2026, 8, 3),
        end_date: date(2026, 8, 7),
        days,
        reason: Some("Holiday".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_approve_then_cancel_restores_days() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let employee = hire(&db, tenant.id, "E001", dec!(4000)).await;
    let allocation = allocate(&db, tenant.id, employee.id, dec!(12)).await;
    let leave = LeaveRepository::new(db.clone());

    let pending = leave.create_request(tenant.id, request(allocation.id, dec!(5)), None).await.unwrap();
    let approved = leave.approve(tenant.id, pending.id, None).await.unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(leave.find_allocation(tenant.id, allocation.id).await.unwrap().days_used, dec!(5));

    let cancelled = leave.cancel(tenant.id, pending.id, None).await.unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    assert_eq!(leave.find_allocation(tenant.id, allocation.id).await.unwrap().days_used, dec!(0));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_approve_beyond_balance_changes_nothing() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let employee = hire(&db, tenant.id, "E002", dec!(4000)).await;
    let allocation = allocate(&db, tenant.id, employee.id, dec!(3)).await;
    let leave = LeaveRepository::new(db.clone());

    let pending = leave.create_request(tenant.id, request(allocation.id, dec!(5)), None).await.unwrap();
    let result = leave.approve(tenant.id, pending.id, None).await;
    assert!(matches!(result, Err(RepoError::Domain(_))));

    assert_eq!(leave.find_request(tenant.id, pending.id).await.unwrap().status, LeaveStatus::Pending);
    assert_eq!(leave.find_allocation(tenant.id, allocation.id).await.unwrap().days_used, dec!(0));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_payroll_calculate_and_approve() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let employee = hire(&db, tenant.id, "E003", dec!(5000)).await;

    SocialSecurityRepository::new(db.clone())
        .create(
            tenant.id,
            SocialSecurityRateInput {
                name: "Pension".to_string(),
                employee_rate: dec!(7),
                employer_rate: dec!(10),
                wage_ceiling: None,
                effective_from: date(2026, 1, 1),
                effective_to: None,
            },
            None,
        )
        .await
        .unwrap();
    TaxRuleRepository::new(db.clone())
        .create(
            tenant.id,
            TaxRuleInput {
                name: "Flat".to_string(),
                rate: dec!(10),
                lower_limit: dec!(0),
                upper_limit: None,
                effective_from: date(2026, 1, 1),
                effective_to: None,
            },
            None,
        )
        .await
        .unwrap();

    let payrolls = PayrollRepository::new(db.clone());
    let payroll = payrolls
        .create(
            tenant.id,
            PayrollInput {
                period_start: date(2026, 3, 1),
                period_end: date(2026, 3, 31),
                pay_date: date(2026, 3, 31),
                notes: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(payroll.number, "PAY-000001");

    let calculated = payrolls.calculate(tenant.id, payroll.id, None).await.unwrap();
    assert_eq!(calculated.status, PayrollStatus::Calculated);
    assert_eq!(calculated.entries.len(), 1);
    let entry = &calculated.entries[0];
    assert_eq!(entry.employee_id, employee.id);
    assert_eq!(entry.gross_pay, dec!(5000));
    // 350 social security, then 10% of 4650
    assert_eq!(entry.total_deductions, dec!(815));
    assert_eq!(entry.net_pay, dec!(4185));
    assert_eq!(calculated.total_employer_cost, dec!(5500));

    let stored = payrolls.find(tenant.id, payroll.id).await.unwrap();
    assert_eq!(stored.entries[0].details.len(), calculated.entries[0].details.len());

    let approved = payrolls
        .transition(tenant.id, payroll.id, |p| p.approve(None))
        .await
        .unwrap();
    assert_eq!(approved.status, PayrollStatus::Approved);
}
