//! Integration tests for the ledger repositories.

mod common;

use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tessera_core::finance::{
    Account, AccountInput, AccountType, FiscalYear, FiscalYearInput, JournalEntryInput, JournalLineInput,
    JournalStatus,
};
use tessera_db::{AccountRepository, FiscalRepository, JournalRepository, RepoError};
use uuid::Uuid;

use common::{connect, create_tenant, date};

async fn create_account(db: &DatabaseConnection, tenant_id: Uuid, code: &str, account_type: AccountType) -> Account {
    AccountRepository::new(db.clone())
        .create(
            tenant_id,
            AccountInput {
                code: code.to_string(),
                name: format!("Account {code}"),
                account_type,
                parent_id: None,
                allow_posting: true,
            },
            None,
        )
        .await
        .expect("Failed to create account")
}

async fn create_year(db: &DatabaseConnection, tenant_id: Uuid) -> FiscalYear {
    FiscalRepository::new(db.clone())
        .create(
            tenant_id,
            FiscalYearInput {
                name: "FY2026".to_string(),
                start_date: date(2026, 1, 1),
                end_date: date(2026, 12, 31),
            },
            None,
        )
        .await
        .expect("Failed to create fiscal year")
}

fn sale(cash: Uuid, revenue: Uuid, amount: rust_decimal::Decimal) -> Vec<JournalLineInput> {
    vec![
        JournalLineInput { account_id: cash, description: None, debit: amount, credit: dec!(0) },
        JournalLineInput { account_id: revenue, description: None, debit: dec!(0), credit: amount },
    ]
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_post_and_void_journal_entry() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    create_year(&db, tenant.id).await;
    let cash = create_account(&db, tenant.id, "1000", AccountType::Asset).await;
    let revenue = create_account(&db, tenant.id, "4000", AccountType::Revenue).await;
    let journals = JournalRepository::new(db.clone());

    let entry = journals
        .create(
            tenant.id,
            JournalEntryInput {
                entry_date: date(2026, 3, 15),
                description: "Cash sale".to_string(),
                reference: None,
                currency: None,
                lines: sale(cash.id, revenue.id, dec!(250.00)),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(entry.status, JournalStatus::Draft);
    assert_eq!(entry.currency, "USD");
    assert_eq!(entry.exchange_rate, dec!(1));

    let posted = journals.post(tenant.id, entry.id, None).await.unwrap();
    assert_eq!(posted.status, JournalStatus::Posted);
    assert_eq!(posted.total_debit, dec!(250.00));

    let (voided, reversal) = journals.void(tenant.id, entry.id, "Entered twice", None).await.unwrap();
    assert_eq!(voided.status, JournalStatus::Voided);
    assert_eq!(reversal.status, JournalStatus::Posted);
    assert_eq!(reversal.reversal_of, Some(entry.id));
    assert_ne!(reversal.number, entry.number);

    let stored = journals.find(tenant.id, reversal.id).await.unwrap();
    assert_eq!(stored.lines.len(), 2);
    assert_eq!(stored.lines[0].credit, dec!(250.00));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unbalanced_entry_cannot_post() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    create_year(&db, tenant.id).await;
    let cash = create_account(&db, tenant.id, "1000", AccountType::Asset).await;
    let revenue = create_account(&db, tenant.id, "4000", AccountType::Revenue).await;
    let journals = JournalRepository::new(db.clone());

    let mut lines = sale(cash.id, revenue.id, dec!(100));
    lines[1].credit = dec!(90);
    let entry = journals
        .create(
            tenant.id,
            JournalEntryInput {
                entry_date: date(2026, 4, 1),
                description: "Typo".to_string(),
                reference: None,
                currency: None,
                lines,
            },
            None,
        )
        .await
        .unwrap();

    let result = journals.post(tenant.id, entry.id, None).await;
    assert!(matches!(result, Err(RepoError::Domain(_))));
    let unchanged = journals.find(tenant.id, entry.id).await.unwrap();
    assert_eq!(unchanged.status, JournalStatus::Draft);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_closed_period_rejects_entries() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let year = create_year(&db, tenant.id).await;
    let cash = create_account(&db, tenant.id, "1000", AccountType::Asset).await;
    let revenue = create_account(&db, tenant.id, "4000", AccountType::Revenue).await;

    FiscalRepository::new(db.clone())
        .close_period(tenant.id, year.id, year.periods[0].id, None)
        .await
        .unwrap();

    let result = JournalRepository::new(db.clone())
        .create(
            tenant.id,
            JournalEntryInput {
                entry_date: date(2026, 1, 20),
                description: "Late".to_string(),
                reference: None,
                currency: None,
                lines: sale(cash.id, revenue.id, dec!(10)),
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(RepoError::Domain(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_overlapping_fiscal_year_rejected() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    create_year(&db, tenant.id).await;

    let result = FiscalRepository::new(db.clone())
        .create(
            tenant.id,
            FiscalYearInput {
                name: "Overlap".to_string(),
                start_date: date(2026, 7, 1),
                end_date: date(2027, 6, 30),
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(RepoError::Domain(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_account_codes_unique_per_tenant() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let other = create_tenant(&db).await;
    create_account(&db, tenant.id, "1000", AccountType::Asset).await;
    create_account(&db, other.id, "1000", AccountType::Asset).await;

    let result = AccountRepository::new(db.clone())
        .create(
            tenant.id,
            AccountInput {
                code: "1000".to_string(),
                name: "Duplicate".to_string(),
                account_type: AccountType::Asset,
                parent_id: None,
                allow_posting: true,
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(RepoError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_entries_invisible_to_other_tenants() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let other = create_tenant(&db).await;
    create_year(&db, tenant.id).await;
    let cash = create_account(&db, tenant.id, "1000", AccountType::Asset).await;
    let revenue = create_account(&db, tenant.id, "4000", AccountType::Revenue).await;
    let journals = JournalRepository::new(db.clone());

    let entry = journals
        .create(
            tenant.id,
            JournalEntryInput {
                entry_date: date(2026, 5, 5),
                description: "Private".to_string(),
                reference: None,
                currency: None,
                lines: sale(cash.id, revenue.id, dec!(5)),
            },
            None,
        )
        .await
        .unwrap();

    let result = journals.find(other.id, entry.id).await;
    assert!(matches!(result, Err(RepoError::NotFound { .. })));
}
