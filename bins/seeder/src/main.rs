//! Database seeder for Tessera development and testing.
//!
//! Seeds the permission catalogue and a demo tenant with an administrator,
//! a starter chart of accounts, the current fiscal year, a leave type, and a
//! social security rate. Every step is idempotent.
//!
//! Usage: cargo run --bin seeder
//!
//! `SEED_ADMIN_PASSWORD` overrides the demo administrator's password.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

use tessera_core::auth::hash_password;
use tessera_core::finance::{AccountInput, AccountType, FiscalYearInput};
use tessera_core::hr::{LeaveTypeInput, SocialSecurityRateInput};
use tessera_core::system::{NewUser, Role, Tenant, TenantInput, User};
use tessera_db::{
    AccountRepository, FiscalRepository, LeaveRepository, RepoError, RoleRepository, SocialSecurityRepository,
    TenantRepository, UserRepository,
};
use tessera_shared::types::PageRequest;

const DEMO_TENANT_CODE: &str = "DEMO";
const ADMIN_EMAIL: &str = "admin@demo.tessera.dev";
const DEFAULT_ADMIN_PASSWORD: &str = "tessera-admin";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    println!("Connecting to database...");
    let db = tessera_db::connect(&database_url, 2, 1).await?;

    println!("Syncing permission catalogue...");
    let permissions = RoleRepository::new(db.clone()).sync_catalog().await?;
    println!("  {permissions} permissions known");

    println!("Seeding demo tenant...");
    let tenant = seed_tenant(&db).await?;

    println!("Seeding administrator...");
    seed_admin(&db, &tenant).await?;

    println!("Seeding chart of accounts...");
    seed_accounts(&db, &tenant).await?;

    println!("Seeding fiscal year...");
    seed_fiscal_year(&db, &tenant).await?;

    println!("Seeding HR reference data...");
    seed_hr(&db, &tenant).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_tenant(db: &DatabaseConnection) -> anyhow::Result<Tenant> {
    let tenants = TenantRepository::new(db.clone());
    if let Some(tenant) = tenants.find_by_code(DEMO_TENANT_CODE).await? {
        println!("  Tenant {DEMO_TENANT_CODE} already exists, skipping...");
        return Ok(tenant);
    }
    let tenant = Tenant::create(
        TenantInput {
            code: DEMO_TENANT_CODE.to_string(),
            name: "Demo Trading Co.".to_string(),
            base_currency: "USD".to_string(),
        },
        None,
    )?;
    tenants.create(&tenant).await?;
    println!("  Created tenant {} ({})", tenant.code, tenant.id);
    Ok(tenant)
}

async fn seed_admin(db: &DatabaseConnection, tenant: &Tenant) -> anyhow::Result<()> {
    let roles = RoleRepository::new(db.clone());
    let role = match roles.find_by_name(tenant.id, "Administrator").await? {
        Some(role) => role,
        None => {
            let role = Role::system(tenant.id, "Administrator", "Full access to every module")?;
            roles.create(&role).await?;
            role
        }
    };
    roles.set_permissions(tenant.id, role.id, &["*".to_string()]).await?;

    let users = UserRepository::new(db.clone());
    let user = match users.find_by_email(tenant.id, ADMIN_EMAIL).await? {
        Some(user) => {
            println!("  Administrator already exists, skipping...");
            user
        }
        None => {
            let password =
                std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
            let user = User::create(
                tenant.id,
                NewUser {
                    email: ADMIN_EMAIL.to_string(),
                    full_name: "Demo Administrator".to_string(),
                    password_hash: hash_password(&password)?,
                },
                None,
            )?;
            users.create(&user).await?;
            println!("  Created {ADMIN_EMAIL} in tenant {DEMO_TENANT_CODE}");
            user
        }
    };
    users.set_roles(tenant.id, user.id, &[role.id]).await?;
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection, tenant: &Tenant) -> anyhow::Result<()> {
    let accounts = AccountRepository::new(db.clone());
    let chart = [
        ("1000", "Cash", AccountType::Asset),
        ("1100", "Bank", AccountType::Asset),
        ("1200", "Accounts Receivable", AccountType::Asset),
        ("2000", "Accounts Payable", AccountType::Liability),
        ("2100", "Payroll Liabilities", AccountType::Liability),
        ("3000", "Owner's Equity", AccountType::Equity),
        ("4000", "Sales Revenue", AccountType::Revenue),
        ("5000", "Cost of Goods Sold", AccountType::Expense),
        ("6000", "Salaries Expense", AccountType::Expense),
    ];
    let mut created = 0;
    for (code, name, account_type) in chart {
        let input = AccountInput {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            parent_id: None,
            allow_posting: true,
        };
        match accounts.create(tenant.id, input, None).await {
            Ok(_) => created += 1,
            Err(RepoError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("  {created} accounts created");
    Ok(())
}

async fn seed_fiscal_year(db: &DatabaseConnection, tenant: &Tenant) -> anyhow::Result<()> {
    let fiscal = FiscalRepository::new(db.clone());
    if fiscal.list(tenant.id, &PageRequest::default()).await?.total_count > 0 {
        println!("  Fiscal calendar already exists, skipping...");
        return Ok(());
    }
    let year = Utc::now().year();
    let (Some(start_date), Some(end_date)) = (NaiveDate::from_ymd_opt(year, 1, 1), NaiveDate::from_ymd_opt(year, 12, 31))
    else {
        anyhow::bail!("invalid calendar year {year}");
    };
    let created = fiscal
        .create(
            tenant.id,
            FiscalYearInput {
                name: format!("FY{year}"),
                start_date,
                end_date,
            },
            None,
        )
        .await?;
    println!("  Created {} with {} periods", created.name, created.periods.len());
    Ok(())
}

async fn seed_hr(db: &DatabaseConnection, tenant: &Tenant) -> anyhow::Result<()> {
    let leave = LeaveRepository::new(db.clone());
    let annual = LeaveTypeInput {
        code: "ANNUAL".to_string(),
        name: "Annual Leave".to_string(),
        is_paid: true,
    };
    match leave.create_type(tenant.id, annual, None).await {
        Ok(_) | Err(RepoError::Conflict(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let rates = SocialSecurityRepository::new(db.clone());
    if rates.list(tenant.id, &PageRequest::default()).await?.total_count == 0 {
        let Some(effective_from) = NaiveDate::from_ymd_opt(Utc::now().year(), 1, 1) else {
            anyhow::bail!("invalid effective date");
        };
        rates
            .create(
                tenant.id,
                SocialSecurityRateInput {
                    name: "Standard".to_string(),
                    employee_rate: dec!(7),
                    employer_rate: dec!(10),
                    wage_ceiling: None,
                    effective_from,
                    effective_to: None,
                },
                None,
            )
            .await?;
    }
    Ok(())
}
