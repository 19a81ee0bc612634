//! Core domain logic for Tessera.
//!
//! Pure business rules with no web or database dependencies: entities,
//! field invariants, status transitions, and the ledger, payroll, and
//! commission arithmetic.
//!
//! # Modules
//!
//! - `system` - Tenants, users, roles, permissions, queued jobs
//! - `finance` - Chart of accounts, fiscal calendar, journal, tax, cheques
//! - `crm` - Business partners, leads, opportunities
//! - `sales` - Quotes, orders, invoices, shipments, returns, commissions
//! - `procurement` - Purchase quotes and orders, receipts, supplier bills
//! - `hr` - Employees, leave, social security, payroll

mod macros;

pub mod audit;
pub mod auth;
pub mod crm;
pub mod document;
pub mod error;
pub mod finance;
pub mod guard;
pub mod hr;
pub mod procurement;
pub mod sales;
pub mod system;

pub use audit::AuditInfo;
pub use error::{DomainError, DomainResult};
