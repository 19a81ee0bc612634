//! `SeaORM` entities, one module per table.
//!
//! Tables live in one Postgres schema per module.

pub mod accounts;
pub mod business_partners;
pub mod cheques;
pub mod commission_rules;
pub mod credit_notes;
pub mod employees;
pub mod exchange_rates;
pub mod fiscal_periods;
pub mod fiscal_years;
pub mod goods_receipt_lines;
pub mod goods_receipts;
pub mod journal_entries;
pub mod journal_lines;
pub mod leads;
pub mod leave_allocations;
pub mod leave_requests;
pub mod leave_types;
pub mod number_sequences;
pub mod opportunities;
pub mod payroll_entries;
pub mod payroll_entry_details;
pub mod payrolls;
pub mod permissions;
pub mod procurement_document_lines;
pub mod purchase_orders;
pub mod purchase_quotes;
pub mod queued_jobs;
pub mod role_permissions;
pub mod roles;
pub mod sales_document_lines;
pub mod sales_invoices;
pub mod sales_orders;
pub mod sales_quotes;
pub mod sales_returns;
pub mod shipments;
pub mod social_security_rates;
pub mod supplier_bills;
pub mod tax_rules;
pub mod tenants;
pub mod user_roles;
pub mod user_sessions;
pub mod users;

/// Commonly used entity types.
pub mod prelude {
    pub use super::accounts::Entity as Accounts;
    pub use super::business_partners::Entity as BusinessPartners;
    pub use super::cheques::Entity as Cheques;
    pub use super::commission_rules::Entity as CommissionRules;
    pub use super::credit_notes::Entity as CreditNotes;
    pub use super::employees::Entity as Employees;
    pub use super::exchange_rates::Entity as ExchangeRates;
    pub use super::fiscal_periods::Entity as FiscalPeriods;
    pub use super::fiscal_years::Entity as FiscalYears;
    pub use super::goods_receipt_lines::Entity as GoodsReceiptLines;
    pub use super::goods_receipts::Entity as GoodsReceipts;
    pub use super::journal_entries::Entity as JournalEntries;
    pub use super::journal_lines::Entity as JournalLines;
    pub use super::leads::Entity as Leads;
    pub use super::leave_allocations::Entity as LeaveAllocations;
    pub use super::leave_requests::Entity as LeaveRequests;
    pub use super::leave_types::Entity as LeaveTypes;
    pub use super::number_sequences::Entity as NumberSequences;
    pub use super::opportunities::Entity as Opportunities;
    pub use super::payroll_entries::Entity as PayrollEntries;
    pub use super::payroll_entry_details::Entity as PayrollEntryDetails;
    pub use super::payrolls::Entity as Payrolls;
    pub use super::permissions::Entity as Permissions;
    pub use super::procurement_document_lines::Entity as ProcurementDocumentLines;
    pub use super::purchase_orders::Entity as PurchaseOrders;
    pub use super::purchase_quotes::Entity as PurchaseQuotes;
    pub use super::queued_jobs::Entity as QueuedJobs;
    pub use super::role_permissions::Entity as RolePermissions;
    pub use super::roles::Entity as Roles;
    pub use super::sales_document_lines::Entity as SalesDocumentLines;
    pub use super::sales_invoices::Entity as SalesInvoices;
    pub use super::sales_orders::Entity as SalesOrders;
    pub use super::sales_quotes::Entity as SalesQuotes;
    pub use super::sales_returns::Entity as SalesReturns;
    pub use super::shipments::Entity as Shipments;
    pub use super::social_security_rates::Entity as SocialSecurityRates;
    pub use super::supplier_bills::Entity as SupplierBills;
    pub use super::tax_rules::Entity as TaxRules;
    pub use super::tenants::Entity as Tenants;
    pub use super::user_roles::Entity as UserRoles;
    pub use super::user_sessions::Entity as UserSessions;
    pub use super::users::Entity as Users;
}
