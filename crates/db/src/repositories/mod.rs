//! Repository abstractions for data access.
//!
//! Each repository loads domain records scoped to one tenant, applies a
//! domain operation, and persists the result in a single transaction.

pub mod account;
pub mod cheque;
pub mod commission;
pub mod credit_note;
pub mod employee;
pub mod exchange_rate;
pub mod fiscal;
pub mod goods_receipt;
pub mod job;
pub mod journal;
pub mod lead;
pub mod leave;
pub mod lines;
pub mod partner;
pub mod payroll;
pub mod purchase_order;
pub mod role;
pub mod sales_invoice;
pub mod sales_order;
pub mod sales_quote;
pub mod sales_return;
pub mod session;
pub mod shipment;
pub mod social_security;
pub mod supplier_bill;
pub mod tax_rule;
pub mod tenant;
pub mod user;

pub use account::AccountRepository;
pub use cheque::ChequeRepository;
pub use commission::CommissionRuleRepository;
pub use credit_note::CreditNoteRepository;
pub use employee::EmployeeRepository;
pub use exchange_rate::ExchangeRateRepository;
pub use fiscal::FiscalRepository;
pub use goods_receipt::GoodsReceiptRepository;
pub use job::JobRepository;
pub use journal::JournalRepository;
pub use lead::{LeadRepository, OpportunityRepository};
pub use leave::LeaveRepository;
pub use partner::{PartnerRepository, PartnerRole};
pub use payroll::PayrollRepository;
pub use purchase_order::{PurchaseOrderRepository, PurchaseQuoteRepository};
pub use role::RoleRepository;
pub use sales_invoice::SalesInvoiceRepository;
pub use sales_order::SalesOrderRepository;
pub use sales_quote::SalesQuoteRepository;
pub use sales_return::SalesReturnRepository;
pub use session::{IssuedSession, SessionClient, SessionRepository};
pub use shipment::ShipmentRepository;
pub use social_security::SocialSecurityRepository;
pub use supplier_bill::SupplierBillRepository;
pub use tax_rule::TaxRuleRepository;
pub use tenant::TenantRepository;
pub use user::{UserAccess, UserRepository};
