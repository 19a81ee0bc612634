//! Finance: chart of accounts, fiscal calendar, exchange rates, the journal,
//! tax brackets, cheques, and credit notes.

pub mod account;
pub mod cheque;
pub mod credit_note;
pub mod error;
pub mod exchange_rate;
pub mod fiscal;
pub mod journal;
pub mod tax;

pub use account::{Account, AccountInput, AccountType};
pub use cheque::{Cheque, ChequeDirection, ChequeInput, ChequeStatus};
pub use credit_note::{CreditNote, CreditNoteInput, CreditNoteStatus};
pub use error::LedgerError;
pub use exchange_rate::{ExchangeRate, ExchangeRateInput, latest_rate};
pub use fiscal::{FiscalPeriod, FiscalStatus, FiscalYear, FiscalYearInput, generate_monthly_periods};
pub use journal::{
    JournalEntry, JournalEntryInput, JournalLine, JournalLineInput, JournalStatus, validate_balance,
};
pub use tax::{DEFAULT_UPPER_LIMIT, TaxRule, TaxRuleInput, progressive_tax};
