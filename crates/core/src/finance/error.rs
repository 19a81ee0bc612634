//! Ledger error types for journal and fiscal period rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::DomainError;

/// Errors raised by ledger validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Journal entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Journal entry totals are zero.
    #[error("Journal entry totals must be greater than zero")]
    ZeroTotal,

    /// Line must carry exactly one positive side.
    #[error("Line {0} must have either a debit or a credit amount, not both")]
    InvalidLineAmount(i32),

    // ========== Fiscal Period Errors ==========
    /// Fiscal period is closed, no posting allowed.
    #[error("Fiscal period is closed, no posting allowed")]
    PeriodClosed,

    /// Entry date falls outside the fiscal period.
    #[error("Date {0} is outside the fiscal period")]
    DateOutsidePeriod(NaiveDate),

    /// Cannot close a period while earlier periods are open.
    #[error("Cannot close fiscal period: earlier periods must be closed first")]
    EarlierPeriodsNotClosed,

    /// Cannot reopen a period while later periods are closed.
    #[error("Cannot reopen fiscal period: later periods must be reopened first")]
    LaterPeriodsClosed,

    /// Cannot close a year with open periods.
    #[error("Cannot close fiscal year: all periods must be closed first")]
    OpenPeriodsRemain,

    /// Fiscal years may not overlap.
    #[error("Fiscal year overlaps an existing fiscal year")]
    OverlappingFiscalYear,

    // ========== Currency Errors ==========
    /// No exchange rate found for the currency pair on the given date.
    #[error("No exchange rate found for {from} to {to} on {date}")]
    NoExchangeRate {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// Date for which the rate was requested.
        date: NaiveDate,
    },

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    InvalidExchangeRate,

    /// Source and target currencies must be different.
    #[error("Source and target currencies must be different")]
    SameCurrencyExchange,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::ZeroTotal => "ZERO_TOTAL",
            Self::InvalidLineAmount(_) => "INVALID_LINE_AMOUNT",
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::DateOutsidePeriod(_) => "DATE_OUTSIDE_PERIOD",
            Self::EarlierPeriodsNotClosed => "EARLIER_PERIODS_NOT_CLOSED",
            Self::LaterPeriodsClosed => "LATER_PERIODS_CLOSED",
            Self::OpenPeriodsRemain => "OPEN_PERIODS_REMAIN",
            Self::OverlappingFiscalYear => "OVERLAPPING_FISCAL_YEAR",
            Self::NoExchangeRate { .. } => "NO_EXCHANGE_RATE",
            Self::InvalidExchangeRate => "INVALID_EXCHANGE_RATE",
            Self::SameCurrencyExchange => "SAME_CURRENCY_EXCHANGE",
        }
    }

    /// Returns true for errors caused by bad arguments rather than state.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidLineAmount(_)
                | Self::DateOutsidePeriod(_)
                | Self::InvalidExchangeRate
                | Self::SameCurrencyExchange
        )
    }
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        if err.is_validation() {
            Self::Validation(err.to_string())
        } else {
            Self::InvalidOperation(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );
        assert_eq!(err.error_code(), "UNBALANCED_ENTRY");
    }

    #[test]
    fn test_conversion_kind() {
        assert!(matches!(
            DomainError::from(LedgerError::PeriodClosed),
            DomainError::InvalidOperation(_)
        ));
        assert!(matches!(
            DomainError::from(LedgerError::SameCurrencyExchange),
            DomainError::Validation(_)
        ));
    }
}
