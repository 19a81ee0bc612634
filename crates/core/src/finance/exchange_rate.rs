//! Exchange rates and currency conversion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::convert_amount;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::DomainResult;
use crate::finance::error::LedgerError;
use crate::guard;

/// A dated conversion rate between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Units of `to_currency` per unit of `from_currency`.
    pub rate: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating an exchange rate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateInput {
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Rate.
    pub rate: Decimal,
    /// Effective date.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a rate.
    ///
    /// # Errors
    ///
    /// Fails for malformed or identical currencies, or a non-positive rate.
    pub fn create(tenant_id: Uuid, input: ExchangeRateInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let from_currency = guard::currency(&input.from_currency)?;
        let to_currency = guard::currency(&input.to_currency)?;
        if from_currency == to_currency {
            return Err(LedgerError::SameCurrencyExchange.into());
        }
        if input.rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate.into());
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            from_currency,
            to_currency,
            rate: input.rate,
            effective_date: input.effective_date,
            audit: AuditInfo::new(actor),
        })
    }

    /// Converts an amount from `from_currency` to `to_currency`.
    ///
    /// Returns `None` when the result is out of range.
    #[must_use]
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        convert_amount(amount, self.rate)
    }
}

/// Picks the latest rate effective on or before `date` for a currency pair.
#[must_use]
pub fn latest_rate<'a>(
    rates: &'a [ExchangeRate],
    from: &str,
    to: &str,
    date: NaiveDate,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.from_currency == from && r.to_currency == to && r.effective_date <= date)
        .max_by_key(|r| r.effective_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(from: &str, to: &str, rate: Decimal, day: u32) -> ExchangeRate {
        ExchangeRate::create(
            Uuid::new_v4(),
            ExchangeRateInput {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate,
                effective_date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_rejects_same_currency_and_bad_rate() {
        let input = |from: &str, rate| ExchangeRateInput {
            from_currency: from.to_string(),
            to_currency: "USD".to_string(),
            rate,
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        assert!(ExchangeRate::create(Uuid::new_v4(), input("usd", dec!(1)), None).is_err());
        assert!(ExchangeRate::create(Uuid::new_v4(), input("EUR", dec!(0)), None).is_err());
        assert!(ExchangeRate::create(Uuid::new_v4(), input("EUR", dec!(1.08)), None).is_ok());
    }

    #[test]
    fn test_latest_rate_on_or_before_date() {
        let rates = vec![
            rate("USD", "IDR", dec!(15000), 1),
            rate("USD", "IDR", dec!(15500), 10),
            rate("USD", "IDR", dec!(16000), 20),
            rate("EUR", "IDR", dec!(17000), 5),
        ];
        let on = |day| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        assert_eq!(latest_rate(&rates, "USD", "IDR", on(15)).unwrap().rate, dec!(15500));
        assert_eq!(latest_rate(&rates, "USD", "IDR", on(20)).unwrap().rate, dec!(16000));
        assert!(latest_rate(&rates, "IDR", "USD", on(20)).is_none());
    }

    #[test]
    fn test_convert_uses_bankers_rounding() {
        let r = rate("USD", "EUR", dec!(0.925), 1);
        assert_eq!(r.convert(dec!(10.10)), Some(dec!(9.34)));
        assert_eq!(r.convert(dec!(1.00)), Some(dec!(0.92)));
        assert_eq!(rate("USD", "IDR", dec!(16000), 1).convert(Decimal::MAX), None);
    }
}
