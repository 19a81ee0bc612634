//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` rounded to two places with
//! banker's rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places stored for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// ISO 4217 currency code (three upper-case ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a currency code, upper-casing it.
    ///
    /// # Errors
    ///
    /// Returns an error message if the code is not three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, String> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(format!("Invalid currency code: {code}"))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds an amount to two decimal places using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Converts an amount with an exchange rate, rounding the result.
///
/// Returns `None` when the product does not fit in a `Decimal`.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount.checked_mul(rate).map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("usd", "USD")]
    #[case(" IDR ", "IDR")]
    #[case("eur", "EUR")]
    fn test_currency_code_parse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDX")]
    #[case("U5D")]
    fn test_currency_code_rejects(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"sgd\"").unwrap();
        assert_eq!(code.to_string(), "SGD");
        assert!(serde_json::from_str::<CurrencyCode>("\"dollars\"").is_err());
    }

    #[rstest]
    #[case(dec!(2.345), dec!(2.34))]
    #[case(dec!(2.355), dec!(2.36))]
    #[case(dec!(2.3451), dec!(2.35))]
    #[case(dec!(-1.005), dec!(-1.00))]
    fn test_round_money_bankers(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_convert_amount() {
        assert_eq!(convert_amount(dec!(100), dec!(15500.125)), Some(dec!(1550012.50)));
        assert_eq!(convert_amount(dec!(10.01), dec!(0.5)), Some(dec!(5.00)));
        assert_eq!(convert_amount(Decimal::MAX, dec!(2)), None);
    }
}
