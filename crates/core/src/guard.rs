//! Field and status guards used by domain constructors and methods.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Largest amount or quantity a record may carry (999,999,999,999,999.99).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_569_325_055, 23_283_064, 0, false, 2);

/// Fails unless `current` is one of `allowed`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` naming the entity, status, and action.
pub fn ensure_status<S>(
    entity: &'static str,
    current: S,
    allowed: &[S],
    action: &'static str,
) -> DomainResult<()>
where
    S: Copy + PartialEq + std::fmt::Display,
{
    if allowed.contains(&current) {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            entity,
            from: current.to_string(),
            action,
        })
    }
}

/// Trims a required text field.
///
/// # Errors
///
/// Returns a validation error if the trimmed value is empty.
pub fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims and upper-cases a required code.
///
/// # Errors
///
/// Returns a validation error if the code is empty.
pub fn code(field: &str, value: &str) -> DomainResult<String> {
    required(field, value).map(|v| v.to_uppercase())
}

/// Trims an optional text field, mapping blank to `None`.
#[must_use]
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks a percentage in `0..=100`.
///
/// # Errors
///
/// Returns a validation error when out of range.
pub fn percentage(field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(value)
}

/// Checks an amount does not exceed [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns a validation error for larger values.
pub fn bounded(field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value > MAX_AMOUNT {
        return Err(DomainError::validation(format!("{field} cannot exceed {MAX_AMOUNT}")));
    }
    Ok(value)
}

/// Checks an amount is zero or more and within [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns a validation error for negative or oversized values.
pub fn non_negative(field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    bounded(field, value)
}

/// Checks an amount is strictly positive and within [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns a validation error for zero, negative, or oversized values.
pub fn positive(field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} must be greater than zero")));
    }
    bounded(field, value)
}

/// Multiplies two amounts, failing when the product exceeds [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns a validation error naming `field` on overflow.
pub fn product(field: &str, a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| DomainError::validation(format!("{field} cannot exceed {MAX_AMOUNT}")))
        .and_then(|value| bounded(field, value.abs()).map(|_| value))
}

/// Checks a currency code and returns it upper-cased.
///
/// # Errors
///
/// Returns a validation error if the code is not three letters.
pub fn currency(value: &str) -> DomainResult<String> {
    tessera_shared::types::CurrencyCode::parse(value)
        .map(String::from)
        .map_err(DomainError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light {
        Red,
        Green,
    }

    impl std::fmt::Display for Light {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[test]
    fn test_ensure_status() {
        assert!(ensure_status("light", Light::Red, &[Light::Red], "go").is_ok());
        let err = ensure_status("light", Light::Green, &[Light::Red], "go").unwrap_err();
        assert_eq!(err.to_string(), "Cannot go light in status 'Green'");
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(required("name", "  Acme ").unwrap(), "Acme");
        assert!(required("name", "   ").is_err());
        assert_eq!(code("code", " c-001 ").unwrap(), "C-001");
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_numeric_helpers() {
        assert!(percentage("rate", dec!(100)).is_ok());
        assert!(percentage("rate", dec!(100.01)).is_err());
        assert!(percentage("rate", dec!(-0.01)).is_err());
        assert!(non_negative("limit", Decimal::ZERO).is_ok());
        assert!(positive("amount", Decimal::ZERO).is_err());
        assert!(non_negative("limit", MAX_AMOUNT).is_ok());
        assert!(positive("amount", MAX_AMOUNT + dec!(0.01)).is_err());
        assert_eq!(currency("idr").unwrap(), "IDR");
        assert!(currency("rupiah").is_err());
    }

    #[test]
    fn test_product_rejects_overflow() {
        assert_eq!(product("line amount", dec!(3), dec!(2.5)).unwrap(), dec!(7.5));
        assert!(product("line amount", MAX_AMOUNT, dec!(2)).is_err());

        let huge = Decimal::MAX / dec!(2);
        let err = product("line amount", huge, dec!(3)).unwrap_err();
        assert!(err.to_string().contains("line amount cannot exceed"));
    }
}
