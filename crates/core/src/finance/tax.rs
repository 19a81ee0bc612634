//! Progressive tax brackets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::round_money;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// Upper limit used when a bracket is open-ended (999,999,999,999.99).
pub const DEFAULT_UPPER_LIMIT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// One bracket of a progressive tax schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Bracket name.
    pub name: String,
    /// Marginal rate in percent.
    pub rate: Decimal,
    /// Income where the bracket starts.
    pub lower_limit: Decimal,
    /// Income where the bracket ends.
    pub upper_limit: Decimal,
    /// First day the rule applies.
    pub effective_from: NaiveDate,
    /// Last day the rule applies, if bounded.
    pub effective_to: Option<NaiveDate>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating a tax rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRuleInput {
    /// Bracket name.
    pub name: String,
    /// Marginal rate in percent.
    pub rate: Decimal,
    /// Lower limit.
    #[serde(default)]
    pub lower_limit: Decimal,
    /// Upper limit; open-ended when omitted.
    pub upper_limit: Option<Decimal>,
    /// First effective day.
    pub effective_from: NaiveDate,
    /// Last effective day.
    pub effective_to: Option<NaiveDate>,
}

fn check_limits(lower: Decimal, upper: Decimal) -> DomainResult<()> {
    guard::non_negative("lower limit", lower)?;
    if upper <= lower {
        return Err(DomainError::validation("upper limit must be greater than lower limit"));
    }
    Ok(())
}

fn check_dates(from: NaiveDate, to: Option<NaiveDate>) -> DomainResult<()> {
    if to.is_some_and(|to| to < from) {
        return Err(DomainError::validation("effective to must not precede effective from"));
    }
    Ok(())
}

impl TaxRule {
    /// Creates a bracket. An omitted upper limit defaults to
    /// [`DEFAULT_UPPER_LIMIT`].
    ///
    /// # Errors
    ///
    /// Fails for an empty name, a rate outside `0..=100`, inverted limits,
    /// or inverted dates.
    pub fn create(tenant_id: Uuid, input: TaxRuleInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let upper_limit = input.upper_limit.unwrap_or(DEFAULT_UPPER_LIMIT);
        check_limits(input.lower_limit, upper_limit)?;
        check_dates(input.effective_from, input.effective_to)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: guard::required("name", &input.name)?,
            rate: guard::percentage("rate", input.rate)?,
            lower_limit: input.lower_limit,
            upper_limit,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            audit: AuditInfo::new(actor),
        })
    }

    /// Updates the bracket. An omitted upper limit keeps the current one.
    ///
    /// # Errors
    ///
    /// Same rules as [`TaxRule::create`]; state is unchanged on failure.
    pub fn update(&mut self, input: TaxRuleInput, actor: Option<Uuid>) -> DomainResult<()> {
        let upper_limit = input.upper_limit.unwrap_or(self.upper_limit);
        check_limits(input.lower_limit, upper_limit)?;
        check_dates(input.effective_from, input.effective_to)?;
        let name = guard::required("name", &input.name)?;
        let rate = guard::percentage("rate", input.rate)?;

        self.name = name;
        self.rate = rate;
        self.lower_limit = input.lower_limit;
        self.upper_limit = upper_limit;
        self.effective_from = input.effective_from;
        self.effective_to = input.effective_to;
        self.audit.touch(actor);
        Ok(())
    }

    /// Returns true if the rule applies on `date`.
    #[must_use]
    pub fn is_effective(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date <= to)
    }

    /// Tax on the slice of `income` that falls inside this bracket.
    #[must_use]
    pub fn tax_for(&self, income: Decimal) -> Decimal {
        if income <= self.lower_limit {
            return Decimal::ZERO;
        }
        let taxable = income.min(self.upper_limit) - self.lower_limit;
        round_money(taxable * self.rate / Decimal::ONE_HUNDRED)
    }
}

/// Sums every effective bracket's slice of `income`.
#[must_use]
pub fn progressive_tax(rules: &[TaxRule], income: Decimal, date: NaiveDate) -> Decimal {
    rules
        .iter()
        .filter(|rule| rule.is_effective(date))
        .map(|rule| rule.tax_for(income))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn input(rate: Decimal, lower: Decimal, upper: Option<Decimal>) -> TaxRuleInput {
        TaxRuleInput {
            name: "Bracket".to_string(),
            rate,
            lower_limit: lower,
            upper_limit: upper,
            effective_from: jan(1),
            effective_to: None,
        }
    }

    #[test]
    fn test_create_defaults_upper_limit() {
        let rule = TaxRule::create(Uuid::new_v4(), input(dec!(5), dec!(0), None), None).unwrap();
        assert_eq!(rule.upper_limit, dec!(999999999999.99));
    }

    #[test]
    fn test_update_without_upper_preserves_it() {
        let mut rule = TaxRule::create(Uuid::new_v4(), input(dec!(5), dec!(0), None), None).unwrap();
        rule.update(input(dec!(7.5), dec!(100), None), None).unwrap();
        assert_eq!(rule.upper_limit, DEFAULT_UPPER_LIMIT);
        assert_eq!(rule.rate, dec!(7.5));

        let mut bounded =
            TaxRule::create(Uuid::new_v4(), input(dec!(5), dec!(0), Some(dec!(1000))), None).unwrap();
        bounded.update(input(dec!(6), dec!(0), None), None).unwrap();
        assert_eq!(bounded.upper_limit, dec!(1000));
    }

    #[test]
    fn test_create_validation() {
        assert!(TaxRule::create(Uuid::new_v4(), input(dec!(101), dec!(0), None), None).is_err());
        assert!(TaxRule::create(Uuid::new_v4(), input(dec!(-1), dec!(0), None), None).is_err());
        assert!(TaxRule::create(Uuid::new_v4(), input(dec!(5), dec!(100), Some(dec!(100))), None).is_err());
        let mut bad_dates = input(dec!(5), dec!(0), None);
        bad_dates.effective_to = Some(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(TaxRule::create(Uuid::new_v4(), bad_dates, None).is_err());
    }

    #[test]
    fn test_failed_update_leaves_rule_unchanged() {
        let mut rule = TaxRule::create(Uuid::new_v4(), input(dec!(5), dec!(0), None), None).unwrap();
        assert!(rule.update(input(dec!(150), dec!(0), None), None).is_err());
        assert_eq!(rule.rate, dec!(5));
    }

    #[test]
    fn test_is_effective() {
        let mut i = input(dec!(5), dec!(0), None);
        i.effective_from = jan(10);
        i.effective_to = Some(jan(20));
        let rule = TaxRule::create(Uuid::new_v4(), i, None).unwrap();
        assert!(!rule.is_effective(jan(9)));
        assert!(rule.is_effective(jan(10)));
        assert!(rule.is_effective(jan(20)));
        assert!(!rule.is_effective(jan(21)));
    }

    #[test]
    fn test_progressive_tax() {
        let t = Uuid::new_v4();
        let rules = vec![
            TaxRule::create(t, input(dec!(5), dec!(0), Some(dec!(60000000))), None).unwrap(),
            TaxRule::create(t, input(dec!(15), dec!(60000000), Some(dec!(250000000))), None).unwrap(),
            TaxRule::create(t, input(dec!(25), dec!(250000000), None), None).unwrap(),
        ];
        assert_eq!(progressive_tax(&rules, dec!(50000000), jan(15)), dec!(2500000));
        assert_eq!(progressive_tax(&rules, dec!(100000000), jan(15)), dec!(9000000));
        assert_eq!(progressive_tax(&rules, dec!(300000000), jan(15)), dec!(44000000));
        assert_eq!(progressive_tax(&rules, Decimal::ZERO, jan(15)), Decimal::ZERO);
    }
}
