//! Sales commission rules and evaluation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::round_money;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// A commission band, optionally tied to one salesperson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRule {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Salesperson the rule is restricted to.
    pub salesperson_id: Option<Uuid>,
    /// Inclusive lower bound of the sale amount.
    pub min_amount: Decimal,
    /// Exclusive upper bound of the sale amount.
    pub max_amount: Option<Decimal>,
    /// Percentage of the sale amount.
    pub rate_percent: Decimal,
    /// Fixed amount added on top.
    pub flat_amount: Decimal,
    /// Lower wins among equally specific rules.
    pub priority: i32,
    /// Inactive rules never match.
    pub is_active: bool,
    /// First day the rule applies.
    pub effective_from: NaiveDate,
    /// Last day the rule applies.
    pub effective_to: Option<NaiveDate>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRuleInput {
    /// Display name.
    pub name: String,
    /// Salesperson restriction.
    pub salesperson_id: Option<Uuid>,
    /// Lower bound.
    #[serde(default)]
    pub min_amount: Decimal,
    /// Upper bound.
    pub max_amount: Option<Decimal>,
    /// Rate.
    pub rate_percent: Decimal,
    /// Flat amount.
    #[serde(default)]
    pub flat_amount: Decimal,
    /// Priority.
    #[serde(default)]
    pub priority: i32,
    /// First effective day.
    pub effective_from: NaiveDate,
    /// Last effective day.
    pub effective_to: Option<NaiveDate>,
}

struct CheckedRule {
    name: String,
    min_amount: Decimal,
    rate_percent: Decimal,
    flat_amount: Decimal,
}

fn check(input: &CommissionRuleInput) -> DomainResult<CheckedRule> {
    let name = guard::required("name", &input.name)?;
    let min_amount = guard::non_negative("min amount", input.min_amount)?;
    if input.max_amount.is_some_and(|max| max <= min_amount) {
        return Err(DomainError::validation("max amount must exceed min amount"));
    }
    if input.effective_to.is_some_and(|to| to < input.effective_from) {
        return Err(DomainError::validation("effective to must not precede effective from"));
    }
    Ok(CheckedRule {
        name,
        min_amount,
        rate_percent: guard::percentage("rate percent", input.rate_percent)?,
        flat_amount: guard::non_negative("flat amount", input.flat_amount)?,
    })
}

impl CommissionRule {
    /// Creates an active rule.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, an inverted band or date range, or an out-of-range rate.
    pub fn create(tenant_id: Uuid, input: CommissionRuleInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let checked = check(&input)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: checked.name,
            salesperson_id: input.salesperson_id,
            min_amount: checked.min_amount,
            max_amount: input.max_amount,
            rate_percent: checked.rate_percent,
            flat_amount: checked.flat_amount,
            priority: input.priority,
            is_active: true,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            audit: AuditInfo::new(actor),
        })
    }

    /// Replaces the rule's terms.
    ///
    /// # Errors
    ///
    /// Same checks as [`CommissionRule::create`].
    pub fn update(&mut self, input: CommissionRuleInput, actor: Option<Uuid>) -> DomainResult<()> {
        let checked = check(&input)?;
        self.name = checked.name;
        self.salesperson_id = input.salesperson_id;
        self.min_amount = checked.min_amount;
        self.max_amount = input.max_amount;
        self.rate_percent = checked.rate_percent;
        self.flat_amount = checked.flat_amount;
        self.priority = input.priority;
        self.effective_from = input.effective_from;
        self.effective_to = input.effective_to;
        self.audit.touch(actor);
        Ok(())
    }

    /// Stops the rule from matching.
    pub fn deactivate(&mut self, actor: Option<Uuid>) {
        self.is_active = false;
        self.audit.touch(actor);
    }

    /// Whether the rule applies to this sale.
    pub fn matches(&self, amount: Decimal, salesperson_id: Option<Uuid>, date: NaiveDate) -> bool {
        self.is_active
            && date >= self.effective_from
            && self.effective_to.is_none_or(|to| date <= to)
            && self.salesperson_id.is_none_or(|id| Some(id) == salesperson_id)
            && amount >= self.min_amount
            && self.max_amount.is_none_or(|max| amount < max)
    }

    /// Commission this rule pays on `amount`.
    pub fn commission_for(&self, amount: Decimal) -> Decimal {
        round_money(amount * self.rate_percent / Decimal::ONE_HUNDRED + self.flat_amount)
    }
}

/// Commission on a sale using the best matching rule, or zero when none match.
///
/// Salesperson-specific rules beat generic ones; ties go to the lowest priority.
///
/// # Errors
///
/// Returns a validation error for a negative or oversized sale amount.
pub fn evaluate(
    rules: &[CommissionRule],
    amount: Decimal,
    salesperson_id: Option<Uuid>,
    date: NaiveDate,
) -> DomainResult<Decimal> {
    let amount = guard::non_negative("sale amount", amount)?;
    Ok(rules
        .iter()
        .filter(|rule| rule.matches(amount, salesperson_id, date))
        .min_by_key(|rule| (rule.salesperson_id.is_none(), rule.priority))
        .map_or(Decimal::ZERO, |rule| rule.commission_for(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn rule(salesperson: Option<Uuid>, rate: Decimal, flat: Decimal, priority: i32) -> CommissionRule {
        CommissionRule::create(
            Uuid::new_v4(),
            CommissionRuleInput {
                name: "Standard".to_string(),
                salesperson_id: salesperson,
                min_amount: dec!(100),
                max_amount: Some(dec!(10000)),
                rate_percent: rate,
                flat_amount: flat,
                priority,
                effective_from: date(1),
                effective_to: Some(date(31)),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_specific_rule_beats_generic() {
        let rep = Uuid::new_v4();
        let rules = vec![rule(None, dec!(5), dec!(0), 0), rule(Some(rep), dec!(7.5), dec!(10), 9)];
        assert_eq!(evaluate(&rules, dec!(1000), Some(rep), date(10)).unwrap(), dec!(85));
        assert_eq!(evaluate(&rules, dec!(1000), Some(Uuid::new_v4()), date(10)).unwrap(), dec!(50));
        assert_eq!(evaluate(&rules, dec!(1000), None, date(10)).unwrap(), dec!(50));
    }

    #[test]
    fn test_lowest_priority_wins() {
        let rules = vec![rule(None, dec!(5), dec!(0), 2), rule(None, dec!(3), dec!(0), 1)];
        assert_eq!(evaluate(&rules, dec!(1000), None, date(10)).unwrap(), dec!(30));
    }

    #[test]
    fn test_no_match_is_zero() {
        let mut inactive = rule(None, dec!(5), dec!(0), 0);
        inactive.deactivate(None);
        let rules = vec![rule(None, dec!(5), dec!(0), 0), inactive];
        assert_eq!(evaluate(&rules, dec!(50), None, date(10)).unwrap(), Decimal::ZERO);
        assert_eq!(evaluate(&rules, dec!(10000), None, date(10)).unwrap(), Decimal::ZERO);
        assert_eq!(evaluate(&rules[1..], dec!(1000), None, date(10)).unwrap(), Decimal::ZERO);
        assert_eq!(
            evaluate(&rules, dec!(1000), None, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_sale_amount_is_validated() {
        let rules = vec![rule(None, dec!(5), dec!(0), 0)];
        assert!(evaluate(&rules, dec!(-1), None, date(10)).is_err());
        assert!(evaluate(&rules, Decimal::MAX, None, date(10)).is_err());
    }

    #[test]
    fn test_commission_is_rounded() {
        let r = rule(None, dec!(3.333), dec!(0), 0);
        assert_eq!(r.commission_for(dec!(100.05)), dec!(3.33));
    }

    #[test]
    fn test_band_validation() {
        let mut input = CommissionRuleInput {
            name: "Bad".to_string(),
            salesperson_id: None,
            min_amount: dec!(500),
            max_amount: Some(dec!(500)),
            rate_percent: dec!(5),
            flat_amount: Decimal::ZERO,
            priority: 0,
            effective_from: date(1),
            effective_to: None,
        };
        assert!(CommissionRule::create(Uuid::new_v4(), input.clone(), None).is_err());
        input.max_amount = None;
        input.rate_percent = dec!(101);
        assert!(CommissionRule::create(Uuid::new_v4(), input, None).is_err());
    }
}
