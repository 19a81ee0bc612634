//! Social security contribution rates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::round_money;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// Employee and employer contribution rates, optionally capped by a wage ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSecurityRate {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Employee share in percent.
    pub employee_rate: Decimal,
    /// Employer share in percent.
    pub employer_rate: Decimal,
    /// Wages above this are not contributory.
    pub wage_ceiling: Option<Decimal>,
    /// First day the rate applies.
    pub effective_from: NaiveDate,
    /// Last day the rate applies.
    pub effective_to: Option<NaiveDate>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating a rate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSecurityRateInput {
    /// Name.
    pub name: String,
    /// Employee rate.
    pub employee_rate: Decimal,
    /// Employer rate.
    pub employer_rate: Decimal,
    /// Wage ceiling.
    pub wage_ceiling: Option<Decimal>,
    /// First effective day.
    pub effective_from: NaiveDate,
    /// Last effective day.
    pub effective_to: Option<NaiveDate>,
}

/// Contributions computed for one gross wage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    /// Wage the rates were applied to.
    pub contributory_wage: Decimal,
    /// Deducted from the employee.
    pub employee: Decimal,
    /// Paid by the employer.
    pub employer: Decimal,
}

struct Checked {
    name: String,
    employee_rate: Decimal,
    employer_rate: Decimal,
}

fn check(input: &SocialSecurityRateInput) -> DomainResult<Checked> {
    if let Some(ceiling) = input.wage_ceiling {
        guard::positive("wage ceiling", ceiling)?;
    }
    if input.effective_to.is_some_and(|to| to < input.effective_from) {
        return Err(DomainError::validation("effective to must not precede effective from"));
    }
    Ok(Checked {
        name: guard::required("name", &input.name)?,
        employee_rate: guard::percentage("employee rate", input.employee_rate)?,
        employer_rate: guard::percentage("employer rate", input.employer_rate)?,
    })
}

impl SocialSecurityRate {
    /// Creates a rate.
    ///
    /// # Errors
    ///
    /// Fails for an empty name, rates outside `0..=100`, a non-positive
    /// ceiling, or an inverted date range.
    pub fn create(tenant_id: Uuid, input: SocialSecurityRateInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let checked = check(&input)?;
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: checked.name,
            employee_rate: checked.employee_rate,
            employer_rate: checked.employer_rate,
            wage_ceiling: input.wage_ceiling,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            audit: AuditInfo::new(actor),
        })
    }

    /// Replaces the rate's terms.
    ///
    /// # Errors
    ///
    /// Same checks as [`SocialSecurityRate::create`].
    pub fn update(&mut self, input: SocialSecurityRateInput, actor: Option<Uuid>) -> DomainResult<()> {
        let checked = check(&input)?;
        self.name = checked.name;
        self.employee_rate = checked.employee_rate;
        self.employer_rate = checked.employer_rate;
        self.wage_ceiling = input.wage_ceiling;
        self.effective_from = input.effective_from;
        self.effective_to = input.effective_to;
        self.audit.touch(actor);
        Ok(())
    }

    /// Returns true if the rate applies on `date`.
    pub fn is_effective(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date <= to)
    }

    /// Contributions on `gross`, capped at the wage ceiling.
    pub fn contribution(&self, gross: Decimal) -> Contribution {
        let wage = self.wage_ceiling.map_or(gross, |ceiling| gross.min(ceiling));
        Contribution {
            contributory_wage: wage,
            employee: round_money(wage * self.employee_rate / Decimal::ONE_HUNDRED),
            employer: round_money(wage * self.employer_rate / Decimal::ONE_HUNDRED),
        }
    }
}

/// The rate effective on `date` with the latest start.
pub fn effective_rate(rates: &[SocialSecurityRate], date: NaiveDate) -> Option<&SocialSecurityRate> {
    rates
        .iter()
        .filter(|rate| rate.is_effective(date))
        .max_by_key(|rate| rate.effective_from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(ceiling: Option<Decimal>, from: NaiveDate) -> SocialSecurityRate {
        SocialSecurityRate::create(
            Uuid::new_v4(),
            SocialSecurityRateInput {
                name: "National insurance".to_string(),
                employee_rate: dec!(7),
                employer_rate: dec!(10.5),
                wage_ceiling: ceiling,
                effective_from: from,
                effective_to: None,
            },
            None,
        )
        .unwrap()
    }

    fn jan1(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    #[test]
    fn test_contribution_capped() {
        let r = rate(Some(dec!(4000)), jan1(2026));
        let c = r.contribution(dec!(5000));
        assert_eq!(c.contributory_wage, dec!(4000));
        assert_eq!(c.employee, dec!(280));
        assert_eq!(c.employer, dec!(420));

        let uncapped = rate(None, jan1(2026)).contribution(dec!(5000));
        assert_eq!(uncapped.employee, dec!(350));
    }

    #[test]
    fn test_latest_effective_rate_wins() {
        let rates = vec![rate(None, jan1(2025)), rate(Some(dec!(4000)), jan1(2026))];
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(effective_rate(&rates, date).map(|r| r.id), Some(rates[1].id));
        assert!(effective_rate(&rates, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).is_none());
    }

    #[test]
    fn test_rates_validated() {
        let input = SocialSecurityRateInput {
            name: "Bad".to_string(),
            employee_rate: dec!(120),
            employer_rate: dec!(1),
            wage_ceiling: None,
            effective_from: jan1(2026),
            effective_to: None,
        };
        assert!(SocialSecurityRate::create(Uuid::new_v4(), input, None).is_err());
    }
}
