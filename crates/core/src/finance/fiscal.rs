//! Fiscal years and their monthly periods.
//!
//! Periods close in order: a period may close only when every earlier period
//! of the year is closed, and may reopen only when every later period is open.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::finance::error::LedgerError;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Status of a fiscal year or period.
    FiscalStatus {
        /// Open for posting.
        Open => "open",
        /// Closed, no posting allowed.
        Closed => "closed",
    }
}

/// A fiscal period within a fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent fiscal year.
    pub fiscal_year_id: Uuid,
    /// Period number within the year (1-based).
    pub period_number: i32,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalStatus,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the period.
    pub closed_by: Option<Uuid>,
}

impl FiscalPeriod {
    /// Returns true if entries can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FiscalStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Fails unless the period is open and contains `date`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PeriodClosed` or `LedgerError::DateOutsidePeriod`.
    pub fn ensure_accepts(&self, date: NaiveDate) -> Result<(), LedgerError> {
        if !self.is_open() {
            return Err(LedgerError::PeriodClosed);
        }
        if !self.contains_date(date) {
            return Err(LedgerError::DateOutsidePeriod(date));
        }
        Ok(())
    }
}

/// A fiscal year with its generated periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalStatus,
    /// Monthly periods ordered by number.
    pub periods: Vec<FiscalPeriod>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a fiscal year.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalYearInput {
    /// Year name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

impl FiscalYear {
    const ENTITY: &'static str = "fiscal year";

    /// Creates an open fiscal year with monthly periods.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or `start_date >= end_date`.
    pub fn create(tenant_id: Uuid, input: FiscalYearInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let name = guard::required("name", &input.name)?;
        if input.start_date >= input.end_date {
            return Err(DomainError::validation("start date must be before end date"));
        }
        let id = Uuid::now_v7();
        Ok(Self {
            id,
            tenant_id,
            name,
            start_date: input.start_date,
            end_date: input.end_date,
            status: FiscalStatus::Open,
            periods: generate_monthly_periods(id, input.start_date, input.end_date),
            audit: AuditInfo::new(actor),
        })
    }

    /// Returns true if the date range intersects this year.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && end >= self.start_date
    }

    /// Returns the period containing `date`.
    #[must_use]
    pub fn period_for(&self, date: NaiveDate) -> Option<&FiscalPeriod> {
        self.periods.iter().find(|p| p.contains_date(date))
    }

    fn period_index(&self, period_id: Uuid) -> DomainResult<usize> {
        self.periods
            .iter()
            .position(|p| p.id == period_id)
            .ok_or_else(|| DomainError::validation("period does not belong to this fiscal year"))
    }

    /// Closes a period.
    ///
    /// # Errors
    ///
    /// Fails if the period is already closed or an earlier period is open.
    pub fn close_period(&mut self, period_id: Uuid, actor: Option<Uuid>) -> DomainResult<&FiscalPeriod> {
        let idx = self.period_index(period_id)?;
        ensure_status("fiscal period", self.periods[idx].status, &[FiscalStatus::Open], "close")?;
        if self.periods[..idx].iter().any(FiscalPeriod::is_open) {
            return Err(LedgerError::EarlierPeriodsNotClosed.into());
        }
        let period = &mut self.periods[idx];
        period.status = FiscalStatus::Closed;
        period.closed_at = Some(Utc::now());
        period.closed_by = actor;
        self.audit.touch(actor);
        Ok(&self.periods[idx])
    }

    /// Reopens a period.
    ///
    /// # Errors
    ///
    /// Fails if the year or period is not closed as required, or a later
    /// period is closed.
    pub fn reopen_period(&mut self, period_id: Uuid, actor: Option<Uuid>) -> DomainResult<&FiscalPeriod> {
        ensure_status(Self::ENTITY, self.status, &[FiscalStatus::Open], "reopen a period of")?;
        let idx = self.period_index(period_id)?;
        ensure_status("fiscal period", self.periods[idx].status, &[FiscalStatus::Closed], "reopen")?;
        if self.periods[idx + 1..].iter().any(|p| !p.is_open()) {
            return Err(LedgerError::LaterPeriodsClosed.into());
        }
        let period = &mut self.periods[idx];
        period.status = FiscalStatus::Open;
        period.closed_at = None;
        period.closed_by = None;
        self.audit.touch(actor);
        Ok(&self.periods[idx])
    }

    /// Closes the year.
    ///
    /// # Errors
    ///
    /// Fails if the year is closed or any period is still open.
    pub fn close(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[FiscalStatus::Open], "close")?;
        if self.periods.iter().any(FiscalPeriod::is_open) {
            return Err(LedgerError::OpenPeriodsRemain.into());
        }
        self.status = FiscalStatus::Closed;
        self.audit.touch(actor);
        Ok(())
    }
}

/// Splits a date range into calendar-month periods.
#[must_use]
pub fn generate_monthly_periods(
    fiscal_year_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<FiscalPeriod> {
    let mut periods = Vec::new();
    let mut current = start_date;
    let mut period_number = 1;

    while current <= end_date {
        let period_end = last_day_of_month(current).min(end_date);
        periods.push(FiscalPeriod {
            id: Uuid::now_v7(),
            fiscal_year_id,
            period_number,
            name: format!("{} {}", month_name(current.month()), current.year()),
            start_date: current,
            end_date: period_end,
            status: FiscalStatus::Open,
            closed_at: None,
            closed_by: None,
        });

        match period_end.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
        period_number += 1;
    }

    periods
}

/// Returns the last day of the month containing `date`.
fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Returns month name.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn year() -> FiscalYear {
        FiscalYear::create(
            Uuid::new_v4(),
            FiscalYearInput {
                name: "FY2026".to_string(),
                start_date: date(2026, 1, 1),
                end_date: date(2026, 12, 31),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_monthly_periods_full_year() {
        let year = year();
        assert_eq!(year.periods.len(), 12);
        assert_eq!(year.periods[0].name, "January 2026");
        assert_eq!(year.periods[1].end_date, date(2026, 2, 28));
        assert_eq!(year.periods[11].period_number, 12);
        assert_eq!(year.periods[11].end_date, date(2026, 12, 31));
    }

    #[test]
    fn test_generate_mid_month_fiscal_year() {
        let periods = generate_monthly_periods(Uuid::new_v4(), date(2025, 7, 15), date(2026, 7, 14));
        assert_eq!(periods.len(), 13);
        assert_eq!(periods[0].start_date, date(2025, 7, 15));
        assert_eq!(periods[0].end_date, date(2025, 7, 31));
        assert_eq!(periods[12].start_date, date(2026, 7, 1));
        assert_eq!(periods[12].end_date, date(2026, 7, 14));
    }

    #[test]
    fn test_create_rejects_inverted_range() {
        let result = FiscalYear::create(
            Uuid::new_v4(),
            FiscalYearInput {
                name: "Bad".to_string(),
                start_date: date(2026, 12, 31),
                end_date: date(2026, 1, 1),
            },
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_periods_close_in_order() {
        let mut year = year();
        let feb = year.periods[1].id;
        let jan = year.periods[0].id;

        let err = year.close_period(feb, None).unwrap_err();
        assert!(err.to_string().contains("earlier periods"));

        year.close_period(jan, None).unwrap();
        year.close_period(feb, None).unwrap();
        assert!(!year.periods[1].is_open());
        assert!(year.periods[1].closed_at.is_some());

        let err = year.reopen_period(jan, None).unwrap_err();
        assert!(err.to_string().contains("later periods"));
        year.reopen_period(feb, None).unwrap();
        year.reopen_period(jan, None).unwrap();
        assert!(year.periods.iter().all(FiscalPeriod::is_open));
    }

    #[test]
    fn test_close_year_requires_closed_periods() {
        let mut year = year();
        assert!(year.close(None).is_err());
        let ids: Vec<Uuid> = year.periods.iter().map(|p| p.id).collect();
        for id in ids {
            year.close_period(id, None).unwrap();
        }
        year.close(None).unwrap();
        assert_eq!(year.status, FiscalStatus::Closed);
        let last = year.periods[11].id;
        assert!(year.reopen_period(last, None).is_err());
    }

    #[test]
    fn test_overlap_and_lookup() {
        let year = year();
        assert!(year.overlaps(date(2026, 12, 1), date(2027, 11, 30)));
        assert!(!year.overlaps(date(2027, 1, 1), date(2027, 12, 31)));
        let period = year.period_for(date(2026, 3, 15)).unwrap();
        assert_eq!(period.period_number, 3);
        assert!(period.ensure_accepts(date(2026, 3, 15)).is_ok());
        assert_eq!(
            period.ensure_accepts(date(2026, 4, 1)),
            Err(LedgerError::DateOutsidePeriod(date(2026, 4, 1)))
        );
    }
}
