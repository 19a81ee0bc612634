//! Double-entry journal entries.
//!
//! Lifecycle:
//! - Draft → Posted (post, requires a balanced entry in an open period)
//! - Posted → Voided (void, creates a posted reversing entry)
//!
//! Only drafts may be edited or deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::finance::error::LedgerError;
use crate::finance::fiscal::FiscalPeriod;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

text_enum! {
    /// Journal entry status.
    JournalStatus {
        /// Editable, not yet in the ledger.
        Draft => "draft",
        /// Posted to the ledger (immutable).
        Posted => "posted",
        /// Reversed by a later entry (immutable).
        Voided => "voided",
    }
}

/// One debit or credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    /// Unique identifier.
    pub id: Uuid,
    /// 1-based position within the entry.
    pub line_no: i32,
    /// Account posted to.
    pub account_id: Uuid,
    /// Optional line memo.
    pub description: Option<String>,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
}

/// Input for a journal line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLineInput {
    /// Account posted to.
    pub account_id: Uuid,
    /// Optional line memo.
    pub description: Option<String>,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
}

impl JournalLine {
    fn build(line_no: i32, input: JournalLineInput) -> Result<Self, LedgerError> {
        let valid = input.debit >= Decimal::ZERO
            && input.credit >= Decimal::ZERO
            && ((input.debit > Decimal::ZERO) ^ (input.credit > Decimal::ZERO));
        if !valid {
            return Err(LedgerError::InvalidLineAmount(line_no));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            line_no,
            account_id: input.account_id,
            description: guard::optional(input.description),
            debit: input.debit,
            credit: input.credit,
        })
    }
}

/// A journal entry with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Document number (e.g. `JE-000001`).
    pub number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Period the entry belongs to.
    pub fiscal_period_id: Uuid,
    /// Narrative.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Transaction currency.
    pub currency: String,
    /// Rate to the tenant base currency, frozen at creation.
    pub exchange_rate: Decimal,
    /// Current status.
    pub status: JournalStatus,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// When posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted.
    pub posted_by: Option<Uuid>,
    /// When voided.
    pub voided_at: Option<DateTime<Utc>>,
    /// Who voided.
    pub voided_by: Option<Uuid>,
    /// Why voided.
    pub void_reason: Option<String>,
    /// Entry this one reverses.
    pub reversal_of: Option<Uuid>,
    /// Lines ordered by `line_no`.
    pub lines: Vec<JournalLine>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryInput {
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Transaction currency; defaults to the tenant base currency.
    pub currency: Option<String>,
    /// Initial lines.
    #[serde(default)]
    pub lines: Vec<JournalLineInput>,
}

/// Checks the double-entry rules for a set of lines.
///
/// # Errors
///
/// Returns `InsufficientLines`, `ZeroTotal`, or `Unbalanced`.
pub fn validate_balance(lines: &[JournalLine]) -> Result<(), LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }
    let (debit, credit) = totals(lines);
    if debit.is_zero() || credit.is_zero() {
        return Err(LedgerError::ZeroTotal);
    }
    if debit != credit {
        return Err(LedgerError::Unbalanced { debit, credit });
    }
    Ok(())
}

fn totals(lines: &[JournalLine]) -> (Decimal, Decimal) {
    lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
        (d + line.debit, c + line.credit)
    })
}

impl JournalEntry {
    const ENTITY: &'static str = "journal entry";

    /// Creates a draft entry in an open period.
    ///
    /// # Errors
    ///
    /// Fails if the period is closed or does not contain the entry date, the
    /// description is empty, the rate is not positive, or a line is invalid.
    pub fn create(
        tenant_id: Uuid,
        number: String,
        input: JournalEntryInput,
        period: &FiscalPeriod,
        currency: String,
        exchange_rate: Decimal,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        period.ensure_accepts(input.entry_date)?;
        if exchange_rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate.into());
        }
        let mut entry = Self {
            id: Uuid::now_v7(),
            tenant_id,
            number,
            entry_date: input.entry_date,
            fiscal_period_id: period.id,
            description: guard::required("description", &input.description)?,
            reference: guard::optional(input.reference),
            currency: guard::currency(&currency)?,
            exchange_rate,
            status: JournalStatus::Draft,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            posted_at: None,
            posted_by: None,
            voided_at: None,
            voided_by: None,
            void_reason: None,
            reversal_of: None,
            lines: Vec::new(),
            audit: AuditInfo::new(actor),
        };
        entry.set_lines(input.lines)?;
        Ok(entry)
    }

    fn set_lines(&mut self, inputs: Vec<JournalLineInput>) -> DomainResult<()> {
        let lines = inputs
            .into_iter()
            .zip(1..)
            .map(|(input, no)| JournalLine::build(no, input))
            .collect::<Result<Vec<_>, _>>()?;
        self.lines = lines;
        self.recompute_totals();
        Ok(())
    }

    fn recompute_totals(&mut self) {
        let (debit, credit) = totals(&self.lines);
        self.total_debit = debit;
        self.total_credit = credit;
    }

    /// Appends a line to a draft.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is a draft or if the line amounts are invalid.
    pub fn add_line(&mut self, input: JournalLineInput, actor: Option<Uuid>) -> DomainResult<&JournalLine> {
        ensure_status(Self::ENTITY, self.status, &[JournalStatus::Draft], "edit")?;
        let next_no = i32::try_from(self.lines.len() + 1)
            .map_err(|_| DomainError::invalid("too many lines"))?;
        let line = JournalLine::build(next_no, input)?;
        self.lines.push(line);
        self.recompute_totals();
        self.audit.touch(actor);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Replaces all lines of a draft.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is a draft or if any line is invalid.
    pub fn replace_lines(&mut self, inputs: Vec<JournalLineInput>, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JournalStatus::Draft], "edit")?;
        self.set_lines(inputs)?;
        self.audit.touch(actor);
        Ok(())
    }

    /// Posts a balanced draft.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is a draft with at least two lines, positive
    /// equal totals, and an open period. State is unchanged on failure.
    pub fn post(&mut self, period: &FiscalPeriod, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JournalStatus::Draft], "post")?;
        validate_balance(&self.lines)?;
        period.ensure_accepts(self.entry_date)?;
        let now = Utc::now();
        self.status = JournalStatus::Posted;
        self.posted_at = Some(now);
        self.posted_by = actor;
        self.audit.touch(actor);
        Ok(())
    }

    /// Voids a posted entry and returns the posted reversing entry.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is posted, the reason is non-empty, and the
    /// period still accepts postings.
    pub fn void(
        &mut self,
        reason: &str,
        reversal_number: String,
        period: &FiscalPeriod,
        actor: Option<Uuid>,
    ) -> DomainResult<Self> {
        ensure_status(Self::ENTITY, self.status, &[JournalStatus::Posted], "void")?;
        let reason = guard::required("void reason", reason)?;
        period.ensure_accepts(self.entry_date)?;

        let now = Utc::now();
        let reversal = Self {
            id: Uuid::now_v7(),
            tenant_id: self.tenant_id,
            number: reversal_number,
            entry_date: self.entry_date,
            fiscal_period_id: self.fiscal_period_id,
            description: format!("Reversal of {}: {reason}", self.number),
            reference: Some(self.number.clone()),
            currency: self.currency.clone(),
            exchange_rate: self.exchange_rate,
            status: JournalStatus::Posted,
            total_debit: self.total_credit,
            total_credit: self.total_debit,
            posted_at: Some(now),
            posted_by: actor,
            voided_at: None,
            voided_by: None,
            void_reason: None,
            reversal_of: Some(self.id),
            lines: self
                .lines
                .iter()
                .map(|line| JournalLine {
                    id: Uuid::now_v7(),
                    line_no: line.line_no,
                    account_id: line.account_id,
                    description: line.description.clone(),
                    debit: line.credit,
                    credit: line.debit,
                })
                .collect(),
            audit: AuditInfo::new(actor),
        };

        self.status = JournalStatus::Voided;
        self.voided_at = Some(now);
        self.voided_by = actor;
        self.void_reason = Some(reason);
        self.audit.touch(actor);
        Ok(reversal)
    }

    /// Soft-deletes a draft.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is a draft.
    pub fn delete(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JournalStatus::Draft], "delete")?;
        self.audit.mark_deleted(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fiscal::FiscalStatus;
    use rust_decimal_macros::dec;

    pub(super) fn period() -> FiscalPeriod {
        FiscalPeriod {
            id: Uuid::new_v4(),
            fiscal_year_id: Uuid::new_v4(),
            period_number: 1,
            name: "January 2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status: FiscalStatus::Open,
            closed_at: None,
            closed_by: None,
        }
    }

    pub(super) fn line(debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            description: None,
            debit,
            credit,
        }
    }

    pub(super) fn entry(lines: Vec<JournalLineInput>) -> JournalEntry {
        JournalEntry::create(
            Uuid::new_v4(),
            "JE-000001".to_string(),
            JournalEntryInput {
                entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                description: "Office rent".to_string(),
                reference: None,
                currency: None,
                lines,
            },
            &period(),
            "IDR".to_string(),
            Decimal::ONE,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_post_balanced_entry() {
        let mut je = entry(vec![line(dec!(500), dec!(0)), line(dec!(0), dec!(500))]);
        assert_eq!(je.total_debit, dec!(500));
        je.post(&period(), None).unwrap();
        assert_eq!(je.status, JournalStatus::Posted);
        assert!(je.posted_at.is_some());
    }

    #[test]
    fn test_post_unbalanced_entry_stays_draft() {
        let mut je = entry(vec![line(dec!(500), dec!(0)), line(dec!(0), dec!(400))]);
        let err = je.post(&period(), None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
        assert_eq!(je.status, JournalStatus::Draft);
        assert!(je.posted_at.is_none());
    }

    #[test]
    fn test_post_requires_two_lines_and_open_period() {
        let mut je = entry(vec![line(dec!(500), dec!(0))]);
        assert!(je.post(&period(), None).is_err());

        let mut je = entry(vec![line(dec!(5), dec!(0)), line(dec!(0), dec!(5))]);
        let mut closed = period();
        closed.status = FiscalStatus::Closed;
        assert!(je.post(&closed, None).is_err());
        assert_eq!(je.status, JournalStatus::Draft);
    }

    #[test]
    fn test_line_must_have_one_side() {
        let result = JournalEntry::create(
            Uuid::new_v4(),
            "JE-1".to_string(),
            JournalEntryInput {
                entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                description: "Bad".to_string(),
                reference: None,
                currency: None,
                lines: vec![line(dec!(5), dec!(5))],
            },
            &period(),
            "IDR".to_string(),
            Decimal::ONE,
            None,
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let mut je = entry(vec![]);
        assert!(je.add_line(line(dec!(0), dec!(0)), None).is_err());
        assert!(je.add_line(line(dec!(-1), dec!(0)), None).is_err());
    }

    #[test]
    fn test_create_rejects_date_outside_period() {
        let result = JournalEntry::create(
            Uuid::new_v4(),
            "JE-1".to_string(),
            JournalEntryInput {
                entry_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                description: "Late".to_string(),
                reference: None,
                currency: None,
                lines: vec![],
            },
            &period(),
            "IDR".to_string(),
            Decimal::ONE,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_line_only_in_draft() {
        let mut je = entry(vec![line(dec!(10), dec!(0))]);
        let added = je.add_line(line(dec!(0), dec!(10)), None).unwrap();
        assert_eq!(added.line_no, 2);
        je.post(&period(), None).unwrap();
        assert!(je.add_line(line(dec!(1), dec!(0)), None).is_err());
        assert!(je.replace_lines(vec![], None).is_err());
        assert!(je.delete(None).is_err());
    }

    #[test]
    fn test_void_creates_reversal() {
        let mut je = entry(vec![line(dec!(75), dec!(0)), line(dec!(0), dec!(75))]);
        assert!(je.void("oops", "JE-000002".to_string(), &period(), None).is_err());
        je.post(&period(), None).unwrap();
        assert!(je.void("  ", "JE-000002".to_string(), &period(), None).is_err());

        let reversal = je.void("Duplicate", "JE-000002".to_string(), &period(), None).unwrap();
        assert_eq!(je.status, JournalStatus::Voided);
        assert_eq!(je.void_reason.as_deref(), Some("Duplicate"));
        assert_eq!(reversal.status, JournalStatus::Posted);
        assert_eq!(reversal.reversal_of, Some(je.id));
        assert_eq!(reversal.lines[0].credit, dec!(75));
        assert_eq!(reversal.lines[1].debit, dec!(75));
        assert!(validate_balance(&reversal.lines).is_ok());
    }

    #[test]
    fn test_delete_draft() {
        let mut je = entry(vec![]);
        je.delete(None).unwrap();
        assert!(je.audit.is_deleted);
    }
}

#[cfg(test)]
mod props {
    use super::tests::{entry, line, period};
    use super::*;
    use proptest::prelude::*;

    fn amount() -> impl Strategy<Value = Decimal> {
        (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Posting succeeds exactly when debits equal credits.
        #[test]
        fn prop_post_iff_balanced(
            debits in prop::collection::vec(amount(), 1..5),
            credits in prop::collection::vec(amount(), 1..5),
        ) {
            let mut lines: Vec<JournalLineInput> = debits.iter().map(|d| line(*d, Decimal::ZERO)).collect();
            lines.extend(credits.iter().map(|c| line(Decimal::ZERO, *c)));
            let balanced = debits.iter().sum::<Decimal>() == credits.iter().sum::<Decimal>();

            let mut je = entry(lines);
            let result = je.post(&period(), None);

            prop_assert_eq!(result.is_ok(), balanced);
            if balanced {
                prop_assert_eq!(je.status, JournalStatus::Posted);
            } else {
                prop_assert_eq!(je.status, JournalStatus::Draft);
            }
        }

        /// A balanced pair always posts and its reversal is balanced too.
        #[test]
        fn prop_reversal_mirrors_entry(value in amount()) {
            let mut je = entry(vec![line(value, Decimal::ZERO), line(Decimal::ZERO, value)]);
            je.post(&period(), None).unwrap();
            let reversal = je.void("reason", "JE-2".to_string(), &period(), None).unwrap();
            prop_assert_eq!(reversal.total_debit, je.total_credit);
            prop_assert_eq!(reversal.total_credit, je.total_debit);
        }
    }
}
