//! Journal entry repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tessera_core::finance::{JournalEntry, JournalEntryInput, JournalLine, JournalLineInput, JournalStatus};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{journal_entries, journal_lines};
use crate::error::RepoResult;
use crate::repositories::account::ensure_postable;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::fiscal::{period_by_id, period_for_date};
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn line_from(model: journal_lines::Model) -> JournalLine {
    JournalLine {
        id: model.id,
        line_no: model.line_no,
        account_id: model.account_id,
        description: model.description,
        debit: model.debit,
        credit: model.credit,
    }
}

fn line_active(entry_id: Uuid, line: &JournalLine) -> journal_lines::ActiveModel {
    journal_lines::ActiveModel {
        id: Set(line.id),
        journal_entry_id: Set(entry_id),
        line_no: Set(line.line_no),
        account_id: Set(line.account_id),
        description: Set(line.description.clone()),
        debit: Set(line.debit),
        credit: Set(line.credit),
    }
}

fn entry_from(model: journal_entries::Model, lines: Vec<JournalLine>) -> Result<JournalEntry, DbErr> {
    Ok(JournalEntry {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        status: decode("journal status", &model.status, JournalStatus::parse)?,
        number: model.number,
        entry_date: model.entry_date,
        fiscal_period_id: model.fiscal_period_id,
        description: model.description,
        reference: model.reference,
        currency: model.currency,
        exchange_rate: model.exchange_rate,
        total_debit: model.total_debit,
        total_credit: model.total_credit,
        posted_at: model.posted_at,
        posted_by: model.posted_by,
        voided_at: model.voided_at,
        voided_by: model.voided_by,
        void_reason: model.void_reason,
        reversal_of: model.reversal_of,
        lines,
    })
}

impl From<&JournalEntry> for journal_entries::ActiveModel {
    fn from(entry: &JournalEntry) -> Self {
        let mut active = Self {
            id: Set(entry.id),
            tenant_id: Set(entry.tenant_id),
            number: Set(entry.number.clone()),
            entry_date: Set(entry.entry_date),
            fiscal_period_id: Set(entry.fiscal_period_id),
            description: Set(entry.description.clone()),
            reference: Set(entry.reference.clone()),
            currency: Set(entry.currency.clone()),
            exchange_rate: Set(entry.exchange_rate),
            status: Set(entry.status.as_str().to_string()),
            total_debit: Set(entry.total_debit),
            total_credit: Set(entry.total_credit),
            posted_at: Set(entry.posted_at),
            posted_by: Set(entry.posted_by),
            voided_at: Set(entry.voided_at),
            voided_by: Set(entry.voided_by),
            void_reason: Set(entry.void_reason.clone()),
            reversal_of: Set(entry.reversal_of),
            ..Default::default()
        };
        apply_audit!(active, &entry.audit);
        active
    }
}

async fn load_lines<C: ConnectionTrait>(db: &C, entry_id: Uuid) -> Result<Vec<JournalLine>, DbErr> {
    let models = journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::LineNo)
        .all(db)
        .await?;
    Ok(models.into_iter().map(line_from).collect())
}

async fn insert_entry<C: ConnectionTrait>(db: &C, entry: &JournalEntry) -> Result<(), DbErr> {
    journal_entries::ActiveModel::from(entry).insert(db).await?;
    store_lines(db, entry).await
}

async fn store_lines<C: ConnectionTrait>(db: &C, entry: &JournalEntry) -> Result<(), DbErr> {
    journal_lines::Entity::delete_many()
        .filter(journal_lines::Column::JournalEntryId.eq(entry.id))
        .exec(db)
        .await?;
    if !entry.lines.is_empty() {
        journal_lines::Entity::insert_many(entry.lines.iter().map(|line| line_active(entry.id, line)))
            .exec(db)
            .await?;
    }
    Ok(())
}

fn account_ids(inputs: &[JournalLineInput]) -> Vec<Uuid> {
    inputs.iter().map(|line| line.account_id).collect()
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft entry in the open period containing its date.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: JournalEntryInput,
        actor: Option<Uuid>,
    ) -> RepoResult<JournalEntry> {
        let txn = self.db.begin().await?;
        ensure_postable(&txn, tenant_id, &account_ids(&input.lines)).await?;
        let period = period_for_date(&txn, tenant_id, input.entry_date).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.entry_date).await?;
        let number = next_number(&txn, tenant_id, prefix::JOURNAL_ENTRY).await?;
        let entry = JournalEntry::create(tenant_id, number, input, &period, currency, rate, actor)?;
        insert_entry(&txn, &entry).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, entry_id = %entry.id, number = %entry.number, "journal entry created");
        Ok(entry)
    }

    /// Loads an entry with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<JournalEntry> {
        let model = find_scoped::<journal_entries::Entity, _>(&self.db, tenant_id, id).await?;
        let lines = load_lines(&self.db, id).await?;
        Ok(entry_from(model, lines)?)
    }

    /// Lists entries, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<JournalStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<JournalEntry>> {
        let mut select = journal_entries::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(journal_entries::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut grouped: HashMap<Uuid, Vec<JournalLine>> = HashMap::new();
        if !ids.is_empty() {
            let lines = journal_lines::Entity::find()
                .filter(journal_lines::Column::JournalEntryId.is_in(ids))
                .order_by_asc(journal_lines::Column::LineNo)
                .all(&self.db)
                .await?;
            for line in lines {
                grouped.entry(line.journal_entry_id).or_default().push(line_from(line));
            }
        }
        let entries = models
            .into_iter()
            .map(|model| {
                let lines = grouped.remove(&model.id).unwrap_or_default();
                entry_from(model, lines)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(entries, page, total))
    }

    async fn lock<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<JournalEntry> {
        let model = lock_scoped::<journal_entries::Entity, _>(db, tenant_id, id).await?;
        let lines = load_lines(db, id).await?;
        Ok(entry_from(model, lines)?)
    }

    /// Replaces the lines of a draft.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<JournalLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<JournalEntry> {
        let txn = self.db.begin().await?;
        ensure_postable(&txn, tenant_id, &account_ids(&inputs)).await?;
        let mut entry = Self::lock(&txn, tenant_id, id).await?;
        entry.replace_lines(inputs, actor)?;
        journal_entries::ActiveModel::from(&entry).update(&txn).await?;
        store_lines(&txn, &entry).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Appends one line to a draft.
    pub async fn add_line(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: JournalLineInput,
        actor: Option<Uuid>,
    ) -> RepoResult<JournalEntry> {
        let txn = self.db.begin().await?;
        ensure_postable(&txn, tenant_id, &[input.account_id]).await?;
        let mut entry = Self::lock(&txn, tenant_id, id).await?;
        let line = entry.add_line(input, actor)?.clone();
        journal_entries::ActiveModel::from(&entry).update(&txn).await?;
        line_active(entry.id, &line).insert(&txn).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Posts a balanced draft.
    pub async fn post(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<JournalEntry> {
        let txn = self.db.begin().await?;
        let mut entry = Self::lock(&txn, tenant_id, id).await?;
        let accounts: Vec<Uuid> = entry.lines.iter().map(|l| l.account_id).collect();
        ensure_postable(&txn, tenant_id, &accounts).await?;
        let period = period_by_id(&txn, tenant_id, entry.fiscal_period_id).await?;
        entry.post(&period, actor)?;
        journal_entries::ActiveModel::from(&entry).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, entry_id = %entry.id, total = %entry.total_debit, "journal entry posted");
        Ok(entry)
    }

    /// Voids a posted entry, returning the voided entry and its reversal.
    pub async fn void(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        reason: &str,
        actor: Option<Uuid>,
    ) -> RepoResult<(JournalEntry, JournalEntry)> {
        let txn = self.db.begin().await?;
        let mut entry = Self::lock(&txn, tenant_id, id).await?;
        let period = period_by_id(&txn, tenant_id, entry.fiscal_period_id).await?;
        let number = next_number(&txn, tenant_id, prefix::JOURNAL_ENTRY).await?;
        let reversal = entry.void(reason, number, &period, actor)?;
        journal_entries::ActiveModel::from(&entry).update(&txn).await?;
        insert_entry(&txn, &reversal).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, entry_id = %entry.id, reversal_id = %reversal.id, "journal entry voided");
        Ok((entry, reversal))
    }

    /// Soft-deletes a draft.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let mut entry = Self::lock(&txn, tenant_id, id).await?;
        entry.delete(actor)?;
        journal_entries::ActiveModel::from(&entry).update(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}
