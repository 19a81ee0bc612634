//! Payroll run repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_core::hr::{
    EmployeeStatus, Payroll, PayrollEntry, PayrollEntryDetail, PayrollInput, PayrollLineKind, PayrollStatus,
};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{payroll_entries, payroll_entry_details, payrolls};
use crate::error::RepoResult;
use crate::repositories::employee::employees_in_status;
use crate::repositories::social_security::all_rates;
use crate::repositories::tax_rule::effective_tax_rules;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn payroll_from(model: payrolls::Model, entries: Vec<PayrollEntry>) -> Result<Payroll, DbErr> {
    Ok(Payroll {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        status: decode("payroll status", &model.status, PayrollStatus::parse)?,
        number: model.number,
        period_start: model.period_start,
        period_end: model.period_end,
        pay_date: model.pay_date,
        total_gross: model.total_gross,
        total_deductions: model.total_deductions,
        total_net: model.total_net,
        total_employer_cost: model.total_employer_cost,
        notes: model.notes,
        calculated_at: model.calculated_at,
        approved_at: model.approved_at,
        approved_by: model.approved_by,
        paid_at: model.paid_at,
        entries,
    })
}

impl From<&Payroll> for payrolls::ActiveModel {
    fn from(payroll: &Payroll) -> Self {
        let mut active = Self {
            id: Set(payroll.id),
            tenant_id: Set(payroll.tenant_id),
            number: Set(payroll.number.clone()),
            period_start: Set(payroll.period_start),
            period_end: Set(payroll.period_end),
            pay_date: Set(payroll.pay_date),
            status: Set(payroll.status.as_str().to_string()),
            total_gross: Set(payroll.total_gross),
            total_deductions: Set(payroll.total_deductions),
            total_net: Set(payroll.total_net),
            total_employer_cost: Set(payroll.total_employer_cost),
            notes: Set(payroll.notes.clone()),
            calculated_at: Set(payroll.calculated_at),
            approved_at: Set(payroll.approved_at),
            approved_by: Set(payroll.approved_by),
            paid_at: Set(payroll.paid_at),
            ..Default::default()
        };
        apply_audit!(active, &payroll.audit);
        active
    }
}

async fn load_entries<C: ConnectionTrait>(db: &C, payroll_id: Uuid) -> Result<Vec<PayrollEntry>, DbErr> {
    let entries = payroll_entries::Entity::find()
        .filter(payroll_entries::Column::PayrollId.eq(payroll_id))
        .all(db)
        .await?;
    let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    let mut details: HashMap<Uuid, Vec<PayrollEntryDetail>> = HashMap::new();
    if !ids.is_empty() {
        let rows = payroll_entry_details::Entity::find()
            .filter(payroll_entry_details::Column::PayrollEntryId.is_in(ids))
            .order_by_asc(payroll_entry_details::Column::LineNo)
            .all(db)
            .await?;
        for row in rows {
            let kind = decode("payroll line kind", &row.kind, PayrollLineKind::parse)?;
            details.entry(row.payroll_entry_id).or_default().push(PayrollEntryDetail {
                id: row.id,
                kind,
                code: row.code,
                description: row.description,
                amount: row.amount,
            });
        }
    }
    Ok(entries
        .into_iter()
        .map(|entry| PayrollEntry {
            details: details.remove(&entry.id).unwrap_or_default(),
            id: entry.id,
            employee_id: entry.employee_id,
            gross_pay: entry.gross_pay,
            total_deductions: entry.total_deductions,
            net_pay: entry.net_pay,
            employer_contribution: entry.employer_contribution,
        })
        .collect())
}

async fn store_entries<C: ConnectionTrait>(db: &C, payroll: &Payroll) -> Result<(), DbErr> {
    payroll_entries::Entity::delete_many()
        .filter(payroll_entries::Column::PayrollId.eq(payroll.id))
        .exec(db)
        .await?;
    if payroll.entries.is_empty() {
        return Ok(());
    }
    payroll_entries::Entity::insert_many(payroll.entries.iter().map(|entry| payroll_entries::ActiveModel {
        id: Set(entry.id),
        payroll_id: Set(payroll.id),
        employee_id: Set(entry.employee_id),
        gross_pay: Set(entry.gross_pay),
        total_deductions: Set(entry.total_deductions),
        net_pay: Set(entry.net_pay),
        employer_contribution: Set(entry.employer_contribution),
    }))
    .exec(db)
    .await?;

    let details: Vec<payroll_entry_details::ActiveModel> = payroll
        .entries
        .iter()
        .flat_map(|entry| {
            entry.details.iter().zip(1..).map(|(detail, line_no)| payroll_entry_details::ActiveModel {
                id: Set(detail.id),
                payroll_entry_id: Set(entry.id),
                line_no: Set(line_no),
                kind: Set(detail.kind.as_str().to_string()),
                code: Set(detail.code.clone()),
                description: Set(detail.description.clone()),
                amount: Set(detail.amount),
            })
        })
        .collect();
    if !details.is_empty() {
        payroll_entry_details::Entity::insert_many(details).exec(db).await?;
    }
    Ok(())
}

async fn lock_payroll<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<Payroll> {
    let model = lock_scoped::<payrolls::Entity, _>(db, tenant_id, id).await?;
    let entries = load_entries(db, id).await?;
    Ok(payroll_from(model, entries)?)
}

/// Payroll repository.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    db: DatabaseConnection,
}

impl PayrollRepository {
    /// Creates a new payroll repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft payroll run.
    pub async fn create(&self, tenant_id: Uuid, input: PayrollInput, actor: Option<Uuid>) -> RepoResult<Payroll> {
        let txn = self.db.begin().await?;
        let number = next_number(&txn, tenant_id, prefix::PAYROLL).await?;
        let payroll = Payroll::create(tenant_id, number, input, actor)?;
        payrolls::ActiveModel::from(&payroll).insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, payroll_id = %payroll.id, number = %payroll.number, "payroll created");
        Ok(payroll)
    }

    /// Loads a payroll run with entries and details.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Payroll> {
        let model = find_scoped::<payrolls::Entity, _>(&self.db, tenant_id, id).await?;
        let entries = load_entries(&self.db, id).await?;
        Ok(payroll_from(model, entries)?)
    }

    /// Lists payroll run headers without entries.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<PayrollStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Payroll>> {
        let mut select = payrolls::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(payrolls::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let data = models
            .into_iter()
            .map(|model| payroll_from(model, Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Computes entries for every active employee, replacing earlier ones.
    pub async fn calculate(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<Payroll> {
        let txn = self.db.begin().await?;
        let mut payroll = lock_payroll(&txn, tenant_id, id).await?;
        let employees = employees_in_status(&txn, tenant_id, EmployeeStatus::Active).await?;
        let rates = all_rates(&txn, tenant_id).await?;
        let tax_rules = effective_tax_rules(&txn, tenant_id, payroll.pay_date).await?;
        payroll.calculate(&employees, &rates, &tax_rules, actor)?;
        payrolls::ActiveModel::from(&payroll).update(&txn).await?;
        store_entries(&txn, &payroll).await?;
        txn.commit().await?;

        tracing::info!(
            %tenant_id,
            payroll_id = %payroll.id,
            entries = payroll.entries.len(),
            total_net = %payroll.total_net,
            "payroll calculated"
        );
        Ok(payroll)
    }

    /// Applies an approve, pay, or cancel transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<Payroll>
    where
        F: FnOnce(&mut Payroll) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut payroll = lock_payroll(&txn, tenant_id, id).await?;
        apply(&mut payroll)?;
        payrolls::ActiveModel::from(&payroll).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, payroll_id = %payroll.id, status = %payroll.status, "payroll status changed");
        Ok(payroll)
    }
}
