//! Fiscal year and period repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tessera_core::finance::{FiscalPeriod, FiscalStatus, FiscalYear, FiscalYearInput, LedgerError};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::{fiscal_periods, fiscal_years};
use crate::error::{RepoError, RepoResult};
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};

impl TryFrom<fiscal_periods::Model> for FiscalPeriod {
    type Error = DbErr;

    fn try_from(model: fiscal_periods::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            fiscal_year_id: model.fiscal_year_id,
            period_number: model.period_number,
            status: decode("fiscal status", &model.status, FiscalStatus::parse)?,
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            closed_at: model.closed_at,
            closed_by: model.closed_by,
        })
    }
}

fn period_active(tenant_id: Uuid, period: &FiscalPeriod) -> fiscal_periods::ActiveModel {
    fiscal_periods::ActiveModel {
        id: Set(period.id),
        tenant_id: Set(tenant_id),
        fiscal_year_id: Set(period.fiscal_year_id),
        period_number: Set(period.period_number),
        name: Set(period.name.clone()),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        status: Set(period.status.as_str().to_string()),
        closed_at: Set(period.closed_at),
        closed_by: Set(period.closed_by),
    }
}

fn year_from(model: fiscal_years::Model, periods: Vec<fiscal_periods::Model>) -> Result<FiscalYear, DbErr> {
    Ok(FiscalYear {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        status: decode("fiscal status", &model.status, FiscalStatus::parse)?,
        name: model.name,
        start_date: model.start_date,
        end_date: model.end_date,
        periods: periods
            .into_iter()
            .map(FiscalPeriod::try_from)
            .collect::<Result<_, _>>()?,
    })
}

impl From<&FiscalYear> for fiscal_years::ActiveModel {
    fn from(year: &FiscalYear) -> Self {
        let mut active = Self {
            id: Set(year.id),
            tenant_id: Set(year.tenant_id),
            name: Set(year.name.clone()),
            start_date: Set(year.start_date),
            end_date: Set(year.end_date),
            status: Set(year.status.as_str().to_string()),
            ..Default::default()
        };
        apply_audit!(active, &year.audit);
        active
    }
}

async fn load_periods<C: ConnectionTrait>(db: &C, year_id: Uuid) -> Result<Vec<fiscal_periods::Model>, DbErr> {
    fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::FiscalYearId.eq(year_id))
        .order_by_asc(fiscal_periods::Column::PeriodNumber)
        .all(db)
        .await
}

/// Loads the period containing `date`, locked against concurrent closing.
///
/// # Errors
///
/// Fails with `DateOutsidePeriod` when no period of the tenant covers the date.
pub async fn period_for_date<C: ConnectionTrait>(db: &C, tenant_id: Uuid, date: NaiveDate) -> RepoResult<FiscalPeriod> {
    let model = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::TenantId.eq(tenant_id))
        .filter(fiscal_periods::Column::StartDate.lte(date))
        .filter(fiscal_periods::Column::EndDate.gte(date))
        .lock_shared()
        .one(db)
        .await?
        .ok_or(LedgerError::DateOutsidePeriod(date))?;
    Ok(model.try_into()?)
}

/// Loads a period by id, locked against concurrent closing.
pub async fn period_by_id<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<FiscalPeriod> {
    let model = fiscal_periods::Entity::find_by_id(id)
        .filter(fiscal_periods::Column::TenantId.eq(tenant_id))
        .lock_shared()
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found("fiscal period", id))?;
    Ok(model.try_into()?)
}

/// Fiscal year repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a fiscal year with its monthly periods.
    ///
    /// Fails with `OverlappingFiscalYear` when the range intersects another
    /// year of the tenant.
    pub async fn create(&self, tenant_id: Uuid, input: FiscalYearInput, actor: Option<Uuid>) -> RepoResult<FiscalYear> {
        let year = FiscalYear::create(tenant_id, input, actor)?;

        let txn = self.db.begin().await?;
        let overlapping = fiscal_years::Entity::scoped(tenant_id)
            .filter(fiscal_years::Column::StartDate.lte(year.end_date))
            .filter(fiscal_years::Column::EndDate.gte(year.start_date))
            .lock_exclusive()
            .one(&txn)
            .await?;
        if overlapping.is_some() {
            return Err(LedgerError::OverlappingFiscalYear.into());
        }

        fiscal_years::ActiveModel::from(&year).insert(&txn).await?;
        fiscal_periods::Entity::insert_many(year.periods.iter().map(|p| period_active(tenant_id, p)))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, fiscal_year_id = %year.id, periods = year.periods.len(), "fiscal year created");
        Ok(year)
    }

    /// Loads a year with its periods.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<FiscalYear> {
        let model = find_scoped::<fiscal_years::Entity, _>(&self.db, tenant_id, id).await?;
        let periods = load_periods(&self.db, model.id).await?;
        Ok(year_from(model, periods)?)
    }

    /// Lists years with their periods, newest first.
    pub async fn list(&self, tenant_id: Uuid, page: &PageRequest) -> RepoResult<PageResponse<FiscalYear>> {
        let (models, total) = fetch_models(&self.db, fiscal_years::Entity::scoped(tenant_id), page).await?;
        let mut years = Vec::with_capacity(models.len());
        for model in models {
            let periods = load_periods(&self.db, model.id).await?;
            years.push(year_from(model, periods)?);
        }
        Ok(PageResponse::new(years, page, total))
    }

    async fn modify<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<FiscalYear>
    where
        F: FnOnce(&mut FiscalYear) -> RepoResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let model = lock_scoped::<fiscal_years::Entity, _>(&txn, tenant_id, id).await?;
        let periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(id))
            .order_by_asc(fiscal_periods::Column::PeriodNumber)
            .lock_exclusive()
            .all(&txn)
            .await?;
        let mut year = year_from(model, periods)?;
        apply(&mut year)?;

        fiscal_years::ActiveModel::from(&year).update(&txn).await?;
        for period in &year.periods {
            period_active(tenant_id, period).update(&txn).await?;
        }
        txn.commit().await?;
        Ok(year)
    }

    /// Closes one period of a year.
    pub async fn close_period(
        &self,
        tenant_id: Uuid,
        year_id: Uuid,
        period_id: Uuid,
        actor: Option<Uuid>,
    ) -> RepoResult<FiscalYear> {
        let year = self
            .modify(tenant_id, year_id, |year| {
                year.close_period(period_id, actor)?;
                Ok(())
            })
            .await?;
        tracing::info!(%tenant_id, %year_id, %period_id, "fiscal period closed");
        Ok(year)
    }

    /// Reopens one period of a year.
    pub async fn reopen_period(
        &self,
        tenant_id: Uuid,
        year_id: Uuid,
        period_id: Uuid,
        actor: Option<Uuid>,
    ) -> RepoResult<FiscalYear> {
        let year = self
            .modify(tenant_id, year_id, |year| {
                year.reopen_period(period_id, actor)?;
                Ok(())
            })
            .await?;
        tracing::info!(%tenant_id, %year_id, %period_id, "fiscal period reopened");
        Ok(year)
    }

    /// Closes a year whose periods are all closed.
    pub async fn close(&self, tenant_id: Uuid, year_id: Uuid, actor: Option<Uuid>) -> RepoResult<FiscalYear> {
        let year = self
            .modify(tenant_id, year_id, |year| Ok(year.close(actor)?))
            .await?;
        tracing::info!(%tenant_id, %year_id, "fiscal year closed");
        Ok(year)
    }
}
