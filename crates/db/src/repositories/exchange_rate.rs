//! Exchange rate repository and document rate resolution.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tessera_core::finance::{ExchangeRate, ExchangeRateInput, LedgerError};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info};
use crate::entities::{exchange_rates, tenants};
use crate::error::{RepoError, RepoResult};
use crate::scope::{TenantScoped, fetch_page, insert_record};

impl TryFrom<exchange_rates::Model> for ExchangeRate {
    type Error = DbErr;

    fn try_from(model: exchange_rates::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            from_currency: model.from_currency,
            to_currency: model.to_currency,
            rate: model.rate,
            effective_date: model.effective_date,
        })
    }
}

impl From<&ExchangeRate> for exchange_rates::ActiveModel {
    fn from(rate: &ExchangeRate) -> Self {
        let mut active = Self {
            id: Set(rate.id),
            tenant_id: Set(rate.tenant_id),
            from_currency: Set(rate.from_currency.clone()),
            to_currency: Set(rate.to_currency.clone()),
            rate: Set(rate.rate),
            effective_date: Set(rate.effective_date),
            ..Default::default()
        };
        apply_audit!(active, &rate.audit);
        active
    }
}

/// Latest rate for a pair effective on or before `date`.
pub async fn latest_rate<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    from: &str,
    to: &str,
    date: NaiveDate,
) -> RepoResult<Option<ExchangeRate>> {
    let model = exchange_rates::Entity::find()
        .filter(exchange_rates::Column::TenantId.eq(tenant_id))
        .filter(exchange_rates::Column::IsDeleted.eq(false))
        .filter(exchange_rates::Column::FromCurrency.eq(from))
        .filter(exchange_rates::Column::ToCurrency.eq(to))
        .filter(exchange_rates::Column::EffectiveDate.lte(date))
        .order_by_desc(exchange_rates::Column::EffectiveDate)
        .one(db)
        .await?;
    Ok(model.map(ExchangeRate::try_from).transpose()?)
}

/// Resolves the currency and frozen rate of a new document.
///
/// Without a currency the tenant base currency is used at rate 1; a foreign
/// currency takes the latest rate to the base currency as of `date`.
pub async fn resolve_document_rate<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    currency: Option<&str>,
    date: NaiveDate,
) -> RepoResult<(String, Decimal)> {
    let tenant = tenants::Entity::find_by_id(tenant_id)
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found("tenant", tenant_id))?;
    let currency = currency
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| tenant.base_currency.clone());
    if currency == tenant.base_currency {
        return Ok((currency, Decimal::ONE));
    }
    let rate = latest_rate(db, tenant_id, &currency, &tenant.base_currency, date)
        .await?
        .ok_or_else(|| LedgerError::NoExchangeRate {
            from: currency.clone(),
            to: tenant.base_currency.clone(),
            date,
        })?;
    Ok((currency, rate.rate))
}

/// Exchange rate repository.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a rate.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: ExchangeRateInput,
        actor: Option<Uuid>,
    ) -> RepoResult<ExchangeRate> {
        let rate = ExchangeRate::create(tenant_id, input, actor)?;
        insert_record::<exchange_rates::Entity, _, _>(&self.db, &rate).await?;
        Ok(rate)
    }

    /// Lists rates, optionally for one pair.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        from: Option<&str>,
        to: Option<&str>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<ExchangeRate>> {
        let mut select = exchange_rates::Entity::scoped(tenant_id);
        if let Some(from) = from {
            select = select.filter(exchange_rates::Column::FromCurrency.eq(from.to_uppercase()));
        }
        if let Some(to) = to {
            select = select.filter(exchange_rates::Column::ToCurrency.eq(to.to_uppercase()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Latest rate for a pair as of `date`.
    pub async fn lookup(&self, tenant_id: Uuid, from: &str, to: &str, date: NaiveDate) -> RepoResult<ExchangeRate> {
        let (from, to) = (from.to_uppercase(), to.to_uppercase());
        latest_rate(&self.db, tenant_id, &from, &to, date)
            .await?
            .ok_or_else(|| LedgerError::NoExchangeRate { from, to, date }.into())
    }
}
