//! Sales quote repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, QueryFilter, Set,
    TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_core::document::{DocumentLine, DocumentLineInput};
use tessera_core::sales::{QuoteStatus, SalesOrder, SalesQuote, SalesQuoteInput};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, apply_pricing, audit_info, decode, document_pricing};
use crate::entities::sales_quotes;
use crate::error::RepoResult;
use crate::repositories::exchange_rate::resolve_document_rate;
use crate::repositories::lines::{doc_type, sales_lines};
use crate::repositories::partner::active_customer;
use crate::repositories::sales_order::insert_order;
use crate::scope::{TenantScoped, fetch_models, find_scoped, lock_scoped};
use crate::sequence::{next_number, prefix};

fn quote_from(model: sales_quotes::Model, lines: Vec<DocumentLine>) -> Result<SalesQuote, DbErr> {
    Ok(SalesQuote {
        id: model.id,
        tenant_id: model.tenant_id,
        audit: audit_info!(model),
        pricing: document_pricing!(model),
        status: decode("quote status", &model.status, QuoteStatus::parse)?,
        number: model.number,
        partner_id: model.partner_id,
        quote_date: model.quote_date,
        valid_until: model.valid_until,
        notes: model.notes,
        converted_order_id: model.converted_order_id,
        lines,
    })
}

impl From<&SalesQuote> for sales_quotes::ActiveModel {
    fn from(quote: &SalesQuote) -> Self {
        let mut active = Self {
            id: Set(quote.id),
            tenant_id: Set(quote.tenant_id),
            number: Set(quote.number.clone()),
            partner_id: Set(quote.partner_id),
            quote_date: Set(quote.quote_date),
            valid_until: Set(quote.valid_until),
            status: Set(quote.status.as_str().to_string()),
            notes: Set(quote.notes.clone()),
            converted_order_id: Set(quote.converted_order_id),
            ..Default::default()
        };
        apply_pricing!(active, &quote.pricing);
        apply_audit!(active, &quote.audit);
        active
    }
}

async fn load_quote<C: ConnectionTrait>(db: &C, tenant_id: Uuid, id: Uuid, lock: bool) -> RepoResult<SalesQuote> {
    let model = if lock {
        lock_scoped::<sales_quotes::Entity, _>(db, tenant_id, id).await?
    } else {
        find_scoped::<sales_quotes::Entity, _>(db, tenant_id, id).await?
    };
    let lines = sales_lines::load(db, doc_type::SALES_QUOTE, id).await?;
    Ok(quote_from(model, lines)?)
}

/// Sales quote repository.
#[derive(Debug, Clone)]
pub struct SalesQuoteRepository {
    db: DatabaseConnection,
}

impl SalesQuoteRepository {
    /// Creates a new sales quote repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft quote for a customer.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: SalesQuoteInput,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesQuote> {
        let txn = self.db.begin().await?;
        active_customer(&txn, tenant_id, input.partner_id).await?;
        let (currency, rate) =
            resolve_document_rate(&txn, tenant_id, input.currency.as_deref(), input.quote_date).await?;
        let number = next_number(&txn, tenant_id, prefix::SALES_QUOTE).await?;
        let quote = SalesQuote::create(tenant_id, number, input, &currency, rate, actor)?;
        sales_quotes::ActiveModel::from(&quote).insert(&txn).await?;
        sales_lines::replace(&txn, doc_type::SALES_QUOTE, quote.id, &quote.lines).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, quote_id = %quote.id, number = %quote.number, "sales quote created");
        Ok(quote)
    }

    /// Loads a quote with its lines.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<SalesQuote> {
        load_quote(&self.db, tenant_id, id, false).await
    }

    /// Lists quotes, optionally in one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<QuoteStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<SalesQuote>> {
        let mut select = sales_quotes::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(sales_quotes::Column::Status.eq(status.as_str()));
        }
        let (models, total) = fetch_models(&self.db, select, page).await?;
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines = sales_lines::load_many(&self.db, doc_type::SALES_QUOTE, &ids).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let own = lines.remove(&model.id).unwrap_or_default();
                quote_from(model, own)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page, total))
    }

    /// Replaces the lines of a draft quote.
    pub async fn replace_lines(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        inputs: Vec<DocumentLineInput>,
        actor: Option<Uuid>,
    ) -> RepoResult<SalesQuote> {
        let txn = self.db.begin().await?;
        let mut quote = load_quote(&txn, tenant_id, id, true).await?;
        quote.replace_lines(inputs, actor)?;
        sales_quotes::ActiveModel::from(&quote).update(&txn).await?;
        sales_lines::replace(&txn, doc_type::SALES_QUOTE, quote.id, &quote.lines).await?;
        txn.commit().await?;
        Ok(quote)
    }

    /// Applies a status transition under a row lock.
    pub async fn transition<F>(&self, tenant_id: Uuid, id: Uuid, apply: F) -> RepoResult<SalesQuote>
    where
        F: FnOnce(&mut SalesQuote) -> DomainResult<()> + Send,
    {
        let txn = self.db.begin().await?;
        let mut quote = load_quote(&txn, tenant_id, id, true).await?;
        apply(&mut quote)?;
        sales_quotes::ActiveModel::from(&quote).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, quote_id = %quote.id, status = %quote.status, "sales quote status changed");
        Ok(quote)
    }

    /// Converts an accepted quote into a draft order in one transaction.
    pub async fn convert(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        order_date: NaiveDate,
        actor: Option<Uuid>,
    ) -> RepoResult<(SalesQuote, SalesOrder)> {
        let txn = self.db.begin().await?;
        let mut quote = load_quote(&txn, tenant_id, id, true).await?;
        let number = next_number(&txn, tenant_id, prefix::SALES_ORDER).await?;
        let order = quote.convert(number, order_date, actor)?;
        sales_quotes::ActiveModel::from(&quote).update(&txn).await?;
        insert_order(&txn, &order).await?;
        txn.commit().await?;

        tracing::info!(%tenant_id, quote_id = %quote.id, order_id = %order.id, "sales quote converted");
        Ok((quote, order))
    }
}
