//! Tenant and soft-delete scoping shared by every repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use tessera_core::DomainResult;
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::entities;
use crate::error::{RepoError, RepoResult};

/// A table whose rows belong to one tenant and are soft-deleted.
pub trait TenantScoped: EntityTrait {
    /// Human-readable entity name used in not-found errors.
    const LABEL: &'static str;

    /// The `tenant_id` column.
    fn tenant_column() -> Self::Column;

    /// The `id` column.
    fn id_column() -> Self::Column;

    /// The `is_deleted` column.
    fn deleted_column() -> Self::Column;

    /// The `created_at` column.
    fn created_column() -> Self::Column;

    /// Live rows of one tenant, newest first.
    fn scoped(tenant_id: Uuid) -> Select<Self> {
        Self::find()
            .filter(Self::tenant_column().eq(tenant_id))
            .filter(Self::deleted_column().eq(false))
            .order_by_desc(Self::created_column())
    }
}

macro_rules! tenant_scoped {
    ($($module:ident => $label:literal),+ $(,)?) => {
        $(
            impl TenantScoped for entities::$module::Entity {
                const LABEL: &'static str = $label;

                fn tenant_column() -> Self::Column {
                    entities::$module::Column::TenantId
                }

                fn id_column() -> Self::Column {
                    entities::$module::Column::Id
                }

                fn deleted_column() -> Self::Column {
                    entities::$module::Column::IsDeleted
                }

                fn created_column() -> Self::Column {
                    entities::$module::Column::CreatedAt
                }
            }
        )+
    };
}

tenant_scoped! {
    users => "user",
    roles => "role",
    queued_jobs => "job",
    accounts => "account",
    fiscal_years => "fiscal year",
    exchange_rates => "exchange rate",
    journal_entries => "journal entry",
    tax_rules => "tax rule",
    cheques => "cheque",
    credit_notes => "credit note",
    business_partners => "business partner",
    leads => "lead",
    opportunities => "opportunity",
    sales_quotes => "sales quote",
    sales_orders => "sales order",
    sales_invoices => "sales invoice",
    shipments => "shipment",
    sales_returns => "sales return",
    commission_rules => "commission rule",
    purchase_quotes => "purchase quote",
    purchase_orders => "purchase order",
    goods_receipts => "goods receipt",
    supplier_bills => "supplier bill",
    employees => "employee",
    leave_types => "leave type",
    leave_allocations => "leave allocation",
    leave_requests => "leave request",
    social_security_rates => "social security rate",
    payrolls => "payroll",
}

/// Loads one live row of the tenant.
pub async fn find_scoped<E, C>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<E::Model>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    E::scoped(tenant_id)
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(E::LABEL, id))
}

/// Loads one live row of the tenant with `SELECT ... FOR UPDATE`.
pub async fn lock_scoped<E, C>(db: &C, tenant_id: Uuid, id: Uuid) -> RepoResult<E::Model>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::tenant_column().eq(tenant_id))
        .filter(E::deleted_column().eq(false))
        .filter(E::id_column().eq(id))
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(E::LABEL, id))
}

/// Counts and fetches one page of a query.
pub async fn fetch_models<E, C>(
    db: &C,
    select: Select<E>,
    page: &PageRequest,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;
    let models = select
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok((models, total))
}

/// Fetches one page and converts every row into its domain type.
pub async fn fetch_page<E, D, C>(
    db: &C,
    select: Select<E>,
    page: &PageRequest,
) -> RepoResult<PageResponse<D>>
where
    E: EntityTrait,
    E::Model: Sync,
    D: TryFrom<E::Model, Error = DbErr>,
    C: ConnectionTrait,
{
    let (models, total) = fetch_models(db, select, page).await?;
    let data = models
        .into_iter()
        .map(D::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PageResponse::new(data, page, total))
}

/// Loads a record under a row lock, applies a domain method, and saves it.
///
/// The row is written only when `apply` succeeds, so a rejected transition
/// leaves the stored record unchanged.
pub async fn modify_scoped<E, D, F>(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    id: Uuid,
    apply: F,
) -> RepoResult<D>
where
    E: TenantScoped,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: Send + for<'r> From<&'r D>,
    D: TryFrom<E::Model, Error = DbErr> + Send,
    F: FnOnce(&mut D) -> DomainResult<()> + Send,
{
    let txn = db.begin().await?;
    let model = lock_scoped::<E, _>(&txn, tenant_id, id).await?;
    let mut record = D::try_from(model)?;
    apply(&mut record)?;
    E::ActiveModel::from(&record).update(&txn).await?;
    txn.commit().await?;
    Ok(record)
}

/// Inserts a new record.
pub async fn insert_record<E, D, C>(db: &C, record: &D) -> RepoResult<()>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: Send + for<'r> From<&'r D>,
    D: Sync,
    C: ConnectionTrait,
{
    E::ActiveModel::from(record).insert(db).await?;
    Ok(())
}
