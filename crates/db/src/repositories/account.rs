//! Chart of accounts repository.

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tessera_core::DomainError;
use tessera_core::finance::{Account, AccountInput, AccountType};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::accounts;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<accounts::Model> for Account {
    type Error = DbErr;

    fn try_from(model: accounts::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            account_type: decode("account type", &model.account_type, AccountType::parse)?,
            code: model.code,
            name: model.name,
            parent_id: model.parent_id,
            is_active: model.is_active,
            allow_posting: model.allow_posting,
        })
    }
}

impl From<&Account> for accounts::ActiveModel {
    fn from(account: &Account) -> Self {
        let mut active = Self {
            id: Set(account.id),
            tenant_id: Set(account.tenant_id),
            code: Set(account.code.clone()),
            name: Set(account.name.clone()),
            account_type: Set(account.account_type.as_str().to_string()),
            parent_id: Set(account.parent_id),
            is_active: Set(account.is_active),
            allow_posting: Set(account.allow_posting),
            ..Default::default()
        };
        apply_audit!(active, &account.audit);
        active
    }
}

/// Loads the tenant's accounts referenced by journal lines.
///
/// # Errors
///
/// Fails with a validation error when an id is not a live account of the
/// tenant, and with the account's own error when it cannot take postings.
pub async fn ensure_postable<C: ConnectionTrait>(db: &C, tenant_id: Uuid, account_ids: &[Uuid]) -> RepoResult<()> {
    let mut wanted = account_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    let models = accounts::Entity::scoped(tenant_id)
        .filter(accounts::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?;
    if let Some(missing) = wanted.iter().find(|id| !models.iter().any(|m| m.id == **id)) {
        return Err(DomainError::validation(format!("Account {missing} does not exist")).into());
    }
    for model in models {
        Account::try_from(model)?.ensure_postable()?;
    }
    Ok(())
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_parent(&self, tenant_id: Uuid, parent_id: Option<Uuid>) -> RepoResult<()> {
        if let Some(parent_id) = parent_id {
            find_scoped::<accounts::Entity, _>(&self.db, tenant_id, parent_id).await?;
        }
        Ok(())
    }

    /// Creates an account.
    pub async fn create(&self, tenant_id: Uuid, input: AccountInput, actor: Option<Uuid>) -> RepoResult<Account> {
        self.ensure_parent(tenant_id, input.parent_id).await?;
        let account = Account::create(tenant_id, input, actor)?;
        insert_record::<accounts::Entity, _, _>(&self.db, &account).await?;
        tracing::info!(%tenant_id, account_id = %account.id, code = %account.code, "account created");
        Ok(account)
    }

    /// Loads an account.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<Account> {
        Ok(find_scoped::<accounts::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists accounts, optionally of one type.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        account_type: Option<AccountType>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<Account>> {
        let mut select = accounts::Entity::scoped(tenant_id);
        if let Some(account_type) = account_type {
            select = select.filter(accounts::Column::AccountType.eq(account_type.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Updates an account.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: AccountInput,
        actor: Option<Uuid>,
    ) -> RepoResult<Account> {
        if input.parent_id == Some(id) {
            return Err(DomainError::validation("An account cannot be its own parent").into());
        }
        self.ensure_parent(tenant_id, input.parent_id).await?;
        modify_scoped::<accounts::Entity, _, _>(&self.db, tenant_id, id, |account| account.update(input, actor)).await
    }

    /// Deactivates an account.
    pub async fn deactivate(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<Account> {
        modify_scoped::<accounts::Entity, _, _>(&self.db, tenant_id, id, |account| {
            account.deactivate(actor);
            Ok(())
        })
        .await
    }
}
