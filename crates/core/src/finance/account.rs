//! Chart of accounts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;
use crate::macros::text_enum;

text_enum! {
    /// Account classification.
    AccountType {
        /// Resources owned.
        Asset => "asset",
        /// Obligations owed.
        Liability => "liability",
        /// Owner's interest.
        Equity => "equity",
        /// Income earned.
        Revenue => "revenue",
        /// Costs incurred.
        Expense => "expense",
    }
}

impl AccountType {
    /// Returns true for debit-normal accounts (asset, expense).
    #[must_use]
    pub const fn is_debit_normal(&self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }
}

/// A ledger account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Account code, upper-case and unique per tenant.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Parent account for hierarchy.
    pub parent_id: Option<Uuid>,
    /// Inactive accounts cannot receive postings.
    pub is_active: bool,
    /// Header accounts do not accept postings.
    pub allow_posting: bool,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Parent account.
    pub parent_id: Option<Uuid>,
    /// Whether lines may post directly to the account.
    #[serde(default = "default_allow_posting")]
    pub allow_posting: bool,
}

fn default_allow_posting() -> bool {
    true
}

impl Account {
    /// Creates a new active account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty code or name.
    pub fn create(tenant_id: Uuid, input: AccountInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let id = Uuid::now_v7();
        if input.parent_id == Some(id) {
            return Err(DomainError::validation("account cannot be its own parent"));
        }
        Ok(Self {
            id,
            tenant_id,
            code: guard::code("code", &input.code)?,
            name: guard::required("name", &input.name)?,
            account_type: input.account_type,
            parent_id: input.parent_id,
            is_active: true,
            allow_posting: input.allow_posting,
            audit: AuditInfo::new(actor),
        })
    }

    /// Updates the account fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty code or name, or a self-parent.
    pub fn update(&mut self, input: AccountInput, actor: Option<Uuid>) -> DomainResult<()> {
        if input.parent_id == Some(self.id) {
            return Err(DomainError::validation("account cannot be its own parent"));
        }
        let code = guard::code("code", &input.code)?;
        let name = guard::required("name", &input.name)?;
        self.code = code;
        self.name = name;
        self.account_type = input.account_type;
        self.parent_id = input.parent_id;
        self.allow_posting = input.allow_posting;
        self.audit.touch(actor);
        Ok(())
    }

    /// Deactivates the account.
    pub fn deactivate(&mut self, actor: Option<Uuid>) {
        self.is_active = false;
        self.audit.touch(actor);
    }

    /// Fails unless journal lines may post to this account.
    ///
    /// # Errors
    ///
    /// Returns an invalid-operation error for inactive or header accounts.
    pub fn ensure_postable(&self) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::invalid(format!("Account {} is inactive", self.code)));
        }
        if !self.allow_posting {
            return Err(DomainError::invalid(format!(
                "Account {} does not allow direct posting",
                self.code
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AccountInput {
        AccountInput {
            code: "1100-cash".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            parent_id: None,
            allow_posting: true,
        }
    }

    #[test]
    fn test_create_uppercases_code() {
        let account = Account::create(Uuid::new_v4(), input(), None).unwrap();
        assert_eq!(account.code, "1100-CASH");
        assert!(account.account_type.is_debit_normal());
        assert!(account.ensure_postable().is_ok());
    }

    #[test]
    fn test_deactivated_account_not_postable() {
        let mut account = Account::create(Uuid::new_v4(), input(), None).unwrap();
        account.deactivate(None);
        assert!(account.ensure_postable().is_err());
    }

    #[test]
    fn test_update_rejects_self_parent() {
        let mut account = Account::create(Uuid::new_v4(), input(), None).unwrap();
        let mut update = input();
        update.parent_id = Some(account.id);
        assert!(account.update(update, None).is_err());
    }

    #[test]
    fn test_normal_balance() {
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
    }
}
