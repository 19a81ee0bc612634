//! Tenants own every other record in the system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

const MAX_CODE_LEN: usize = 32;

/// A tenant (company) using the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Unique identifier.
    pub id: Uuid,
    /// Short upper-case code used at login.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Base (functional) currency.
    pub base_currency: String,
    /// Inactive tenants cannot log in.
    pub is_active: bool,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or renaming a tenant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInput {
    /// Tenant code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Base currency.
    pub base_currency: String,
}

impl Tenant {
    /// Creates a new active tenant.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or overlong code, empty name,
    /// or malformed currency.
    pub fn create(input: TenantInput, actor: Option<Uuid>) -> DomainResult<Self> {
        let code = guard::code("code", &input.code)?;
        if code.len() > MAX_CODE_LEN {
            return Err(DomainError::validation(format!(
                "code must be at most {MAX_CODE_LEN} characters"
            )));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            code,
            name: guard::required("name", &input.name)?,
            base_currency: guard::currency(&input.base_currency)?,
            is_active: true,
            audit: AuditInfo::new(actor),
        })
    }

    /// Changes the display name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name.
    pub fn rename(&mut self, name: &str, actor: Option<Uuid>) -> DomainResult<()> {
        self.name = guard::required("name", name)?;
        self.audit.touch(actor);
        Ok(())
    }

    /// Deactivates the tenant.
    pub fn deactivate(&mut self, actor: Option<Uuid>) {
        self.is_active = false;
        self.audit.touch(actor);
    }

    /// Reactivates the tenant.
    pub fn activate(&mut self, actor: Option<Uuid>) {
        self.is_active = true;
        self.audit.touch(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(code: &str) -> TenantInput {
        TenantInput {
            code: code.to_string(),
            name: "Acme Trading".to_string(),
            base_currency: "idr".to_string(),
        }
    }

    #[test]
    fn test_create_normalizes() {
        let tenant = Tenant::create(input(" acme "), None).unwrap();
        assert_eq!(tenant.code, "ACME");
        assert_eq!(tenant.base_currency, "IDR");
        assert!(tenant.is_active);
    }

    #[test]
    fn test_create_rejects_bad_code() {
        assert!(Tenant::create(input(""), None).is_err());
        assert!(Tenant::create(input(&"X".repeat(33)), None).is_err());
    }

    #[test]
    fn test_rename_and_toggle() {
        let mut tenant = Tenant::create(input("acme"), None).unwrap();
        assert!(tenant.rename("  ", None).is_err());
        tenant.rename("Acme Group", None).unwrap();
        assert_eq!(tenant.name, "Acme Group");
        tenant.deactivate(None);
        assert!(!tenant.is_active);
        tenant.activate(None);
        assert!(tenant.is_active);
    }
}
