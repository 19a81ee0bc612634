//! Roles group permissions and are assigned to users.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// A named set of permissions within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Role name, unique per tenant.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// System roles are seeded and cannot be renamed or deleted.
    pub is_system: bool,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for creating or updating a role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    /// Role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl Role {
    /// Creates a tenant-defined role.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name.
    pub fn create(tenant_id: Uuid, input: RoleInput, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            name: guard::required("name", &input.name)?,
            description: guard::optional(input.description),
            is_system: false,
            audit: AuditInfo::new(actor),
        })
    }

    /// Creates a seeded system role.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name.
    pub fn system(tenant_id: Uuid, name: &str, description: &str) -> DomainResult<Self> {
        let mut role = Self::create(
            tenant_id,
            RoleInput {
                name: name.to_string(),
                description: Some(description.to_string()),
            },
            None,
        )?;
        role.is_system = true;
        Ok(role)
    }

    /// Updates name and description.
    ///
    /// # Errors
    ///
    /// Fails for system roles or an empty name.
    pub fn update(&mut self, input: RoleInput, actor: Option<Uuid>) -> DomainResult<()> {
        if self.is_system && input.name.trim() != self.name {
            return Err(DomainError::invalid("System roles cannot be renamed"));
        }
        self.name = guard::required("name", &input.name)?;
        self.description = guard::optional(input.description);
        self.audit.touch(actor);
        Ok(())
    }

    /// Soft-deletes the role.
    ///
    /// # Errors
    ///
    /// Fails for system roles.
    pub fn delete(&mut self, actor: Option<Uuid>) -> DomainResult<()> {
        if self.is_system {
            return Err(DomainError::invalid("System roles cannot be deleted"));
        }
        self.audit.mark_deleted(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_is_protected() {
        let mut role = Role::system(Uuid::new_v4(), "admin", "Full access").unwrap();
        assert!(role.is_system);
        assert!(role.delete(None).is_err());
        let rename = RoleInput {
            name: "root".to_string(),
            description: None,
        };
        assert!(role.update(rename, None).is_err());
        let same_name = RoleInput {
            name: "admin".to_string(),
            description: Some("Everything".to_string()),
        };
        role.update(same_name, None).unwrap();
        assert_eq!(role.description.as_deref(), Some("Everything"));
    }

    #[test]
    fn test_custom_role_can_be_deleted() {
        let mut role = Role::create(
            Uuid::new_v4(),
            RoleInput {
                name: "clerk".to_string(),
                description: Some("  ".to_string()),
            },
            None,
        )
        .unwrap();
        assert!(role.description.is_none());
        role.delete(None).unwrap();
        assert!(role.audit.is_deleted);
    }
}
