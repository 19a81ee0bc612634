//! Audit columns carried by every tenant-scoped record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creation, modification, and soft-delete stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Who created the record.
    pub created_by: Option<Uuid>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
    /// Who last modified the record.
    pub updated_by: Option<Uuid>,
    /// When the record was soft-deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who soft-deleted the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<Uuid>,
    /// Soft-delete flag.
    #[serde(skip)]
    pub is_deleted: bool,
}

impl AuditInfo {
    /// Stamps a new record.
    #[must_use]
    pub fn new(actor: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
            deleted_at: None,
            deleted_by: None,
            is_deleted: false,
        }
    }

    /// Records a modification.
    pub fn touch(&mut self, actor: Option<Uuid>) {
        self.updated_at = Utc::now();
        self.updated_by = actor;
    }

    /// Marks the record as soft-deleted.
    pub fn mark_deleted(&mut self, actor: Option<Uuid>) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.deleted_by = actor;
        self.updated_at = now;
        self.updated_by = actor;
        self.is_deleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_creator() {
        let actor = Uuid::new_v4();
        let audit = AuditInfo::new(Some(actor));
        assert_eq!(audit.created_by, Some(actor));
        assert_eq!(audit.updated_by, Some(actor));
        assert!(!audit.is_deleted);
    }

    #[test]
    fn test_mark_deleted() {
        let mut audit = AuditInfo::new(None);
        let actor = Uuid::new_v4();
        audit.mark_deleted(Some(actor));
        assert!(audit.is_deleted);
        assert_eq!(audit.deleted_by, Some(actor));
        assert!(audit.deleted_at.is_some());
    }
}
