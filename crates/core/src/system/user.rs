//! Users belong to exactly one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::{DomainError, DomainResult};
use crate::guard;

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Login email, stored lower-case.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Argon2 PHC string.
    #[serde(skip)]
    pub password_hash: String,
    /// Inactive users cannot log in.
    pub is_active: bool,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Fields needed to create a user. The password is hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Pre-computed password hash.
    pub password_hash: String,
}

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email must be a valid address"));
    }
    Ok(email)
}

impl User {
    /// Creates a new active user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty name.
    pub fn create(tenant_id: Uuid, input: NewUser, actor: Option<Uuid>) -> DomainResult<Self> {
        if input.password_hash.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            email: normalize_email(&input.email)?,
            full_name: guard::required("full name", &input.full_name)?,
            password_hash: input.password_hash,
            is_active: true,
            last_login_at: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// Updates email and name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty name.
    pub fn update_profile(&mut self, profile: UserProfile, actor: Option<Uuid>) -> DomainResult<()> {
        let email = normalize_email(&profile.email)?;
        let full_name = guard::required("full name", &profile.full_name)?;
        self.email = email;
        self.full_name = full_name;
        self.audit.touch(actor);
        Ok(())
    }

    /// Replaces the password hash.
    pub fn set_password_hash(&mut self, password_hash: String, actor: Option<Uuid>) {
        self.password_hash = password_hash;
        self.audit.touch(actor);
    }

    /// Deactivates the user.
    pub fn deactivate(&mut self, actor: Option<Uuid>) {
        self.is_active = false;
        self.audit.touch(actor);
    }

    /// Reactivates the user.
    pub fn activate(&mut self, actor: Option<Uuid>) {
        self.is_active = true;
        self.audit.touch(actor);
    }

    /// Stamps a successful login.
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: "Ada Lovelace".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[test]
    fn test_create_lowercases_email() {
        let user = User::create(Uuid::new_v4(), new_user("  Ada@Example.COM "), None).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_create_rejects_bad_email() {
        assert!(User::create(Uuid::new_v4(), new_user("not-an-email"), None).is_err());
    }

    #[test]
    fn test_update_profile_is_atomic() {
        let mut user = User::create(Uuid::new_v4(), new_user("ada@example.com"), None).unwrap();
        let result = user.update_profile(
            UserProfile {
                email: "bad".to_string(),
                full_name: "Countess".to_string(),
            },
            None,
        );
        assert!(result.is_err());
        assert_eq!(user.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::create(Uuid::new_v4(), new_user("ada@example.com"), None).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["fullName"], "Ada Lovelace");
    }
}
