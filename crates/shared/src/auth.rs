//! Authentication types for JWT claims and auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission that grants every other permission.
pub const WILDCARD_PERMISSION: &str = "*";

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User email.
    pub email: String,
    /// Tenant the user belongs to.
    pub tenant_id: Uuid,
    /// Role names assigned to the user.
    pub roles: Vec<String>,
    /// Effective permission codes (union over roles).
    pub permissions: Vec<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Identity data baked into an access token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    /// User ID.
    pub user_id: Uuid,
    /// User email.
    pub email: String,
    /// Tenant ID.
    pub tenant_id: Uuid,
    /// Role names.
    pub roles: Vec<String>,
    /// Permission codes.
    pub permissions: Vec<String>,
}

impl Claims {
    /// Creates new claims for a subject.
    #[must_use]
    pub fn new(subject: TokenSubject, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.user_id,
            email: subject.email,
            tenant_id: subject.tenant_id,
            roles: subject.roles,
            permissions: subject.permissions,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns true if any granted permission covers `required`.
    #[must_use]
    pub fn has_permission(&self, required: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_grants(granted, required))
    }
}

/// Checks whether a granted permission code covers a required one.
///
/// `*` covers everything, `finance.*` covers every `finance.` code,
/// anything else must match exactly.
#[must_use]
pub fn permission_grants(granted: &str, required: &str) -> bool {
    if granted == WILDCARD_PERMISSION || granted == required {
        return true;
    }
    granted
        .strip_suffix('*')
        .is_some_and(|prefix| prefix.ends_with('.') && required.starts_with(prefix))
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Tenant code the user belongs to.
    pub tenant_code: String,
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Token response returned after login or refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Access token (short-lived JWT).
    pub access_token: String,
    /// Opaque refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
    /// Authenticated user info.
    pub user: UserInfo,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// Tenant ID.
    pub tenant_id: Uuid,
    /// Role names.
    pub roles: Vec<String>,
    /// Permission codes.
    pub permissions: Vec<String>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// The refresh token to invalidate.
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn subject(permissions: &[&str]) -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            tenant_id: Uuid::new_v4(),
            roles: vec!["accountant".to_string()],
            permissions: permissions.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let subject = subject(&["finance.journal_entries.read"]);
        let user_id = subject.user_id;
        let tenant_id = subject.tenant_id;
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(subject, expires_at);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tenant_id, tenant_id);
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tenant_id, tenant_id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.roles, vec!["accountant".to_string()]);
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[rstest]
    #[case("*", "finance.journal_entries.post", true)]
    #[case("finance.*", "finance.journal_entries.post", true)]
    #[case("finance.*", "hr.payrolls.read", false)]
    #[case("finance.journal_entries.post", "finance.journal_entries.post", true)]
    #[case("finance.journal_entries.read", "finance.journal_entries.post", false)]
    #[case("fin*", "finance.journal_entries.post", false)]
    fn test_permission_grants(#[case] granted: &str, #[case] required: &str, #[case] expected: bool) {
        assert_eq!(permission_grants(granted, required), expected);
    }

    #[test]
    fn test_claims_has_permission() {
        let claims = Claims::new(
            subject(&["crm.*", "sales.quotes.read"]),
            Utc::now() + Duration::hours(1),
        );
        assert!(claims.has_permission("crm.partners.create"));
        assert!(claims.has_permission("sales.quotes.read"));
        assert!(!claims.has_permission("sales.quotes.create"));
    }
}
