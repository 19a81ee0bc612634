//! Refresh-token session repository.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{tenants, user_sessions, users};

/// Client details recorded with a session.
#[derive(Debug, Clone, Default)]
pub struct SessionClient {
    /// `User-Agent` header.
    pub user_agent: Option<String>,
    /// Remote address.
    pub ip_address: Option<String>,
}

/// A freshly issued refresh token and its session row.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The opaque token handed to the client. Only its hash is stored.
    pub refresh_token: String,
    /// The stored session.
    pub session: user_sessions::Model,
}

/// Session repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a refresh token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generates a random URL-safe refresh token.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    async fn insert<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        tenant_id: Uuid,
        lifetime: Duration,
        client: &SessionClient,
    ) -> Result<IssuedSession, DbErr> {
        let now = Utc::now();
        let refresh_token = Self::generate_token();
        let session = user_sessions::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            tenant_id: Set(tenant_id),
            refresh_token_hash: Set(Self::hash_token(&refresh_token)),
            user_agent: Set(client.user_agent.clone()),
            ip_address: Set(client.ip_address.clone()),
            expires_at: Set(now + lifetime),
            revoked_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        Ok(IssuedSession { refresh_token, session })
    }

    /// Opens a session and returns its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        lifetime: Duration,
        client: &SessionClient,
    ) -> Result<IssuedSession, DbErr> {
        Self::insert(&self.db, user_id, tenant_id, lifetime, client).await
    }

    /// Finds a live (unrevoked, unexpired) session by refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active(&self, refresh_token: &str) -> Result<Option<user_sessions::Model>, DbErr> {
        user_sessions::Entity::find()
            .filter(user_sessions::Column::RefreshTokenHash.eq(Self::hash_token(refresh_token)))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .filter(user_sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
    }

    /// Revokes the session behind `refresh_token` and opens a new one.
    ///
    /// Returns `None` when the token is unknown, revoked, or expired, or when
    /// its user or tenant is inactive or deleted. In the last case the old
    /// session is still revoked and no new one is opened.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        lifetime: Duration,
        client: &SessionClient,
    ) -> Result<Option<IssuedSession>, DbErr> {
        let txn = self.db.begin().await?;
        let current = user_sessions::Entity::find()
            .filter(user_sessions::Column::RefreshTokenHash.eq(Self::hash_token(refresh_token)))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .filter(user_sessions::Column::ExpiresAt.gt(Utc::now()))
            .lock_exclusive()
            .one(&txn)
            .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let now = Utc::now();
        let (user_id, tenant_id) = (current.user_id, current.tenant_id);
        let holder_active = Self::holder_is_active(&txn, user_id, tenant_id).await?;
        let mut revoked: user_sessions::ActiveModel = current.into();
        revoked.revoked_at = Set(Some(now));
        revoked.updated_at = Set(now);
        revoked.update(&txn).await?;

        if !holder_active {
            txn.commit().await?;
            tracing::info!(%user_id, %tenant_id, "refresh refused for inactive account");
            return Ok(None);
        }
        let issued = Self::insert(&txn, user_id, tenant_id, lifetime, client).await?;
        txn.commit().await?;
        Ok(Some(issued))
    }

    /// True when the user and their tenant are both active and not deleted.
    async fn holder_is_active<C: ConnectionTrait>(db: &C, user_id: Uuid, tenant_id: Uuid) -> Result<bool, DbErr> {
        let user = users::Entity::find_by_id(user_id)
            .filter(users::Column::TenantId.eq(tenant_id))
            .filter(users::Column::IsActive.eq(true))
            .filter(users::Column::IsDeleted.eq(false))
            .one(db)
            .await?;
        if user.is_none() {
            return Ok(false);
        }
        let tenant = tenants::Entity::find_by_id(tenant_id)
            .filter(tenants::Column::IsActive.eq(true))
            .filter(tenants::Column::IsDeleted.eq(false))
            .one(db)
            .await?;
        Ok(tenant.is_some())
    }

    /// Revokes a session by refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke_by_token(&self, refresh_token: &str) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::RevokedAt, sea_orm::sea_query::Expr::value(now))
            .col_expr(user_sessions::Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(user_sessions::Column::RefreshTokenHash.eq(Self::hash_token(refresh_token)))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Gets all live sessions for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_sessions(&self, user_id: Uuid) -> Result<Vec<user_sessions::Model>, DbErr> {
        user_sessions::Entity::find()
            .filter(user_sessions::Column::UserId.eq(user_id))
            .filter(user_sessions::Column::RevokedAt.is_null())
            .filter(user_sessions::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(user_sessions::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Deletes sessions that expired or were revoked before `before`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = user_sessions::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(user_sessions::Column::ExpiresAt.lt(before))
                    .add(user_sessions::Column::RevokedAt.lt(before)),
            )
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hash = SessionRepository::hash_token("abc");
        assert_eq!(hash, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = SessionRepository::generate_token();
        let b = SessionRepository::generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
