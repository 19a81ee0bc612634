//! Queued job repository.

use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::LockBehavior;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tessera_core::system::{JobStatus, LEASE_EXPIRED, QueuedJob};
use tessera_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use crate::convert::{apply_audit, audit_info, decode};
use crate::entities::queued_jobs;
use crate::error::RepoResult;
use crate::scope::{TenantScoped, fetch_page, find_scoped, insert_record, modify_scoped};

impl TryFrom<queued_jobs::Model> for QueuedJob {
    type Error = DbErr;

    fn try_from(model: queued_jobs::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            audit: audit_info!(model),
            status: decode("job status", &model.status, JobStatus::parse)?,
            job_type: model.job_type,
            payload: model.payload,
            attempts: model.attempts,
            max_attempts: model.max_attempts,
            last_error: model.last_error,
            run_after: model.run_after,
            started_at: model.started_at,
            completed_at: model.completed_at,
        })
    }
}

impl From<&QueuedJob> for queued_jobs::ActiveModel {
    fn from(job: &QueuedJob) -> Self {
        let mut active = Self {
            id: Set(job.id),
            tenant_id: Set(job.tenant_id),
            job_type: Set(job.job_type.clone()),
            payload: Set(job.payload.clone()),
            status: Set(job.status.as_str().to_string()),
            attempts: Set(job.attempts),
            max_attempts: Set(job.max_attempts),
            last_error: Set(job.last_error.clone()),
            run_after: Set(job.run_after),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            ..Default::default()
        };
        apply_audit!(active, &job.audit);
        active
    }
}

/// Queued job repository.
#[derive(Debug, Clone)]
pub struct JobRepository {
    db: DatabaseConnection,
}

impl JobRepository {
    /// Creates a new job repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a pending job.
    pub async fn enqueue(&self, job: &QueuedJob) -> RepoResult<()> {
        insert_record::<queued_jobs::Entity, _, _>(&self.db, job).await
    }

    /// Loads a job of the tenant.
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> RepoResult<QueuedJob> {
        Ok(find_scoped::<queued_jobs::Entity, _>(&self.db, tenant_id, id).await?.try_into()?)
    }

    /// Lists the tenant's jobs, optionally filtered by status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<JobStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<QueuedJob>> {
        let mut select = queued_jobs::Entity::scoped(tenant_id);
        if let Some(status) = status {
            select = select.filter(queued_jobs::Column::Status.eq(status.as_str()));
        }
        fetch_page(&self.db, select, page).await
    }

    /// Puts a failed job back in the queue.
    pub async fn retry(&self, tenant_id: Uuid, id: Uuid, actor: Option<Uuid>) -> RepoResult<QueuedJob> {
        modify_scoped::<queued_jobs::Entity, _, _>(&self.db, tenant_id, id, |job| job.retry(Utc::now(), actor))
            .await
    }

    /// Claims up to `limit` due jobs across all tenants.
    ///
    /// Rows locked by another runner are skipped, so concurrent runners
    /// never claim the same job.
    pub async fn claim_due(&self, now: DateTime<Utc>, limit: u64) -> RepoResult<Vec<QueuedJob>> {
        let txn = self.db.begin().await?;
        let models = queued_jobs::Entity::find()
            .filter(queued_jobs::Column::Status.eq(JobStatus::Pending.as_str()))
            .filter(queued_jobs::Column::RunAfter.lte(now))
            .filter(queued_jobs::Column::IsDeleted.eq(false))
            .order_by_asc(queued_jobs::Column::RunAfter)
            .limit(limit)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(&txn)
            .await?;

        let mut claimed = Vec::with_capacity(models.len());
        for model in models {
            let mut job = QueuedJob::try_from(model)?;
            job.start(now)?;
            queued_jobs::ActiveModel::from(&job).update(&txn).await?;
            claimed.push(job);
        }
        txn.commit().await?;
        Ok(claimed)
    }

    /// Fails jobs left `running` for longer than `lease`.
    ///
    /// A runner that dies or cannot record an outcome leaves its claimed jobs
    /// running; this puts them back under the normal retry rules, so they
    /// requeue with backoff or end `failed` on their last attempt.
    pub async fn recover_stale(&self, now: DateTime<Utc>, lease: Duration) -> RepoResult<Vec<QueuedJob>> {
        let txn = self.db.begin().await?;
        let models = queued_jobs::Entity::find()
            .filter(queued_jobs::Column::Status.eq(JobStatus::Running.as_str()))
            .filter(queued_jobs::Column::StartedAt.lt(now - lease))
            .filter(queued_jobs::Column::IsDeleted.eq(false))
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(&txn)
            .await?;

        let mut recovered = Vec::with_capacity(models.len());
        for model in models {
            let mut job = QueuedJob::try_from(model)?;
            job.fail(LEASE_EXPIRED, now)?;
            queued_jobs::ActiveModel::from(&job).update(&txn).await?;
            recovered.push(job);
        }
        txn.commit().await?;
        Ok(recovered)
    }

    /// Persists the outcome of an attempt.
    pub async fn save(&self, job: &QueuedJob) -> RepoResult<()> {
        queued_jobs::ActiveModel::from(job).update(&self.db).await?;
        Ok(())
    }
}
