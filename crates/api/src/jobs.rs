//! In-process runner for the database-backed job queue.
//!
//! Each poll first fails jobs whose lease ran out, then claims up to
//! `batch_size` due jobs (rows locked by another runner are skipped),
//! dispatches them to the handler registered for their `job_type`, and
//! records the outcome. Failures are retried with backoff until the attempt
//! budget is spent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tracing::{error, info, warn};

use tessera_core::system::QueuedJob;
use tessera_db::{JobRepository, SessionRepository};
use tessera_shared::config::JobsConfig;

/// Job type of the built-in session cleanup.
pub const PURGE_EXPIRED_SESSIONS: &str = "sessions.purge_expired";

/// Longest lease a runner accepts, one week.
const MAX_LEASE_SECS: i64 = 7 * 24 * 60 * 60;

/// Executes one kind of job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Runs the job. An error schedules a retry.
    async fn handle(&self, job: &QueuedJob) -> anyhow::Result<()>;
}

/// Maps job types to handlers.
#[derive(Default, Clone)]
pub struct JobRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in handlers.
    #[must_use]
    pub fn with_defaults(db: &DatabaseConnection) -> Self {
        let mut registry = Self::new();
        registry.register(PURGE_EXPIRED_SESSIONS, PurgeExpiredSessions { db: db.clone() });
        registry
    }

    /// Registers (or replaces) the handler for `job_type`.
    pub fn register(&mut self, job_type: &str, handler: impl JobHandler + 'static) {
        self.handlers.insert(job_type.to_string(), Arc::new(handler));
    }

    /// The handler for `job_type`, if any.
    #[must_use]
    pub fn get(&self, job_type: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(job_type).cloned()
    }

    /// Registered job types, sorted.
    #[must_use]
    pub fn job_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Deletes refresh sessions that expired or were revoked.
struct PurgeExpiredSessions {
    db: DatabaseConnection,
}

#[async_trait]
impl JobHandler for PurgeExpiredSessions {
    async fn handle(&self, job: &QueuedJob) -> anyhow::Result<()> {
        let purged = SessionRepository::new(self.db.clone())
            .purge_expired(Utc::now())
            .await?;
        info!(job_id = %job.id, purged, "expired sessions purged");
        Ok(())
    }
}

/// Polls the queue and runs due jobs.
pub struct JobRunner {
    jobs: JobRepository,
    registry: JobRegistry,
    poll_interval: Duration,
    batch_size: u64,
    lease: chrono::Duration,
}

impl JobRunner {
    /// Creates a runner over `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection, registry: JobRegistry, config: &JobsConfig) -> Self {
        Self {
            jobs: JobRepository::new(db),
            registry,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            batch_size: config.batch_size.max(1),
            lease: chrono::Duration::seconds(
                i64::try_from(config.lease_secs)
                    .unwrap_or(MAX_LEASE_SECS)
                    .clamp(1, MAX_LEASE_SECS),
            ),
        }
    }

    /// Polls until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            batch_size = self.batch_size,
            lease_secs = self.lease.num_seconds(),
            handlers = ?self.registry.job_types(),
            "Job runner started"
        );
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Job runner shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll().await {
                        error!(error = %e, "job poll failed");
                    }
                }
            }
        }
    }

    /// Recovers stale jobs, then claims and runs one batch.
    ///
    /// Returns how many jobs were claimed. A job whose outcome cannot be saved
    /// stays `running` until its lease expires.
    pub async fn poll(&self) -> Result<usize, tessera_db::RepoError> {
        let now = Utc::now();
        for job in self.jobs.recover_stale(now, self.lease).await? {
            warn!(
                job_id = %job.id,
                job_type = %job.job_type,
                attempts = job.attempts,
                status = %job.status,
                "job lease expired"
            );
        }

        let claimed = self.jobs.claim_due(now, self.batch_size).await?;
        let count = claimed.len();
        for job in claimed {
            let job = self.execute(job).await;
            if let Err(e) = self.jobs.save(&job).await {
                error!(job_id = %job.id, job_type = %job.job_type, error = %e, "failed to record job outcome");
            }
        }
        Ok(count)
    }

    /// Runs one claimed job and returns it with the outcome recorded.
    pub async fn execute(&self, mut job: QueuedJob) -> QueuedJob {
        let outcome = match self.registry.get(&job.job_type) {
            Some(handler) => handler.handle(&job).await.map_err(|e| format!("{e:#}")),
            None => Err(format!("No handler registered for job type '{}'", job.job_type)),
        };

        let now = Utc::now();
        let recorded = match &outcome {
            Ok(()) => job.complete(now),
            Err(message) => job.fail(message, now),
        };
        match (recorded, outcome) {
            (Err(e), _) => {
                error!(job_id = %job.id, status = %job.status, error = %e, "job outcome rejected");
            }
            (Ok(()), Ok(())) => {
                info!(job_id = %job.id, job_type = %job.job_type, attempts = job.attempts, "job completed");
            }
            (Ok(()), Err(message)) => {
                warn!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    attempts = job.attempts,
                    status = %job.status,
                    error = %message,
                    "job attempt failed"
                );
            }
        }
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tessera_core::system::{JobStatus, MAX_JOB_ATTEMPTS, NewJob};
    use uuid::Uuid;

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl JobHandler for Counting {
        async fn handle(&self, _job: &QueuedJob) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl JobHandler for Failing {
        async fn handle(&self, _job: &QueuedJob) -> anyhow::Result<()> {
            anyhow::bail!("mailbox unavailable")
        }
    }

    fn job(job_type: &str) -> QueuedJob {
        QueuedJob::enqueue(
            Uuid::new_v4(),
            NewJob {
                job_type: job_type.to_string(),
                payload: serde_json::json!({}),
                run_after: None,
            },
            None,
        )
        .unwrap()
    }

    fn claimed(job_type: &str) -> QueuedJob {
        let mut job = job(job_type);
        job.start(Utc::now()).unwrap();
        job
    }

    fn runner(registry: JobRegistry) -> JobRunner {
        JobRunner::new(DatabaseConnection::Disconnected, registry, &JobsConfig::default())
    }

    #[test]
    fn test_defaults_register_session_purge() {
        let registry = JobRegistry::with_defaults(&DatabaseConnection::Disconnected);
        assert_eq!(registry.job_types(), vec![PURGE_EXPIRED_SESSIONS]);
        assert!(registry.get("reports.unknown").is_none());
    }

    #[tokio::test]
    async fn test_registered_handler_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = JobRegistry::new();
        registry.register("demo.count", Counting(calls.clone()));

        let handler = registry.get("demo.count").unwrap();
        handler.handle(&job("demo.count")).await.unwrap();
        handler.handle(&job("demo.count")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_register_replaces_existing_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = JobRegistry::new();
        registry.register("demo.flaky", Failing);
        registry.register("demo.flaky", Counting(calls.clone()));

        assert!(registry.get("demo.flaky").unwrap().handle(&job("demo.flaky")).await.is_ok());
        assert_eq!(registry.job_types().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_handler_reports_error() {
        let mut registry = JobRegistry::new();
        registry.register("demo.fail", Failing);
        let err = registry.get("demo.fail").unwrap().handle(&job("demo.fail")).await.unwrap_err();
        assert_eq!(err.to_string(), "mailbox unavailable");
    }

    #[tokio::test]
    async fn test_execute_completes_successful_job() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = JobRegistry::new();
        registry.register("demo.count", Counting(calls.clone()));

        let job = runner(registry).execute(claimed("demo.count")).await;
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_requeues_failed_job() {
        let mut registry = JobRegistry::new();
        registry.register("demo.fail", Failing);

        let job = runner(registry).execute(claimed("demo.fail")).await;
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.last_error.as_deref(), Some("mailbox unavailable"));
        assert!(job.run_after > job.started_at.unwrap());
    }

    #[tokio::test]
    async fn test_execute_fails_last_attempt_for_unknown_type() {
        let runner = runner(JobRegistry::new());
        let mut job = claimed("reports.unknown");
        for _ in 1..MAX_JOB_ATTEMPTS {
            job = runner.execute(job).await;
            assert_eq!(job.status, JobStatus::Pending);
            job.run_after = Utc::now();
            job.start(Utc::now()).unwrap();
        }
        let job = runner.execute(job).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.last_error.as_deref(),
            Some("No handler registered for job type 'reports.unknown'")
        );
    }

    #[tokio::test]
    async fn test_execute_leaves_unclaimed_job_untouched() {
        let job = runner(JobRegistry::new()).execute(job("demo.count")).await;
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.last_error.is_none());
    }

    #[test]
    fn test_runner_reads_lease_from_config() {
        let config = JobsConfig {
            lease_secs: 120,
            ..JobsConfig::default()
        };
        let runner = JobRunner::new(DatabaseConnection::Disconnected, JobRegistry::new(), &config);
        assert_eq!(runner.lease, chrono::Duration::minutes(2));

        let unbounded = JobsConfig {
            lease_secs: u64::MAX,
            ..JobsConfig::default()
        };
        let runner = JobRunner::new(DatabaseConnection::Disconnected, JobRegistry::new(), &unbounded);
        assert_eq!(runner.lease, chrono::Duration::weeks(1));
    }
}
