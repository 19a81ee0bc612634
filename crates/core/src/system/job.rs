//! Database-backed background jobs with at-least-once delivery.
//!
//! Lifecycle:
//! - pending → running (claimed by a runner)
//! - running → completed
//! - running → pending (failure with attempts left, delayed by `attempts * 30s`)
//! - running → failed (failure on the last attempt)
//! - a running job whose lease expires is failed with [`LEASE_EXPIRED`]
//! - failed → pending (manual retry, attempts reset)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::error::DomainResult;
use crate::guard::{self, ensure_status};
use crate::macros::text_enum;

/// Attempts before a job is marked failed.
pub const MAX_JOB_ATTEMPTS: i32 = 3;

/// Base delay between attempts.
const RETRY_BACKOFF_SECS: i64 = 30;

/// Error recorded when a claimed job outlives its lease.
pub const LEASE_EXPIRED: &str = "lease expired before the attempt finished";

text_enum! {
    /// Job status.
    JobStatus {
        /// Waiting to run.
        Pending => "pending",
        /// Claimed by a runner.
        Running => "running",
        /// Finished successfully.
        Completed => "completed",
        /// Exhausted its attempts.
        Failed => "failed",
    }
}

/// A queued unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedJob {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Handler key, e.g. `sessions.purge_expired`.
    pub job_type: String,
    /// Handler-specific payload.
    pub payload: serde_json::Value,
    /// Current status.
    pub status: JobStatus,
    /// Attempts started so far.
    pub attempts: i32,
    /// Attempt limit.
    pub max_attempts: i32,
    /// Error from the last failed attempt.
    pub last_error: Option<String>,
    /// Earliest time the job may run.
    pub run_after: DateTime<Utc>,
    /// When the current or last attempt started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Input for enqueuing a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    /// Handler key.
    pub job_type: String,
    /// Handler payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Delay the first attempt until this time.
    pub run_after: Option<DateTime<Utc>>,
}

impl QueuedJob {
    const ENTITY: &'static str = "job";

    /// Enqueues a new pending job.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty job type.
    pub fn enqueue(tenant_id: Uuid, input: NewJob, actor: Option<Uuid>) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            job_type: guard::required("job type", &input.job_type)?,
            payload: input.payload,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: MAX_JOB_ATTEMPTS,
            last_error: None,
            run_after: input.run_after.unwrap_or_else(Utc::now),
            started_at: None,
            completed_at: None,
            audit: AuditInfo::new(actor),
        })
    }

    /// Returns true if a runner may claim the job at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Pending && self.run_after <= now
    }

    /// Returns true if the job has been running for longer than `lease`.
    #[must_use]
    pub fn lease_expired(&self, now: DateTime<Utc>, lease: Duration) -> bool {
        self.status == JobStatus::Running && self.started_at.is_some_and(|at| at + lease < now)
    }

    /// Claims the job for an attempt.
    ///
    /// # Errors
    ///
    /// Fails unless the job is pending.
    pub fn start(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JobStatus::Pending], "start")?;
        self.status = JobStatus::Running;
        self.attempts += 1;
        self.started_at = Some(now);
        Ok(())
    }

    /// Records a successful attempt.
    ///
    /// # Errors
    ///
    /// Fails unless the job is running.
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JobStatus::Running], "complete")?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        self.last_error = None;
        Ok(())
    }

    /// Records a failed attempt, scheduling a retry while attempts remain.
    ///
    /// # Errors
    ///
    /// Fails unless the job is running.
    pub fn fail(&mut self, error: &str, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JobStatus::Running], "fail")?;
        self.last_error = Some(error.to_string());
        if self.attempts >= self.max_attempts {
            self.status = JobStatus::Failed;
        } else {
            self.status = JobStatus::Pending;
            self.run_after = now + Duration::seconds(i64::from(self.attempts) * RETRY_BACKOFF_SECS);
        }
        Ok(())
    }

    /// Puts a failed job back in the queue with a fresh attempt budget.
    ///
    /// # Errors
    ///
    /// Fails unless the job has failed.
    pub fn retry(&mut self, now: DateTime<Utc>, actor: Option<Uuid>) -> DomainResult<()> {
        ensure_status(Self::ENTITY, self.status, &[JobStatus::Failed], "retry")?;
        self.status = JobStatus::Pending;
        self.attempts = 0;
        self.run_after = now;
        self.audit.touch(actor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> QueuedJob {
        QueuedJob::enqueue(
            Uuid::new_v4(),
            NewJob {
                job_type: "sessions.purge_expired".to_string(),
                payload: json!({}),
                run_after: None,
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_success_path() {
        let now = Utc::now();
        let mut job = job();
        assert!(job.is_due(now + Duration::seconds(1)));
        job.start(now).unwrap();
        assert_eq!(job.attempts, 1);
        assert!(!job.is_due(now));
        job.complete(now).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.complete(now).is_err());
    }

    #[test]
    fn test_retries_with_backoff_then_fails() {
        let now = Utc::now();
        let mut job = job();

        job.start(now).unwrap();
        job.fail("boom", now).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.run_after, now + Duration::seconds(30));

        job.start(now).unwrap();
        job.fail("boom", now).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.run_after, now + Duration::seconds(60));

        job.start(now).unwrap();
        job.fail("boom again", now).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, MAX_JOB_ATTEMPTS);
        assert_eq!(job.last_error.as_deref(), Some("boom again"));
        assert!(job.start(now).is_err());
    }

    #[test]
    fn test_expired_lease_counts_as_failed_attempt() {
        let now = Utc::now();
        let lease = Duration::minutes(5);
        let mut job = job();
        assert!(!job.lease_expired(now + Duration::hours(1), lease));

        job.start(now).unwrap();
        assert!(!job.lease_expired(now + lease, lease));
        assert!(job.lease_expired(now + lease + Duration::seconds(1), lease));

        let later = now + Duration::minutes(6);
        job.fail(LEASE_EXPIRED, later).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.run_after, later + Duration::seconds(30));
        assert!(!job.lease_expired(later + Duration::hours(1), lease));
    }

    #[test]
    fn test_manual_retry_resets_attempts() {
        let now = Utc::now();
        let mut job = job();
        assert!(job.retry(now, None).is_err());
        for _ in 0..MAX_JOB_ATTEMPTS {
            job.start(now).unwrap();
            job.fail("x", now).unwrap();
        }
        job.retry(now, None).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
    }

    #[test]
    fn test_status_round_trip() {
        for status in JobStatus::ALL {
            assert_eq!(JobStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(JobStatus::parse("bogus"), None);
    }
}
