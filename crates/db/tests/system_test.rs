//! Integration tests for numbering, sessions, users, roles and the job queue.

mod common;

use std::collections::HashSet;

use chrono::{Duration, Utc};
use futures::future::join_all;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use tessera_core::system::{JobStatus, LEASE_EXPIRED, NewJob, NewUser, QueuedJob, Role, RoleInput, User};
use tessera_db::sequence::{next_number, prefix};
use tessera_db::{
    JobRepository, RepoError, RoleRepository, SessionClient, SessionRepository, UserRepository,
};

use common::{connect, create_tenant};

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_numbers_increment_per_tenant_and_prefix() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let other = create_tenant(&db).await;

    let first = next_number(&db, tenant.id, prefix::SALES_ORDER).await.unwrap();
    let second = next_number(&db, tenant.id, prefix::SALES_ORDER).await.unwrap();
    let invoice = next_number(&db, tenant.id, prefix::SALES_INVOICE).await.unwrap();
    let other_first = next_number(&db, other.id, prefix::SALES_ORDER).await.unwrap();

    assert_eq!(first, "SO-000001");
    assert_eq!(second, "SO-000002");
    assert_eq!(invoice, "INV-000001");
    assert_eq!(other_first, "SO-000001");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_rolled_back_number_is_reissued() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;

    let txn = db.begin().await.unwrap();
    let abandoned = next_number(&txn, tenant.id, prefix::JOURNAL_ENTRY).await.unwrap();
    txn.rollback().await.unwrap();

    let issued = next_number(&db, tenant.id, prefix::JOURNAL_ENTRY).await.unwrap();
    assert_eq!(abandoned, issued);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_numbers_are_unique() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;

    let tasks = (0..20).map(|_| {
        let db = db.clone();
        tokio::spawn(async move {
            let txn = db.begin().await.unwrap();
            let number = next_number(&txn, tenant.id, prefix::PURCHASE_ORDER).await.unwrap();
            txn.commit().await.unwrap();
            number
        })
    });
    let numbers: Vec<String> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

    let unique: HashSet<&String> = numbers.iter().collect();
    assert_eq!(unique.len(), 20);
    assert!(numbers.contains(&"PO-000020".to_string()));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_session_rotate_revokes_old_token() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let users = UserRepository::new(db.clone());
    let user = User::create(
        tenant.id,
        NewUser {
            email: "rotate@example.com".to_string(),
            full_name: "Rotate User".to_string(),
            password_hash: "$argon2id$test".to_string(),
        },
        None,
    )
    .unwrap();
    users.create(&user).await.unwrap();

    let sessions = SessionRepository::new(db.clone());
    let client = SessionClient::default();
    let issued = sessions.create(user.id, tenant.id, Duration::days(7), &client).await.unwrap();
    assert!(sessions.find_active(&issued.refresh_token).await.unwrap().is_some());

    let rotated = sessions
        .rotate(&issued.refresh_token, Duration::days(7), &client)
        .await
        .unwrap()
        .expect("live token rotates");
    assert_ne!(rotated.refresh_token, issued.refresh_token);
    assert!(sessions.find_active(&issued.refresh_token).await.unwrap().is_none());
    assert!(sessions.rotate(&issued.refresh_token, Duration::days(7), &client).await.unwrap().is_none());

    assert!(sessions.revoke_by_token(&rotated.refresh_token).await.unwrap());
    assert!(sessions.find_active(&rotated.refresh_token).await.unwrap().is_none());
}

async fn session_user(db: &DatabaseConnection, tenant_id: uuid::Uuid, email: &str) -> User {
    let user = User::create(
        tenant_id,
        NewUser {
            email: email.to_string(),
            full_name: "Session User".to_string(),
            password_hash: "$argon2id$test".to_string(),
        },
        None,
    )
    .unwrap();
    UserRepository::new(db.clone()).create(&user).await.unwrap();
    user
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_refresh_refused_for_deactivated_user() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let user = session_user(&db, tenant.id, "inactive@example.com").await;
    let sessions = SessionRepository::new(db.clone());
    let client = SessionClient::default();
    let issued = sessions.create(user.id, tenant.id, Duration::days(7), &client).await.unwrap();

    UserRepository::new(db.clone())
        .modify(tenant.id, user.id, |u| {
            u.deactivate(None);
            Ok(())
        })
        .await
        .unwrap();

    let rotated = sessions.rotate(&issued.refresh_token, Duration::days(7), &client).await.unwrap();
    assert!(rotated.is_none());
    assert!(sessions.find_active(&issued.refresh_token).await.unwrap().is_none());
    assert!(sessions.user_sessions(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_refresh_refused_for_deleted_user() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let user = session_user(&db, tenant.id, "deleted@example.com").await;
    let sessions = SessionRepository::new(db.clone());
    let client = SessionClient::default();
    let issued = sessions.create(user.id, tenant.id, Duration::days(7), &client).await.unwrap();

    UserRepository::new(db.clone())
        .modify(tenant.id, user.id, |u| {
            u.audit.mark_deleted(None);
            Ok(())
        })
        .await
        .unwrap();

    assert!(sessions.rotate(&issued.refresh_token, Duration::days(7), &client).await.unwrap().is_none());
    assert!(sessions.user_sessions(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_running_job_is_recovered() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let jobs = JobRepository::new(db.clone());
    let now = Utc::now();
    let job = QueuedJob::enqueue(
        tenant.id,
        NewJob {
            job_type: "stale.lease".to_string(),
            payload: json!({}),
            run_after: Some(now - Duration::hours(1)),
        },
        None,
    )
    .unwrap();
    jobs.enqueue(&job).await.unwrap();

    let claimed = jobs.claim_due(now, 1000).await.unwrap();
    assert!(claimed.iter().any(|j| j.id == job.id));

    let lease = Duration::minutes(5);
    assert!(!jobs.recover_stale(now, lease).await.unwrap().iter().any(|j| j.id == job.id));

    let later = now + lease + Duration::seconds(1);
    let recovered = jobs.recover_stale(later, lease).await.unwrap();
    let stale = recovered.iter().find(|j| j.id == job.id).expect("stale job recovered");
    assert_eq!(stale.status, JobStatus::Pending);
    assert_eq!(stale.attempts, 1);
    assert_eq!(stale.last_error.as_deref(), Some(LEASE_EXPIRED));

    let stored = jobs.find(tenant.id, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Pending);
    assert_eq!(stored.last_error.as_deref(), Some(LEASE_EXPIRED));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_expired_sessions_are_purged() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let users = UserRepository::new(db.clone());
    let user = User::create(
        tenant.id,
        NewUser {
            email: "purge@example.com".to_string(),
            full_name: "Purge User".to_string(),
            password_hash: "$argon2id$test".to_string(),
        },
        None,
    )
    .unwrap();
    users.create(&user).await.unwrap();

    let sessions = SessionRepository::new(db.clone());
    sessions
        .create(user.id, tenant.id, Duration::seconds(-1), &SessionClient::default())
        .await
        .unwrap();

    let purged = sessions.purge_expired(Utc::now()).await.unwrap();
    assert!(purged >= 1);
    assert!(sessions.user_sessions(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_conflicts() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let users = UserRepository::new(db.clone());
    let input = || NewUser {
        email: "dup@example.com".to_string(),
        full_name: "Dup".to_string(),
        password_hash: "$argon2id$test".to_string(),
    };

    users.create(&User::create(tenant.id, input(), None).unwrap()).await.unwrap();
    let result = users.create(&User::create(tenant.id, input(), None).unwrap()).await;
    assert!(matches!(result, Err(RepoError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_access_unions_role_permissions() {
    let db = connect().await;
    let tenant = create_tenant(&db).await;
    let roles = RoleRepository::new(db.clone());
    roles.sync_catalog().await.unwrap();

    let clerk = Role::create(tenant.id, RoleInput { name: "Clerk".to_string(), description: None }, None).unwrap();
    let viewer = Role::create(tenant.id, RoleInput { name: "Viewer".to_string(), description: None }, None).unwrap();
    roles.create(&clerk).await.unwrap();
    roles.create(&viewer).await.unwrap();
    roles
        .set_permissions(tenant.id, clerk.id, &["finance.*".to_string()])
        .await
        .unwrap();
    roles
        .set_permissions(tenant.id, viewer.id, &["hr.employees.read".to_string()])
        .await
        .unwrap();

    let users = UserRepository::new(db.clone());
    let user = User::create(
        tenant.id,
        NewUser {
            email: "clerk@example.com".to_string(),
            full_name: "Clerk".to_string(),
            password_hash: "$argon2id$test".to_string(),
        },
        None,
    )
    .unwrap();
    users.create(&user).await.unwrap();
    users.set_roles(tenant.id, user.id, &[clerk.id, viewer.id]).await.unwrap();

    let access = users.access_of(user.id).await.unwrap();
    assert_eq!(access.roles.len(), 2);
    assert!(access.permissions.grants("finance.accounts.create"));
    assert!(access.permissions.grants("hr.employees.read"));
    assert!(!access.permissions.grants("hr.employees.create"));
}
