//! Tenancy, identity, access control, and the job queue.

pub mod job;
pub mod permission;
pub mod role;
pub mod tenant;
pub mod user;

pub use job::{JobStatus, LEASE_EXPIRED, MAX_JOB_ATTEMPTS, NewJob, QueuedJob};
pub use permission::{PERMISSION_CATALOG, PermissionSet, validate_permission_code};
pub use role::{Role, RoleInput};
pub use tenant::{Tenant, TenantInput};
pub use user::{NewUser, User, UserProfile};
