//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions, one Postgres schema per module
//! - Tenant-scoped repositories mapping rows to domain records
//! - Document numbering sequences
//! - Database migrations

mod convert;

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod scope;
pub mod sequence;

pub use error::{RepoError, RepoResult};
pub use repositories::*;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32, min_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
