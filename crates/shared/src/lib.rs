//! Shared types, errors, and configuration for Tessera.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers and currency codes with decimal precision
//! - Typed IDs for tenant and user references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT access tokens and authentication DTOs

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
