//! Password policy and hashing.

mod password;

pub use password::{MIN_PASSWORD_LENGTH, PasswordError, hash_password, validate_password, verify_password};
