//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{CurrencyCode, convert_amount, round_money};
pub use pagination::{MAX_PAGE_SIZE, PageRequest, PageResponse};
