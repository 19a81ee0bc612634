//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Returns the page number, treating 0 as 1.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Returns the page size clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Calculates the offset for database queries.
    ///
    /// Saturates at the largest offset PostgreSQL accepts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page()
            .saturating_sub(1)
            .saturating_mul(self.page_size())
            .min(i64::MAX.unsigned_abs())
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.page_size()
    }
}

/// Paged list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let page_size = request.page_size();
        Self {
            data,
            page: request.page(),
            page_size,
            total_count,
            total_pages: total_count.div_ceil(page_size),
        }
    }

    /// Maps the items while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 20);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamps_page_size_and_page() {
        let req = PageRequest {
            page: 0,
            page_size: 500,
        };
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest {
            page: 3,
            page_size: 25,
        };
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let req: PageRequest =
            serde_json::from_str(r#"{"page":18446744073709551615,"pageSize":20}"#).unwrap();
        assert_eq!(req.offset(), i64::MAX.unsigned_abs());
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_response_total_pages() {
        let req = PageRequest {
            page: 2,
            page_size: 10,
        };
        let resp = PageResponse::new(vec![1, 2, 3], &req, 21);
        assert_eq!(resp.total_pages, 3);
        assert_eq!(resp.page, 2);

        let empty = PageResponse::<i32>::new(vec![], &req, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let resp = PageResponse::new(vec!["a"], &PageRequest::default(), 1);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["data"][0], "a");
    }
}
