//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Builds a request, clamping page to at least 1 and limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.limit.clamp(1, MAX_LIMIT))
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            total,
            page: request.page.max(1),
            limit: request.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Total number of pages (at least 1).
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.limit.max(1));
        self.total.div_ceil(limit).max(1)
    }

    /// Maps the page items, keeping pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
